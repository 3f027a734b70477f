//! ocrbench - OCR pipeline benchmarking
//!
//! Measures how well OCR pipelines (image filters followed by a text reader)
//! recognize text on a labeled image dataset, and remembers the results.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ocrbench::{BenchmarkEngine, Configuration, DirectoryDataset, FilterRegistry, ReaderRegistry};
//! use std::sync::Arc;
//!
//! # fn main() -> ocrbench::Result<()> {
//! let dataset = Arc::new(DirectoryDataset::load("dataset")?);
//! let mut engine = BenchmarkEngine::new(".ocrbench/cache.msgpack", dataset);
//!
//! let config = Configuration::from_names("tesseract", &["normalize"], &ReaderRegistry::new(), &FilterRegistry::new())?;
//! let result = engine.run(&config, 10, false)?;
//! println!("{} -> {:.1}%", result.identity(), result.average_success() * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Plugins** (`plugins`): `ImageFilter` / `OcrReader` traits and name registries
//! - **Filters** (`filters`): built-in preprocessing steps on the `image` crate
//! - **Text** (`text`): reader output cleanup and word-overlap scoring
//! - **Core** (`core`): pipeline runner, benchmark engine, configuration loading
//! - **Cache** (`cache`): MessagePack result store keyed by configuration identity
//! - **Dataset** (`dataset`): labeled image sources
//! - **OCR** (`ocr`): Tesseract reader (feature `tesseract`)

#![deny(unsafe_code)]

pub mod cache;
pub mod core;
pub mod dataset;
pub mod error;
pub mod filters;
pub mod plugins;
pub mod text;
pub mod types;

#[cfg(feature = "tesseract")]
pub mod ocr;

pub use error::{BenchError, Result};
pub use types::*;

pub use cache::{CacheStats, ResultCache};
pub use core::config::{BenchConfig, PipelineSpec};
pub use core::configuration::Configuration;
pub use core::engine::BenchmarkEngine;
pub use core::pipeline::run_pipeline;
pub use dataset::{Dataset, DirectoryDataset, InMemoryDataset};
pub use filters::BuiltinFilter;
pub use plugins::{FilterRegistry, ImageFilter, OcrReader, ReaderRegistry};
pub use text::{normalize_lines, success_rate};
