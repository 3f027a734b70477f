//! Benchmark orchestration.
//!
//! - **Configuration**: a reader plus ordered filters, identified by name
//! - **Pipeline**: one configuration applied to one dataset entry
//! - **Engine**: sampling, exclusion of failing entries, aggregation, caching
//! - **Config**: settings loaded from TOML, YAML or JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use ocrbench::core::config::BenchConfig;
//! use ocrbench::core::engine::BenchmarkEngine;
//! use ocrbench::dataset::DirectoryDataset;
//! use ocrbench::plugins::{FilterRegistry, ReaderRegistry};
//! use ocrbench::Configuration;
//! use std::sync::Arc;
//!
//! # fn example() -> ocrbench::Result<()> {
//! let settings = BenchConfig::default();
//! let dataset = Arc::new(DirectoryDataset::load(&settings.dataset_dir)?);
//! let mut engine = BenchmarkEngine::new(&settings.cache_path, dataset);
//!
//! let config = Configuration::from_names(
//!     "tesseract",
//!     &["grayscale", "sharpen"],
//!     &ReaderRegistry::new(),
//!     &FilterRegistry::new(),
//! )?;
//! let result = engine.run(&config, settings.sample_size, false)?;
//! println!("{}: {:.3}", result.identity(), result.average_success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod configuration;
pub mod engine;
pub mod pipeline;

pub use config::{BenchConfig, PipelineSpec, TesseractSection};
pub use configuration::Configuration;
pub use engine::BenchmarkEngine;
pub use pipeline::{load_image, run_pipeline};
