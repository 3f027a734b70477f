//! Capability traits for the two stages of an OCR pipeline.
//!
//! A pipeline is an ordered list of [`ImageFilter`]s followed by one [`OcrReader`].
//! Any type exposing a display name and the transform qualifies; the name is the
//! only part of a plugin that takes part in configuration identity and caching.
//!
//! # Example
//!
//! ```rust
//! use ocrbench::plugins::{ImageFilter, OcrReader};
//! use ocrbench::Result;
//! use image::DynamicImage;
//!
//! struct Flip;
//!
//! impl ImageFilter for Flip {
//!     fn name(&self) -> &str { "flip" }
//!     fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
//!         Ok(image.fliph())
//!     }
//! }
//!
//! struct Constant;
//!
//! impl OcrReader for Constant {
//!     fn name(&self) -> &str { "constant" }
//!     fn read(&self, _image: &DynamicImage) -> Result<Vec<String>> {
//!         Ok(vec!["hello world".to_string()])
//!     }
//! }
//! ```

pub mod registry;

use crate::Result;
use image::DynamicImage;

pub use registry::{FilterRegistry, ReaderRegistry};

/// Image preprocessing step.
///
/// Implementations must accept any well-formed image, grayscale or multi-channel,
/// converting internally as needed, and must not keep state between calls.
pub trait ImageFilter: Send + Sync {
    /// Display name, used in configuration identity.
    fn name(&self) -> &str;

    /// Transform `image` into the input of the next stage.
    ///
    /// # Errors
    ///
    /// `BenchError::Filter` when the image cannot be processed. The engine
    /// excludes the current entry and continues with the next one.
    fn apply(&self, image: DynamicImage) -> Result<DynamicImage>;
}

/// Text recognition engine.
pub trait OcrReader: Send + Sync {
    /// Display name, used in configuration identity.
    fn name(&self) -> &str;

    /// Recognize the text in `image`, one element per line, in reading order.
    ///
    /// Implementations should return printable text only; the pipeline runner
    /// normalizes the lines again before scoring.
    ///
    /// # Errors
    ///
    /// `BenchError::Reader` when recognition fails.
    fn read(&self, image: &DynamicImage) -> Result<Vec<String>>;
}
