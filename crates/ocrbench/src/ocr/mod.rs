//! OCR readers backed by native engines.

pub mod tesseract;

pub use tesseract::{TesseractConfig, TesseractReader};
