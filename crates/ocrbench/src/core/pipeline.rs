//! Execution of one configuration against one dataset entry.

use crate::core::configuration::Configuration;
use crate::error::{BenchError, Result};
use crate::text::{normalize_lines, success_rate_for};
use crate::types::{DatasetEntry, SingleResult};
use image::{DynamicImage, ImageReader};
use std::path::Path;
use std::time::Instant;

/// Decode the image at `path`, guessing the format from its content.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| BenchError::image_load_with_source(path, format!("Failed to open image: {}", e), e))?
        .with_guessed_format()
        .map_err(|e| BenchError::image_load_with_source(path, format!("Failed to read image format: {}", e), e))?;

    reader
        .decode()
        .map_err(|e| BenchError::image_load_with_source(path, format!("Failed to decode image: {}", e), e))
}

/// Run `config` on one entry: load, filter, read, then score.
///
/// Timing covers the filters and the reader only; loading and scoring are
/// outside the measured window.
///
/// # Errors
///
/// Entry-level errors only (`ImageLoad`, `Filter`, `Reader`, `EmptyExpectedText`).
/// Any other error raised inside a plugin is wrapped as a `Filter` or `Reader`
/// error naming that plugin.
pub fn run_pipeline(config: &Configuration, entry: &DatasetEntry) -> Result<SingleResult> {
    let mut image = load_image(&entry.image_path)?;

    let start = Instant::now();

    for filter in config.filters() {
        image = filter
            .apply(image)
            .map_err(|e| BenchError::filter_with_source(filter.name(), e))?;
    }

    let reader = config.reader();
    let raw_lines = reader
        .read(&image)
        .map_err(|e| BenchError::reader_with_source(reader.name(), e))?;
    let lines = normalize_lines(raw_lines);

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let success = success_rate_for(&lines, &entry.expected_text, &entry.entry_id)?;

    tracing::debug!(
        entry = %entry.entry_id,
        pipeline = %config,
        elapsed_ms,
        success,
        "Pipeline finished"
    );

    Ok(SingleResult {
        entry_id: entry.entry_id.clone(),
        elapsed_ms,
        success,
        lines,
        expected_text: entry.expected_text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{ImageFilter, OcrReader};
    use image::{Rgb, RgbImage};
    use std::sync::Arc;
    use std::sync::Mutex;

    struct RecordingReader {
        lines: Vec<String>,
        seen: Mutex<Vec<(u32, u32, bool)>>,
    }

    impl OcrReader for RecordingReader {
        fn name(&self) -> &str {
            "recording"
        }

        fn read(&self, image: &DynamicImage) -> Result<Vec<String>> {
            let is_gray = matches!(image, DynamicImage::ImageLuma8(_));
            self.seen.lock().unwrap().push((image.width(), image.height(), is_gray));
            Ok(self.lines.clone())
        }
    }

    struct Shrink;

    impl ImageFilter for Shrink {
        fn name(&self) -> &str {
            "shrink"
        }

        fn apply(&self, image: DynamicImage) -> Result<DynamicImage> {
            Ok(image.crop_imm(0, 0, image.width() / 2, image.height() / 2))
        }
    }

    struct Broken;

    impl ImageFilter for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn apply(&self, _image: DynamicImage) -> Result<DynamicImage> {
            Err(BenchError::filter("broken", "always fails"))
        }
    }

    struct MissingMask;

    impl ImageFilter for MissingMask {
        fn name(&self) -> &str {
            "mask"
        }

        fn apply(&self, _image: DynamicImage) -> Result<DynamicImage> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "mask.png").into())
        }
    }

    struct UnconfiguredReader;

    impl OcrReader for UnconfiguredReader {
        fn name(&self) -> &str {
            "unconfigured"
        }

        fn read(&self, _image: &DynamicImage) -> Result<Vec<String>> {
            Err(BenchError::validation("language pack missing"))
        }
    }

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(40, 20, Rgb([255, 255, 255])).save(&path).unwrap();
        path
    }

    fn reader(lines: &[&str]) -> Arc<RecordingReader> {
        Arc::new(RecordingReader {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_run_pipeline_applies_filters_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(write_png(dir.path(), "a.png"), "the cat sat", "a");
        let reader = reader(&["the CAT", "sat."]);

        let config = Configuration::new(reader.clone(), vec![Arc::new(Shrink) as Arc<dyn ImageFilter>, Arc::new(Shrink)]).unwrap();
        let result = run_pipeline(&config, &entry).unwrap();

        assert_eq!(result.entry_id, "a");
        assert_eq!(result.success, 1.0);
        assert_eq!(result.lines, vec!["the CAT", "sat."]);
        assert_eq!(result.expected_text, "the cat sat");
        assert!(result.elapsed_ms >= 0.0);
        assert_eq!(reader.seen.lock().unwrap().as_slice(), &[(10, 5, false)]);
    }

    #[test]
    fn test_run_pipeline_normalizes_reader_output() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(write_png(dir.path(), "a.png"), "hello world", "a");
        let config = Configuration::new(reader(&["  h\u{e9}llo\u{0007} ", "", "world\nagain"]), vec![]).unwrap();

        let result = run_pipeline(&config, &entry).unwrap();
        assert_eq!(result.lines, vec!["hllo", "world", "again"]);
        assert_eq!(result.success, 0.5);
    }

    #[test]
    fn test_missing_image_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(dir.path().join("missing.png"), "text", "missing");
        let config = Configuration::new(reader(&["text"]), vec![]).unwrap();

        let err = run_pipeline(&config, &entry).unwrap_err();
        assert!(matches!(err, BenchError::ImageLoad { .. }));
    }

    #[test]
    fn test_corrupt_image_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let entry = DatasetEntry::new(path, "text", "corrupt");
        let config = Configuration::new(reader(&["text"]), vec![]).unwrap();

        let err = run_pipeline(&config, &entry).unwrap_err();
        assert!(matches!(err, BenchError::ImageLoad { .. }));
    }

    #[test]
    fn test_filter_failure_skips_reader() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(write_png(dir.path(), "a.png"), "text", "a");
        let reader = reader(&["text"]);
        let config = Configuration::new(reader.clone(), vec![Arc::new(Broken) as Arc<dyn ImageFilter>]).unwrap();

        let err = run_pipeline(&config, &entry).unwrap_err();
        assert!(matches!(err, BenchError::Filter { .. }));
        assert!(reader.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_plugin_io_error_becomes_filter_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(write_png(dir.path(), "a.png"), "text", "a");
        let config = Configuration::new(reader(&["text"]), vec![Arc::new(MissingMask) as Arc<dyn ImageFilter>]).unwrap();

        let err = run_pipeline(&config, &entry).unwrap_err();
        match &err {
            BenchError::Filter { filter, message, .. } => {
                assert_eq!(filter, "mask");
                assert!(message.contains("mask.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_entry_level());
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<BenchError>().is_some_and(|e| matches!(e, BenchError::Io(_))));
    }

    #[test]
    fn test_plugin_validation_error_becomes_reader_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(write_png(dir.path(), "a.png"), "text", "a");
        let config = Configuration::new(Arc::new(UnconfiguredReader), vec![]).unwrap();

        let err = run_pipeline(&config, &entry).unwrap_err();
        assert!(matches!(err, BenchError::Reader { ref reader, .. } if reader == "unconfigured"));
    }

    #[test]
    fn test_empty_expected_text_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let entry = DatasetEntry::new(write_png(dir.path(), "a.png"), "   ", "blank");
        let config = Configuration::new(reader(&["text"]), vec![]).unwrap();

        match run_pipeline(&config, &entry).unwrap_err() {
            BenchError::EmptyExpectedText { entry_id } => assert_eq!(entry_id, "blank"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
