use crate::error::{BenchError, Result};
use crate::plugins::OcrReader;
use crate::text::split_lines;
use image::DynamicImage;
use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};
use std::env;
use std::path::Path;

const READER_NAME: &str = "tesseract";

const TESSDATA_FALLBACK_PATHS: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
    r#"C:\ProgramData\Tesseract-OCR\tessdata"#,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// Language code(s), `+`-separated (e.g. `eng+deu`).
    pub language: String,
    /// Page segmentation mode.
    pub psm: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            psm: 3,
        }
    }
}

impl From<&crate::core::config::TesseractSection> for TesseractConfig {
    fn from(section: &crate::core::config::TesseractSection) -> Self {
        Self {
            language: section.language.clone(),
            psm: section.psm,
        }
    }
}

/// Reader running the Tesseract engine on the filtered image.
///
/// A fresh engine handle is initialized for every image, so the reader holds no
/// native state between calls.
#[derive(Debug, Clone)]
pub struct TesseractReader {
    config: TesseractConfig,
}

impl TesseractReader {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    fn error(message: impl Into<String>) -> BenchError {
        BenchError::reader(READER_NAME, message)
    }
}

/// `TESSDATA_PREFIX` when set, otherwise the first well-known install location that exists.
fn resolve_tessdata_path(env_value: Option<String>, fallbacks: &[&str]) -> String {
    env_value
        .or_else(|| {
            fallbacks
                .iter()
                .find(|p| Path::new(p).exists())
                .map(|p| (*p).to_string())
        })
        .unwrap_or_default()
}

/// Fail early on languages without traineddata; Tesseract can crash instead of erroring.
fn check_languages(tessdata_path: &str, language: &str) -> Result<()> {
    if language.trim().is_empty() {
        return Err(TesseractReader::error(
            "Language cannot be empty. Please specify a valid language code (e.g., 'eng')",
        ));
    }

    if tessdata_path.is_empty() {
        return Ok(());
    }

    for lang in language.split('+').map(str::trim).filter(|l| !l.is_empty()) {
        let traineddata_path = Path::new(tessdata_path).join(format!("{}.traineddata", lang));
        if !traineddata_path.exists() {
            return Err(TesseractReader::error(format!(
                "Language '{}' not found. Traineddata file does not exist: {}",
                lang,
                traineddata_path.display()
            )));
        }
    }

    Ok(())
}

impl OcrReader for TesseractReader {
    fn name(&self) -> &str {
        READER_NAME
    }

    fn read(&self, image: &DynamicImage) -> Result<Vec<String>> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let tessdata_path = resolve_tessdata_path(env::var("TESSDATA_PREFIX").ok(), TESSDATA_FALLBACK_PATHS);
        check_languages(&tessdata_path, &self.config.language)?;

        let api = TesseractAPI::new();
        api.init(&tessdata_path, &self.config.language).map_err(|e| {
            Self::error(format!(
                "Failed to initialize language '{}': {}",
                self.config.language, e
            ))
        })?;

        api.set_page_seg_mode(TessPageSegMode::from_int(self.config.psm as i32))
            .map_err(|e| Self::error(format!("Failed to set PSM mode: {}", e)))?;

        api.set_image(gray.as_raw(), width as i32, height as i32, 1, width as i32)
            .map_err(|e| Self::error(format!("Failed to set image: {}", e)))?;

        api.recognize()
            .map_err(|e| Self::error(format!("Failed to recognize text: {}", e)))?;

        let text = api
            .get_utf8_text()
            .map_err(|e| Self::error(format!("Failed to extract text: {}", e)))?;

        tracing::trace!("Tesseract returned {} bytes for a {}x{} image", text.len(), width, height);

        Ok(split_lines(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let reader = TesseractReader::new(TesseractConfig::default());
        assert_eq!(reader.name(), "tesseract");
        assert_eq!(reader.config().language, "eng");
        assert_eq!(reader.config().psm, 3);
    }

    #[test]
    fn test_config_from_section() {
        let section = crate::core::config::TesseractSection {
            language: "deu".to_string(),
            psm: 6,
        };
        let config = TesseractConfig::from(&section);
        assert_eq!(config.language, "deu");
        assert_eq!(config.psm, 6);
    }

    #[test]
    fn test_resolve_tessdata_prefers_env() {
        let dir = tempdir().unwrap();
        let fallback = dir.path().to_str().unwrap();
        assert_eq!(resolve_tessdata_path(Some("/from/env".to_string()), &[fallback]), "/from/env");
        assert_eq!(resolve_tessdata_path(None, &["/missing/dir", fallback]), fallback);
        assert_eq!(resolve_tessdata_path(None, &["/missing/dir"]), "");
    }

    #[test]
    fn test_check_languages() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("eng.traineddata"), b"").unwrap();
        let tessdata = dir.path().to_str().unwrap();

        assert!(check_languages(tessdata, "eng").is_ok());
        assert!(check_languages(tessdata, "eng+deu").is_err());
        assert!(check_languages(tessdata, "  ").is_err());
        assert!(check_languages("", "anything").is_ok());
    }

    #[test]
    fn test_empty_image_reads_nothing() {
        let reader = TesseractReader::new(TesseractConfig::default());
        assert!(reader.read(&DynamicImage::new_luma8(0, 0)).unwrap().is_empty());
    }
}
