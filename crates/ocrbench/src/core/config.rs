//! Configuration loading and discovery.
//!
//! Settings can come from TOML, YAML, or JSON files, or be built in code. The CLI
//! looks for `ocrbench.toml` in the current directory and its parents when no file
//! is given explicitly.

use crate::core::configuration::Configuration;
use crate::plugins::{FilterRegistry, ReaderRegistry};
use crate::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`BenchConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "ocrbench.toml";

/// Benchmark settings.
///
/// # Example
///
/// ```rust
/// use ocrbench::core::config::BenchConfig;
///
/// let config = BenchConfig::default();
/// assert_eq!(config.sample_size, 10);
///
/// // let config = BenchConfig::from_file("ocrbench.yaml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Result cache file.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Directory of labeled images (`name.png` next to `name.txt`).
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,

    /// Number of dataset entries per run.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Always execute, even when a cached result exists.
    #[serde(default)]
    pub ignore_cache: bool,

    /// Tesseract settings (None = defaults)
    #[serde(default)]
    pub tesseract: Option<TesseractSection>,

    /// Pipelines evaluated by a sweep.
    #[serde(default)]
    pub pipelines: Vec<PipelineSpec>,
}

/// Tesseract reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesseractSection {
    #[serde(default = "default_language")]
    pub language: String,

    /// Page segmentation mode (0-13)
    #[serde(default = "default_psm")]
    pub psm: u8,
}

impl Default for TesseractSection {
    fn default() -> Self {
        Self {
            language: default_language(),
            psm: default_psm(),
        }
    }
}

/// A pipeline described by plugin names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub reader: String,
    #[serde(default)]
    pub filters: Vec<String>,
}

impl PipelineSpec {
    pub fn new(reader: impl Into<String>, filters: Vec<String>) -> Self {
        Self {
            reader: reader.into(),
            filters,
        }
    }

    /// Resolve the names into a runnable configuration.
    pub fn build(&self, readers: &ReaderRegistry, filters: &FilterRegistry) -> Result<Configuration> {
        Configuration::from_names(&self.reader, self.filters.as_slice(), readers, filters)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            dataset_dir: default_dataset_dir(),
            sample_size: default_sample_size(),
            ignore_cache: false,
            tesseract: None,
            pipelines: Vec::new(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".ocrbench").join("cache.msgpack")
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("dataset")
}

fn default_sample_size() -> usize {
    10
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_psm() -> u8 {
    3
}

impl BenchConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| BenchError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| BenchError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| BenchError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(BenchError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `ocrbench.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(BenchError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!("Using config file {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Check values that deserialization alone cannot rule out.
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(BenchError::validation("sample_size must be greater than 0"));
        }

        if let Some(tesseract) = &self.tesseract {
            if tesseract.language.trim().is_empty() {
                return Err(BenchError::validation("tesseract.language cannot be empty"));
            }
            if tesseract.psm > 13 {
                return Err(BenchError::validation(format!(
                    "tesseract.psm must be between 0 and 13, got {}",
                    tesseract.psm
                )));
            }
        }

        for (index, pipeline) in self.pipelines.iter().enumerate() {
            if pipeline.reader.trim().is_empty() {
                return Err(BenchError::validation(format!("pipelines[{}].reader cannot be empty", index)));
            }
        }

        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| BenchError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
