//! Error types for ocrbench.
//!
//! Every fallible operation in the crate returns [`BenchError`]. The variants are
//! grouped by how far a failure is allowed to travel:
//!
//! **Entry-level (contained by the engine):**
//! - `ImageLoad` - the dataset image could not be decoded
//! - `Filter` / `Reader` - a pipeline stage failed on one image
//! - `EmptyExpectedText` - the ground truth has no words, so no score exists
//!
//! The [`BenchmarkEngine`](crate::core::engine::BenchmarkEngine) turns these into
//! excluded entries; one bad image never aborts a batch.
//!
//! **Batch and engine level (returned to the caller):**
//! - `EmptyBatch` - nothing survived, so no aggregate can be built
//! - `Validation` / `UnknownPlugin` - bad configuration
//! - `Io` - system errors, always bubbled up unchanged
//!
//! `Cache` and `Serialization` errors come out of [`ResultCache`](crate::cache::ResultCache)
//! writes. The engine logs them and carries on, because the cache is only an optimization.
use thiserror::Error;

/// Result type alias using `BenchError`.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Main error type for all ocrbench operations.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image {path}: {message}")]
    ImageLoad {
        path: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Filter '{filter}' failed: {message}")]
    Filter {
        filter: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Reader '{reader}' failed: {message}")]
    Reader {
        reader: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Expected text for entry '{entry_id}' contains no words; success rate is undefined")]
    EmptyExpectedText { entry_id: String },

    #[error("No entries left to aggregate for '{identity}' ({excluded} excluded)")]
    EmptyBatch { identity: String, excluded: usize },

    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unknown {kind} '{name}'")]
    UnknownPlugin { kind: String, name: String },
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<rmp_serde::encode::Error> for BenchError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        BenchError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<rmp_serde::decode::Error> for BenchError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        BenchError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl BenchError {
    error_constructor!(cache, Cache);
    error_constructor!(serialization, Serialization);
    error_constructor!(validation, Validation);

    /// Create an `ImageLoad` error for `path`.
    pub fn image_load<P: AsRef<std::path::Path>, S: Into<String>>(path: P, message: S) -> Self {
        Self::ImageLoad {
            path: path.as_ref().display().to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an `ImageLoad` error for `path` that keeps the decoder error as source.
    pub fn image_load_with_source<P, S, E>(path: P, message: S, source: E) -> Self
    where
        P: AsRef<std::path::Path>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            path: path.as_ref().display().to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn filter<N: Into<String>, S: Into<String>>(filter: N, message: S) -> Self {
        Self::Filter {
            filter: filter.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attribute `source` to the filter `filter`.
    ///
    /// Entry-level errors pass through untouched so the original cause keeps its variant.
    pub fn filter_with_source<N: Into<String>>(filter: N, source: BenchError) -> Self {
        if source.is_entry_level() {
            return source;
        }
        Self::Filter {
            filter: filter.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn reader<N: Into<String>, S: Into<String>>(reader: N, message: S) -> Self {
        Self::Reader {
            reader: reader.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attribute `source` to the reader `reader`; see [`BenchError::filter_with_source`].
    pub fn reader_with_source<N: Into<String>>(reader: N, source: BenchError) -> Self {
        if source.is_entry_level() {
            return source;
        }
        Self::Reader {
            reader: reader.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn unknown_plugin<K: Into<String>, N: Into<String>>(kind: K, name: N) -> Self {
        Self::UnknownPlugin {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Whether the error only concerns a single dataset entry.
    ///
    /// Entry-level errors are recorded as exclusions; anything else aborts the run.
    pub fn is_entry_level(&self) -> bool {
        matches!(
            self,
            Self::ImageLoad { .. } | Self::Filter { .. } | Self::Reader { .. } | Self::EmptyExpectedText { .. }
        )
    }
}
