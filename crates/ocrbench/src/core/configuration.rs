//! Pipeline configurations and their identity.

use crate::Result;
use crate::plugins::registry::validate_plugin_name;
use crate::plugins::{FilterRegistry, ImageFilter, OcrReader, ReaderRegistry};
use crate::types::PipelineDescriptor;
use std::sync::Arc;

/// One OCR pipeline variant under test: ordered filters followed by a reader.
///
/// Two configurations are the same pipeline exactly when their [`identity`](Self::identity)
/// strings are equal; instances are never compared any other way.
#[derive(Clone)]
pub struct Configuration {
    reader: Arc<dyn OcrReader>,
    filters: Vec<Arc<dyn ImageFilter>>,
}

impl Configuration {
    /// Assemble a configuration from plugin instances.
    ///
    /// # Errors
    ///
    /// `BenchError::Validation` when a plugin name could not be told apart inside
    /// an identity (empty, padded, or containing `,` or `:`).
    pub fn new(reader: Arc<dyn OcrReader>, filters: Vec<Arc<dyn ImageFilter>>) -> Result<Self> {
        validate_plugin_name(reader.name())?;
        for filter in &filters {
            validate_plugin_name(filter.name())?;
        }
        Ok(Self { reader, filters })
    }

    /// Build a configuration by looking names up in the registries.
    ///
    /// # Errors
    ///
    /// `BenchError::UnknownPlugin` for the first name that is not registered.
    pub fn from_names<S: AsRef<str>>(
        reader: &str,
        filters: &[S],
        readers: &ReaderRegistry,
        filter_registry: &FilterRegistry,
    ) -> Result<Self> {
        Self::new(readers.get(reader)?, filter_registry.resolve(filters)?)
    }

    pub fn reader(&self) -> &Arc<dyn OcrReader> {
        &self.reader
    }

    pub fn filters(&self) -> &[Arc<dyn ImageFilter>] {
        &self.filters
    }

    /// Names-only snapshot, as stored with results.
    pub fn descriptor(&self) -> PipelineDescriptor {
        PipelineDescriptor::new(
            self.reader.name(),
            self.filters.iter().map(|filter| filter.name().to_string()).collect(),
        )
    }

    /// Cache key: `"<reader>: <filter>, <filter>, ..."`.
    pub fn identity(&self) -> String {
        self.descriptor().identity()
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Configuration").field(&self.identity()).finish()
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity())
    }
}
