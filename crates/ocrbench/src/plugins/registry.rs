//! Name-based lookup of filters and readers.
//!
//! Configurations coming from the CLI or a config file only carry names; the
//! registries resolve them to shared plugin instances.

use crate::filters::BuiltinFilter;
use crate::plugins::{ImageFilter, OcrReader};
use crate::{BenchError, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Validate a plugin name before registration.
///
/// # Rules
///
/// - Name cannot be empty
/// - Name cannot start or end with whitespace (it would be invisible in identities)
/// - Name cannot contain `,` or `:` (they delimit configuration identities)
pub(crate) fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BenchError::validation("Plugin name cannot be empty"));
    }

    if name.trim() != name {
        return Err(BenchError::validation(format!(
            "Plugin name '{}' cannot start or end with whitespace",
            name
        )));
    }

    if name.contains([',', ':']) {
        return Err(BenchError::validation(format!(
            "Plugin name '{}' cannot contain ',' or ':'",
            name
        )));
    }

    Ok(())
}

/// Registry of image filters, keyed by display name.
pub struct FilterRegistry {
    filters: IndexMap<String, Arc<dyn ImageFilter>>,
}

impl FilterRegistry {
    /// Create a registry holding every built-in filter.
    pub fn new() -> Self {
        let mut registry = Self::new_empty();
        for filter in BuiltinFilter::all() {
            registry.filters.insert(filter.name().to_string(), Arc::new(*filter));
        }
        registry
    }

    pub fn new_empty() -> Self {
        Self {
            filters: IndexMap::new(),
        }
    }

    /// Register a filter, replacing any filter with the same name.
    pub fn register(&mut self, filter: Arc<dyn ImageFilter>) -> Result<()> {
        let name = filter.name().to_string();
        validate_plugin_name(&name)?;
        if self.filters.insert(name.clone(), filter).is_some() {
            tracing::debug!("Replaced filter '{}'", name);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn ImageFilter>> {
        self.filters
            .get(name)
            .cloned()
            .ok_or_else(|| BenchError::unknown_plugin("filter", name))
    }

    /// Resolve an ordered list of names, keeping order and repeats.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn ImageFilter>>> {
        names.iter().map(|name| self.get(name.as_ref())).collect()
    }

    pub fn list(&self) -> Vec<String> {
        self.filters.keys().cloned().collect()
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.filters
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| BenchError::unknown_plugin("filter", name))
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of OCR readers, keyed by display name.
pub struct ReaderRegistry {
    readers: IndexMap<String, Arc<dyn OcrReader>>,
}

impl ReaderRegistry {
    /// Create a registry with the default readers.
    ///
    /// Registers the Tesseract reader when the `tesseract` feature is enabled.
    pub fn new() -> Self {
        #[cfg(feature = "tesseract")]
        let mut registry = Self::new_empty();

        #[cfg(not(feature = "tesseract"))]
        let registry = Self::new_empty();

        #[cfg(feature = "tesseract")]
        {
            let reader = crate::ocr::TesseractReader::new(crate::ocr::TesseractConfig::default());
            registry.readers.insert(reader.name().to_string(), Arc::new(reader));
        }

        registry
    }

    pub fn new_empty() -> Self {
        Self {
            readers: IndexMap::new(),
        }
    }

    /// Register a reader, replacing any reader with the same name.
    pub fn register(&mut self, reader: Arc<dyn OcrReader>) -> Result<()> {
        let name = reader.name().to_string();
        validate_plugin_name(&name)?;
        if self.readers.insert(name.clone(), reader).is_some() {
            tracing::debug!("Replaced reader '{}'", name);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn OcrReader>> {
        self.readers
            .get(name)
            .cloned()
            .ok_or_else(|| BenchError::unknown_plugin("reader", name))
    }

    pub fn list(&self) -> Vec<String> {
        self.readers.keys().cloned().collect()
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.readers
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| BenchError::unknown_plugin("reader", name))
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
