//! Benchmark engine: batch execution with result caching.

use crate::cache::ResultCache;
use crate::core::configuration::Configuration;
use crate::core::pipeline::run_pipeline;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{ExcludedEntry, MultiResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Runs configurations over a dataset sample and remembers the outcomes.
///
/// A result is looked up by configuration identity before any work is done. Only
/// batches in which every sampled entry succeeded are written back, so a cached
/// value always covers its whole sample.
///
/// The cache file is not locked; do not point two engines at the same path
/// concurrently.
pub struct BenchmarkEngine {
    cache: ResultCache,
    dataset: Arc<dyn Dataset>,
}

impl BenchmarkEngine {
    /// Create an engine, loading whatever the cache file at `cache_path` holds.
    ///
    /// Never fails: a missing or unusable cache file yields an empty cache.
    pub fn new(cache_path: impl Into<PathBuf>, dataset: Arc<dyn Dataset>) -> Self {
        let cache = ResultCache::load(cache_path);
        tracing::debug!(
            "Benchmark engine ready: {} cached results, {} dataset entries",
            cache.len(),
            dataset.len()
        );
        Self { cache, dataset }
    }

    /// Evaluate `config` on the first `sample_size` dataset entries.
    ///
    /// Returns the cached result when one exists for the configuration identity,
    /// unless `ignore_cache` is set. `sample_size` is not part of the identity, so a
    /// hit may come from a run over a different sample size.
    ///
    /// Entries that fail to load, filter, read or score are excluded and logged;
    /// the batch carries on without them. This holds for any error a plugin
    /// raises, including I/O errors.
    ///
    /// # Errors
    ///
    /// `BenchError::EmptyBatch` when no entry produced a result.
    pub fn run(&mut self, config: &Configuration, sample_size: usize, ignore_cache: bool) -> Result<MultiResult> {
        let identity = config.identity();

        if !ignore_cache && let Some(cached) = self.cache.get(&identity) {
            tracing::debug!("Cache hit for '{}'", identity);
            return Ok(cached.clone());
        }

        let entries = self.dataset.get(sample_size);
        tracing::info!("Running '{}' on {} entries", identity, entries.len());

        let mut results = Vec::with_capacity(entries.len());
        let mut excluded = Vec::new();

        for entry in &entries {
            match run_pipeline(config, entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!("Excluding entry '{}' from '{}': {}", entry.entry_id, identity, e);
                    excluded.push(ExcludedEntry {
                        entry_id: entry.entry_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let result = MultiResult::aggregate(config.descriptor(), results, excluded)?;

        if result.is_complete() {
            if let Err(e) = self.cache.insert(identity.clone(), result.clone()) {
                tracing::warn!("Failed to persist result for '{}': {}", identity, e);
            }
        } else {
            tracing::warn!(
                "Not caching '{}': {} of {} entries were excluded",
                identity,
                result.excluded().len(),
                entries.len()
            );
        }

        tracing::info!(
            "Finished '{}': average success {:.3}, average time {:.1} ms",
            identity,
            result.average_success(),
            result.average_time_ms()
        );

        Ok(result)
    }

    /// Cached result for `identity`, if any.
    pub fn cached(&self, identity: &str) -> Option<&MultiResult> {
        self.cache.get(identity)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Remove every cached result. Returns the number of entries removed.
    pub fn clear_cache(&mut self) -> Result<usize> {
        let removed = self.cache.clear()?;
        tracing::info!("Cleared {} cached results", removed);
        Ok(removed)
    }
}

impl std::fmt::Debug for BenchmarkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkEngine")
            .field("cache", &self.cache.path())
            .field("cached_results", &self.cache.len())
            .field("dataset_entries", &self.dataset.len())
            .finish()
    }
}
