use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One labeled image of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub image_path: PathBuf,
    pub expected_text: String,
    pub entry_id: String,
}

impl DatasetEntry {
    pub fn new(image_path: impl Into<PathBuf>, expected_text: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            expected_text: expected_text.into(),
            entry_id: entry_id.into(),
        }
    }
}

/// Names-only view of a pipeline configuration.
///
/// This is what gets persisted next to a result: only the display names of the
/// reader and filters take part in any contract, so nothing else is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub reader: String,
    pub filters: Vec<String>,
}

impl PipelineDescriptor {
    pub fn new(reader: impl Into<String>, filters: Vec<String>) -> Self {
        Self {
            reader: reader.into(),
            filters,
        }
    }

    /// Cache key of the pipeline: `"<reader>: <filter>, <filter>, ..."`.
    ///
    /// Filter order is preserved, so `[a, b]` and `[b, a]` never share a key.
    pub fn identity(&self) -> String {
        format!("{}: {}", self.reader, self.filters.join(", "))
    }
}

impl std::fmt::Display for PipelineDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity())
    }
}

/// Outcome of running one pipeline on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResult {
    pub entry_id: String,
    /// Wall time spent in filters and reader, in milliseconds.
    pub elapsed_ms: f64,
    /// Fraction of expected words found in the output, in `[0, 1]`.
    pub success: f64,
    pub lines: Vec<String>,
    pub expected_text: String,
}

/// A dataset entry that was left out of a batch, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedEntry {
    pub entry_id: String,
    pub reason: String,
}

/// Aggregate outcome of one pipeline over a batch of dataset entries.
///
/// Only [`MultiResult::aggregate`] builds one, and it refuses empty batches, so the
/// averages are always well defined. The value is never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiResult {
    pipeline: PipelineDescriptor,
    results: Vec<SingleResult>,
    excluded: Vec<ExcludedEntry>,
    total_time_ms: f64,
    total_success: f64,
    average_time_ms: f64,
    average_success: f64,
}

impl MultiResult {
    /// Aggregate per-image results (in entry order) into a batch summary.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::EmptyBatch` when `results` is empty.
    pub fn aggregate(
        pipeline: PipelineDescriptor,
        results: Vec<SingleResult>,
        excluded: Vec<ExcludedEntry>,
    ) -> Result<Self> {
        if results.is_empty() {
            return Err(BenchError::EmptyBatch {
                identity: pipeline.identity(),
                excluded: excluded.len(),
            });
        }

        let count = results.len() as f64;
        let total_time_ms: f64 = results.iter().map(|r| r.elapsed_ms).sum();
        let total_success: f64 = results.iter().map(|r| r.success).sum();

        Ok(Self {
            pipeline,
            results,
            excluded,
            total_time_ms,
            total_success,
            average_time_ms: total_time_ms / count,
            average_success: total_success / count,
        })
    }

    pub fn pipeline(&self) -> &PipelineDescriptor {
        &self.pipeline
    }

    pub fn identity(&self) -> String {
        self.pipeline.identity()
    }

    pub fn results(&self) -> &[SingleResult] {
        &self.results
    }

    /// Entries that failed to load, filter, read or score.
    pub fn excluded(&self) -> &[ExcludedEntry] {
        &self.excluded
    }

    pub fn is_complete(&self) -> bool {
        self.excluded.is_empty()
    }

    pub fn total_time_ms(&self) -> f64 {
        self.total_time_ms
    }

    pub fn total_success(&self) -> f64 {
        self.total_success
    }

    pub fn average_time_ms(&self) -> f64 {
        self.average_time_ms
    }

    pub fn average_success(&self) -> f64 {
        self.average_success
    }
}
