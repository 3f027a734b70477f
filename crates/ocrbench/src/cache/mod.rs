//! Persistent store of benchmark results, keyed by configuration identity.
//!
//! The whole cache lives in one MessagePack file holding a versioned envelope.
//! Every write rewrites the file through a temp file and a rename, so a crash
//! mid-write leaves the previous contents intact.
//!
//! There is no locking: one process is expected to own the file at a time.

use crate::error::{BenchError, Result};
use crate::types::MultiResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Envelope version written by this build.
pub const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct CacheFile {
    version: u32,
    entries: IndexMap<String, MultiResult>,
}

/// Write-side twin of [`CacheFile`] that borrows the entries.
#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    entries: &'a IndexMap<String, MultiResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    /// Size of the cache file on disk, 0 when it does not exist yet.
    pub file_size_bytes: u64,
}

/// Identity → aggregate result map backed by a single file.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    entries: IndexMap<String, MultiResult>,
}

impl ResultCache {
    /// Open the cache stored at `path`.
    ///
    /// A missing file gives an empty cache. An unreadable, undecodable or
    /// version-mismatched file is logged and also gives an empty cache; it will be
    /// overwritten on the next insert.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(Some(entries)) => {
                tracing::debug!("Loaded {} cached results from {}", entries.len(), path.display());
                entries
            }
            Ok(None) => IndexMap::new(),
            Err(e) => {
                tracing::warn!("Ignoring unusable result cache at {}: {}", path.display(), e);
                IndexMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, identity: &str) -> Option<&MultiResult> {
        self.entries.get(identity)
    }

    /// Store `result` under `identity`, replacing any previous value, and flush.
    ///
    /// The in-memory entry is kept even when the flush fails.
    pub fn insert(&mut self, identity: impl Into<String>, result: MultiResult) -> Result<()> {
        self.entries.insert(identity.into(), result);
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached identities with their results, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiResult)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop every entry and flush. Returns how many entries were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.entries.len();
        self.entries.clear();
        self.save()?;
        Ok(removed)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            file_size_bytes: fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        }
    }

    /// Write the full cache to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| BenchError::cache_with_source(format!("Failed to create cache directory: {}", e), e))?;
        }

        let file = CacheFileRef {
            version: CACHE_FORMAT_VERSION,
            entries: &self.entries,
        };
        let serialized = rmp_serde::to_vec_named(&file)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, &serialized)
            .map_err(|e| BenchError::cache_with_source(format!("Failed to write temp cache file: {}", e), e))?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            BenchError::cache_with_source(format!("Failed to rename cache file: {}", e), e)
        })?;

        tracing::debug!("Saved {} cached results to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cache".to_string());
        let pid = std::process::id();
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        self.path.with_file_name(format!("{}.tmp.{}.{}", file_name, pid, timestamp))
    }
}

fn read_entries(path: &Path) -> Result<Option<IndexMap<String, MultiResult>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let file: CacheFile = rmp_serde::from_slice(&bytes)?;
    if file.version != CACHE_FORMAT_VERSION {
        return Err(BenchError::cache(format!(
            "Unsupported cache format version {} (expected {})",
            file.version, CACHE_FORMAT_VERSION
        )));
    }

    Ok(Some(file.entries))
}
