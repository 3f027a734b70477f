//! Labeled image datasets.

use crate::error::Result;
use crate::types::DatasetEntry;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Source of dataset entries for benchmark runs.
pub trait Dataset: Send + Sync {
    /// The first `count` entries in loader order, or all of them when fewer exist.
    ///
    /// Entry ids are unique within the returned list.
    fn get(&self, count: usize) -> Vec<DatasetEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keep the first entry for every id.
fn dedupe(entries: Vec<DatasetEntry>) -> Vec<DatasetEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let fresh = seen.insert(entry.entry_id.clone());
            if !fresh {
                tracing::warn!("Dropping duplicate dataset entry '{}'", entry.entry_id);
            }
            fresh
        })
        .collect()
}

/// Dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    entries: Vec<DatasetEntry>,
}

impl InMemoryDataset {
    pub fn new(entries: Vec<DatasetEntry>) -> Self {
        Self {
            entries: dedupe(entries),
        }
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }
}

impl Dataset for InMemoryDataset {
    fn get(&self, count: usize) -> Vec<DatasetEntry> {
        self.entries.iter().take(count).cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Dataset read from a directory of images with sibling ground-truth files.
///
/// `scan.png` is paired with `scan.txt`; the file stem becomes the entry id.
/// Files are visited in file-name order, so the entry order is stable across runs.
#[derive(Debug, Clone)]
pub struct DirectoryDataset {
    entries: Vec<DatasetEntry>,
}

impl DirectoryDataset {
    /// Scan `dir` (non-recursively) for labeled images.
    ///
    /// # Errors
    ///
    /// `BenchError::Io` when the directory or a ground-truth file cannot be read.
    /// A ground-truth file that is not valid UTF-8 only skips its image.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();

        let mut paths: Vec<PathBuf> = fs::read_dir(&root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for image_path in paths {
            let Some(stem) = image_path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let text_path = image_path.with_extension("txt");
            if !text_path.is_file() {
                tracing::warn!("Skipping {}: no ground truth at {}", image_path.display(), text_path.display());
                continue;
            }

            let expected_text = match fs::read_to_string(&text_path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!("Skipping {}: {} is not valid UTF-8", image_path.display(), text_path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            entries.push(DatasetEntry::new(image_path, expected_text, stem));
        }

        let entries = dedupe(entries);
        tracing::debug!("Loaded {} dataset entries from {}", entries.len(), root.display());

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }
}

impl Dataset for DirectoryDataset {
    fn get(&self, count: usize) -> Vec<DatasetEntry> {
        self.entries.iter().take(count).cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BenchError;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_in_memory_get_caps_at_len() {
        let dataset = InMemoryDataset::new(vec![
            DatasetEntry::new("a.png", "a", "a"),
            DatasetEntry::new("b.png", "b", "b"),
        ]);
        assert_eq!(dataset.get(10).len(), 2);
        assert_eq!(dataset.get(1)[0].entry_id, "a");
        assert!(dataset.get(0).is_empty());
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_in_memory_dedupes_ids() {
        let dataset = InMemoryDataset::new(vec![
            DatasetEntry::new("first.png", "one", "x"),
            DatasetEntry::new("second.png", "two", "x"),
        ]);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get(5)[0].expected_text, "one");
    }

    #[test]
    fn test_directory_pairs_images_with_text() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.png", "");
        touch(dir.path(), "b.txt", "bravo");
        touch(dir.path(), "a.JPG", "");
        touch(dir.path(), "a.txt", "alpha");
        touch(dir.path(), "notes.md", "ignored");

        let dataset = DirectoryDataset::load(dir.path()).unwrap();
        let entries = dataset.get(10);

        let ids: Vec<&str> = entries.iter().map(|e| e.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(entries[0].expected_text, "alpha");
        assert_eq!(entries[1].image_path, dir.path().join("b.png"));
    }

    #[test]
    fn test_directory_skips_unlabeled_images() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "lonely.png", "");
        touch(dir.path(), "paired.jpeg", "");
        touch(dir.path(), "paired.txt", "text");

        let dataset = DirectoryDataset::load(dir.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get(1)[0].entry_id, "paired");
    }

    #[test]
    fn test_directory_dedupes_by_stem() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "scan.jpg", "");
        touch(dir.path(), "scan.png", "");
        touch(dir.path(), "scan.txt", "text");

        let dataset = DirectoryDataset::load(dir.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get(1)[0].image_path, dir.path().join("scan.jpg"));
    }

    #[test]
    fn test_directory_skips_non_utf8_ground_truth() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "latin1.png", "");
        fs::write(dir.path().join("latin1.txt"), [0x63, 0x61, 0x66, 0xE9, 0xFF, 0xFE]).unwrap();
        touch(dir.path(), "plain.png", "");
        touch(dir.path(), "plain.txt", "cafe");

        let dataset = DirectoryDataset::load(dir.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get(5)[0].entry_id, "plain");
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let err = DirectoryDataset::load(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BenchError::Io(_)));
    }
}
