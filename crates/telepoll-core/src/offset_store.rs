//! File-backed offset persistence.

use crate::{error::TelepollError, traits::OffsetStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct StoredOffset {
    offset: i64,
}

/// Keeps the committed offset in a small JSON file: `{"offset": 1234}`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct FileOffsetStore {
    path: PathBuf,
}

impl FileOffsetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl OffsetStore for FileOffsetStore {
    fn load(&self) -> Result<Option<i64>, TelepollError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let stored: StoredOffset = serde_json::from_str(&content)?;
        Ok(Some(stored.offset))
    }

    fn save(&self, offset: i64) -> Result<(), TelepollError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        std::fs::write(&tmp, serde_json::to_vec(&StoredOffset { offset })?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOffsetStore::new(dir.path().join("offset.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOffsetStore::new(dir.path().join("state/offset.json"));
        store.save(812).unwrap();
        assert_eq!(store.load().unwrap(), Some(812));

        store.save(813).unwrap();
        assert_eq!(store.load().unwrap(), Some(813));
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileOffsetStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(TelepollError::Serialization(_))
        ));
    }
}
