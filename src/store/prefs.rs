//! Key-value preference storage.
//!
//! Values are plain strings grouped by namespace. The file-backed store keeps
//! one JSON object per namespace in the data directory:
//!
//! ```text
//! ~/.local/share/bookmark/
//!   MarkedBooksPrefs.json    {"markedBooks": "[...]"}
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::StoreError;

/// String key-value storage grouped by namespace
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Read a value; `Ok(None)` when the key has never been written
    fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    fn put_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Preferences persisted as JSON files on disk
#[derive(Debug, Clone)]
pub struct FilePreferences {
    dir: PathBuf,
}

impl FilePreferences {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing a namespace
    pub fn namespace_path(&self, namespace: &str) -> Result<PathBuf, StoreError> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Backend(format!(
                "Invalid preference namespace: {:?}",
                namespace
            )));
        }
        Ok(self.dir.join(format!("{}.json", namespace)))
    }

    fn read_namespace(&self, path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(
                    "Ignoring undecodable preference file {}: {}",
                    path.display(),
                    e
                );
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(values) => Ok(values),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable preference file {}: {}",
                    path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Write to a temp file next to the target, then rename over it
    fn write_namespace(
        &self,
        path: &Path,
        values: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(values)?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!("Wrote preferences to {}", path.display());
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.namespace_path(namespace)?;
        Ok(self.read_namespace(&path)?.remove(key))
    }

    fn put_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.namespace_path(namespace)?;
        let mut values = self.read_namespace(&path)?;
        values.insert(key.to_string(), value.to_string());
        self.write_namespace(&path, &values)
    }
}

/// In-process preferences, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self
            .values
            .lock()
            .map_err(|_| StoreError::Backend("preference lock poisoned".to_string()))?;
        Ok(guard
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn put_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|_| StoreError::Backend("preference lock poisoned".to_string()))?;
        guard.insert(
            (namespace.to_string(), key.to_string()),
            value.to_string(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_preferences_round_trip() {
        let dir = tempdir().unwrap();
        let prefs = FilePreferences::new(dir.path().join("data"));

        assert_eq!(prefs.get_string("Prefs", "key").unwrap(), None);

        prefs.put_string("Prefs", "key", "value").unwrap();
        prefs.put_string("Prefs", "other", "second").unwrap();

        assert_eq!(
            prefs.get_string("Prefs", "key").unwrap(),
            Some("value".to_string())
        );
        assert_eq!(
            prefs.get_string("Prefs", "other").unwrap(),
            Some("second".to_string())
        );
        assert!(dir.path().join("data").join("Prefs.json").exists());
    }

    #[test]
    fn test_file_preferences_namespaces_are_separate() {
        let dir = tempdir().unwrap();
        let prefs = FilePreferences::new(dir.path());

        prefs.put_string("One", "key", "1").unwrap();
        assert_eq!(prefs.get_string("Two", "key").unwrap(), None);
    }

    #[test]
    fn test_corrupt_namespace_file_reads_empty() {
        let dir = tempdir().unwrap();
        let prefs = FilePreferences::new(dir.path());
        std::fs::write(dir.path().join("Prefs.json"), "{not json").unwrap();

        assert_eq!(prefs.get_string("Prefs", "key").unwrap(), None);

        prefs.put_string("Prefs", "key", "fresh").unwrap();
        assert_eq!(
            prefs.get_string("Prefs", "key").unwrap(),
            Some("fresh".to_string())
        );
    }

    #[test]
    fn test_non_utf8_namespace_file_reads_empty() {
        let dir = tempdir().unwrap();
        let prefs = FilePreferences::new(dir.path());
        std::fs::write(dir.path().join("Prefs.json"), [0xff, 0xfe]).unwrap();

        assert_eq!(prefs.get_string("Prefs", "key").unwrap(), None);
        prefs.put_string("Prefs", "key", "fresh").unwrap();
        assert_eq!(
            prefs.get_string("Prefs", "key").unwrap(),
            Some("fresh".to_string())
        );
    }

    #[test]
    fn test_namespace_rejects_paths() {
        let prefs = FilePreferences::new("/tmp");
        assert!(prefs.namespace_path("../escape").is_err());
        assert!(prefs.namespace_path("").is_err());
        assert!(prefs.namespace_path("MarkedBooksPrefs").is_ok());
    }

    #[test]
    fn test_memory_preferences() {
        let prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_string("ns", "k").unwrap(), None);
        prefs.put_string("ns", "k", "v").unwrap();
        assert_eq!(prefs.get_string("ns", "k").unwrap(), Some("v".to_string()));
        assert_eq!(prefs.get_string("other", "k").unwrap(), None);
    }
}
