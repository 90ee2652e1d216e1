//! Profile-file storage backend.
//!
//! A profile is a single JSON object file mapping keys to string values, the
//! on-disk counterpart of one browser profile's local storage:
//!
//! ```json
//! { "admin-mode": "true", "hero-text-settings": "{\"alignment\":\"left\",...}" }
//! ```
//!
//! The whole file is read once on [`ProfileBackend::open`] and rewritten on
//! every `put`/`delete` via a temporary file and an atomic rename, so a crash
//! mid-write leaves the previous profile intact. A `Mutex` serializes writers
//! within one process; separate processes sharing a file are last-writer-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::{keys_with_prefix, StorageBackend, StorageError};

/// A storage backend persisted to a single JSON profile file.
pub struct ProfileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl std::fmt::Debug for ProfileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ProfileBackend {
    /// Open the profile file at `path`.
    ///
    /// A missing file is an empty profile; it is created on the first write.
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Open`] if the file exists but cannot be read, or its
    ///   directory cannot be created.
    /// - [`StorageError::Malformed`] if it is not a JSON object of strings.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |reason: String| StorageError::Open {
            path: path.display().to_string(),
            reason,
        };

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str::<BTreeMap<String, String>>(&raw).map_err(|e| {
                StorageError::Malformed {
                    path: path.display().to_string(),
                    reason: format!("expected a JSON object of strings: {e}"),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(open_err(e.to_string())),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| open_err(format!("failed to create profile directory: {e}")))?;
        }

        debug!(path = %path.display(), keys = entries.len(), "profile opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Return the filesystem path of this profile.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full map to disk: temp file first, then rename over the profile.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), String> {
        let body = serde_json::to_vec_pretty(entries).map_err(|e| e.to_string())?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| format!("failed to write '{}': {e}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| format!("failed to replace '{}': {e}", self.path.display()))
    }
}

#[async_trait::async_trait]
impl StorageBackend for ProfileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_owned(), value.to_owned());

        if let Err(reason) = self.persist(&entries).await {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(StorageError::Write {
                key: key.to_owned(),
                reason,
            });
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };

        if let Err(reason) = self.persist(&entries).await {
            entries.insert(key.to_owned(), previous);
            return Err(StorageError::Remove {
                key: key.to_owned(),
                reason,
            });
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(keys_with_prefix(&*self.entries.lock().await, prefix))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_profile() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ProfileBackend::open(dir.path().join("profile.json"))
            .await
            .unwrap();
        assert!(backend.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("profile.json");

        let backend = ProfileBackend::open(&path).await.unwrap();
        backend.put("admin-mode", "true").await.unwrap();
        backend.put("hero-text-settings", "{\"alignment\":\"left\"}").await.unwrap();
        backend.delete("admin-mode").await.unwrap();
        drop(backend);

        let reopened = ProfileBackend::open(&path).await.unwrap();
        assert_eq!(reopened.get("admin-mode").await.unwrap(), None);
        assert_eq!(
            reopened.get("hero-text-settings").await.unwrap().as_deref(),
            Some("{\"alignment\":\"left\"}")
        );
    }

    #[tokio::test]
    async fn corrupt_profile_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let result = ProfileBackend::open(&path).await;
        assert!(matches!(result, Err(StorageError::Malformed { .. })));
    }

    #[tokio::test]
    async fn separate_instances_do_not_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let first = ProfileBackend::open(&path).await.unwrap();
        let second = ProfileBackend::open(&path).await.unwrap();
        first.put("admin-mode", "true").await.unwrap();

        // No cross-instance notification: the second view is stale until reopened.
        assert_eq!(second.get("admin-mode").await.unwrap(), None);
        let third = ProfileBackend::open(&path).await.unwrap();
        assert_eq!(third.get("admin-mode").await.unwrap().as_deref(), Some("true"));
    }
}
