//! Unsaved profile.
//!
//! [`MemoryBackend`] is a browser profile that never reaches disk: the
//! development server's default and the backend every test runs against.
//! Clones are tabs of the same profile and see each other's writes at once;
//! two separately constructed backends are unrelated profiles.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{keys_with_prefix, StorageBackend, StorageError};

/// A local-storage profile held in memory.
///
/// ```
/// # use lendfront_storage::{MemoryBackend, StorageBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let profile = MemoryBackend::with_entries([("admin-mode", "true")]);
/// let tab = profile.clone();
/// tab.delete("admin-mode").await.unwrap();
/// assert!(!profile.exists("admin-mode").await.unwrap());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    /// An empty profile, as a first-time visitor has.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A profile seeded with `(key, value)` pairs, e.g. settings written by an
    /// older build of the site.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(keys_with_prefix(&*self.entries.read().await, prefix))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_visit_has_no_settings() {
        let profile = MemoryBackend::new();
        assert_eq!(profile.get("hero-text-settings").await.unwrap(), None);
        assert!(!profile.exists("admin-mode").await.unwrap());
    }

    #[tokio::test]
    async fn saving_a_group_replaces_the_stored_json() {
        let profile = MemoryBackend::new();
        profile
            .put("hero-text-settings", r#"{"alignment":"left"}"#)
            .await
            .unwrap();
        profile
            .put("hero-text-settings", r#"{"alignment":"center"}"#)
            .await
            .unwrap();
        assert_eq!(
            profile.get("hero-text-settings").await.unwrap().as_deref(),
            Some(r#"{"alignment":"center"}"#)
        );
    }

    #[tokio::test]
    async fn logout_of_a_fresh_profile_is_fine() {
        let profile = MemoryBackend::new();
        profile.delete("admin-auth").await.unwrap();
        assert!(!profile.exists("admin-auth").await.unwrap());
    }

    #[tokio::test]
    async fn section_keys_list_by_prefix() {
        let profile = MemoryBackend::with_entries([
            ("hero-background-settings", "{}"),
            ("hero-custom-backgrounds", "[]"),
            ("loan-card-settings", "[]"),
        ]);

        assert_eq!(
            profile.list("hero-").await.unwrap(),
            vec!["hero-background-settings", "hero-custom-backgrounds"]
        );
        assert_eq!(profile.list("").await.unwrap().len(), 3);
        assert!(profile.list("service-").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tabs_of_one_profile_share_writes() {
        let profile = MemoryBackend::new();
        let tab = profile.clone();
        profile.put("admin-mode", "true").await.unwrap();
        assert_eq!(tab.get("admin-mode").await.unwrap().as_deref(), Some("true"));

        let other_profile = MemoryBackend::new();
        assert!(!other_profile.exists("admin-mode").await.unwrap());
    }
}
