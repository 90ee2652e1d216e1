//! Storage backend abstraction for lendfront.
//!
//! This crate defines the [`StorageBackend`] trait: a string-keyed,
//! string-valued storage interface modelled on a browser profile's local
//! storage. It knows nothing about settings groups, defaults, or JSON shapes;
//! the persistence adapter in `lendfront-core` owns those concerns.
//!
//! Two implementations are provided:
//!
//! - [`ProfileBackend`]: a single JSON profile file on disk
//! - [`MemoryBackend`]: in-memory, for tests and the development server

mod error;
mod memory;
mod profile;

pub use error::StorageError;
pub use memory::MemoryBackend;
pub use profile::ProfileBackend;

use std::collections::BTreeMap;

/// Keys of `entries` starting with `prefix`, in sorted order.
fn keys_with_prefix(entries: &BTreeMap<String, String>, prefix: &str) -> Vec<String> {
    entries
        .range(prefix.to_owned()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, _)| k.clone())
        .collect()
}

/// A pluggable key-value storage backend.
///
/// Keys are flat UTF-8 strings (e.g. `hero-text-settings`, `admin-mode`).
/// Values are UTF-8 strings; settings groups store compact JSON.
///
/// Writes are visible only to users of the same backend instance (or the
/// same profile file). There is no change notification between instances.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting a non-existent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Remove`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List all keys that start with the given prefix, in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
