//! Storage error types.
//!
//! Profile-level failures name the file; key-level failures name the
//! local-storage key. A failed write or removal leaves the previous value in
//! place, in memory and on disk.

/// Errors from a local-storage profile.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The profile file exists but could not be read, or its directory could
    /// not be created.
    #[error("cannot open profile '{path}': {reason}")]
    Open { path: String, reason: String },

    /// The profile file is not a JSON object of string values.
    #[error("profile '{path}' is malformed: {reason}")]
    Malformed { path: String, reason: String },

    /// A key could not be read from the profile.
    #[error("cannot read '{key}' from local storage: {reason}")]
    Read { key: String, reason: String },

    /// A value could not be saved; the key keeps its previous value.
    #[error("cannot save '{key}' to local storage: {reason}")]
    Write { key: String, reason: String },

    /// A key could not be removed; it keeps its previous value.
    #[error("cannot remove '{key}' from local storage: {reason}")]
    Remove { key: String, reason: String },
}
