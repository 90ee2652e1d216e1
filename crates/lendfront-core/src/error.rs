//! Error types for `lendfront-core`.
//!
//! Decode failures of stored settings are deliberately absent here: they are
//! recovered by falling back to the group default (see
//! [`crate::adapter::Defaulted`]) and never reach callers as errors.

use lendfront_storage::StorageError;

/// Errors from the settings store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store has not finished hydrating from storage.
    #[error("settings store is not ready (hydrate has not completed)")]
    NotReady,

    /// A value could not be serialized for storage.
    #[error("failed to encode settings for '{key}': {reason}")]
    Encode { key: String, reason: String },

    /// A caller-supplied value does not have the group's shape.
    #[error("invalid value for settings group '{group}': {reason}")]
    InvalidValue { group: String, reason: String },

    /// The storage backend rejected a write.
    #[error("settings storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from manager dialog transitions.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// `open` was called while a draft is already being edited.
    #[error("dialog for '{group}' is already open")]
    AlreadyOpen { group: String },

    /// A draft operation was called while the dialog is closed.
    #[error("dialog for '{group}' is not open")]
    NotOpen { group: String },

    /// An upload result did not include the original-size variant.
    #[error("upload for '{group}' returned no original variant")]
    NoOriginalVariant { group: String },

    /// The store rejected the open or the save.
    #[error("dialog store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the admin-mode gate and admin login.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Persisting the flag or the login marker failed.
    #[error("admin storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the image upload pipeline.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// No file, or a zero-length file, was submitted.
    #[error("no file uploaded")]
    Empty,

    /// The declared MIME type is not an accepted image type.
    #[error("invalid file type '{mime}'")]
    UnsupportedType { mime: String },

    /// The payload exceeds the size ceiling.
    #[error("file too large: {size} bytes exceeds the {limit}-byte limit")]
    TooLarge { size: usize, limit: usize },

    /// The bytes could not be decoded as an image.
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },

    /// Re-encoding or writing a variant failed.
    #[error("failed to store image variant '{variant}': {reason}")]
    Store { variant: String, reason: String },
}

/// Errors from lead intake and notification.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    /// A required form field is missing or blank.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The notification webhook is not configured.
    #[error("lead notifier is not configured: {reason}")]
    NotConfigured { reason: String },

    /// The webhook request failed or timed out.
    #[error("lead webhook request failed: {reason}")]
    Webhook { reason: String },

    /// The webhook answered with a non-success status.
    #[error("lead webhook returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}
