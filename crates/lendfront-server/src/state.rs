//! Shared application state for the lendfront server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::path::PathBuf;
use std::sync::Arc;

use lendfront_core::admin::{AdminGate, AdminLogin};
use lendfront_core::lead::LeadNotifier;
use lendfront_core::store::SettingsStore;
use lendfront_core::upload::{ImageResizer, UploadPolicy};

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Settings groups of the site profile.
    pub store: Arc<SettingsStore>,
    /// Admin-mode flag and footer click gate.
    pub admin_gate: Arc<AdminGate>,
    /// Admin password login.
    pub admin_login: Arc<AdminLogin>,
    /// Lead notification channel.
    pub notifier: Arc<dyn LeadNotifier>,
    /// Produces and stores upload variants.
    pub resizer: Arc<dyn ImageResizer>,
    /// Limits checked before an upload is decoded.
    pub upload_policy: UploadPolicy,
    /// Root the `/images` route serves stored variants from.
    pub public_dir: PathBuf,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
