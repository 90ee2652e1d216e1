//! Core library for lendfront.
//!
//! Settings persistence for the loan-brokerage landing page: the schema of
//! every visual region, typed group keys with hard-coded defaults, the
//! persistence adapter with per-field fallback, the settings store and its
//! subscribers, draft-based manager dialogs, the admin-mode gate, and the
//! style values derived from settings. The upload and lead modules define
//! the contracts of the two services the site talks to; their I/O lives in
//! `lendfront-server`.

pub mod adapter;
pub mod admin;
pub mod dialog;
pub mod error;
pub mod group;
pub mod lead;
pub mod schema;
pub mod store;
pub mod style;
pub mod upload;

pub use adapter::{DefaultReason, Defaulted, PersistenceAdapter, SettingsValue};
pub use admin::{AdminGate, AdminLogin, ClickWindow};
pub use dialog::{DialogOutcome, ManagerDialog};
pub use error::{AdminError, DialogError, LeadError, StoreError, UploadError};
pub use group::{GroupId, GroupKey};
pub use store::{GroupCell, HydrationReport, SettingsStore};
pub use style::{Preview, StyleBlock, Surface};
