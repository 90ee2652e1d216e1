//! Manager dialogs.
//!
//! A dialog edits one settings group through a private draft:
//!
//! ```text
//! Closed --open--> Editing --save--> Saved --> Closed
//!                     |  \--cancel--> Discarded --> Closed
//!                     \--reset: draft := default, stays Editing
//! ```
//!
//! Edits touch only the draft. The store, and therefore every render surface,
//! changes on `save` alone. `open` always copies the store's latest value, so a
//! reopened dialog never shows a stale or discarded draft.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::SettingsValue;
use crate::error::{DialogError, StoreError};
use crate::schema::{BackgroundSettings, DeviceClass, Section};
use crate::store::{GroupCell, SettingsStore};
use crate::style::{self, Preview, StyleBlock, Surface};
use crate::upload::{self, ImageVariant};

/// How an editing session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome<T> {
    /// The draft was written to the store.
    Saved(T),
    /// The draft was dropped.
    Discarded,
}

/// Draft editor for one settings group.
pub struct ManagerDialog<T> {
    cell: Arc<GroupCell<T>>,
    draft: Option<T>,
}

impl<T> fmt::Debug for ManagerDialog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerDialog")
            .field("cell", &self.cell)
            .field("open", &self.draft.is_some())
            .finish()
    }
}

impl<T: SettingsValue> ManagerDialog<T> {
    /// A closed dialog over `cell`.
    #[must_use]
    pub fn new(cell: Arc<GroupCell<T>>) -> Self {
        Self { cell, draft: None }
    }

    fn group(&self) -> String {
        self.cell.storage_key().to_owned()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Start editing with a copy of the group's current value.
    ///
    /// # Errors
    ///
    /// - [`DialogError::AlreadyOpen`] while a draft exists.
    /// - [`DialogError::Store`] wrapping [`StoreError::NotReady`] before hydration.
    pub fn open(&mut self) -> Result<&mut T, DialogError> {
        if self.draft.is_some() {
            return Err(DialogError::AlreadyOpen { group: self.group() });
        }
        let current = self.cell.current().ok_or(StoreError::NotReady)?;
        debug!(group = self.cell.storage_key(), "dialog opened");
        Ok(self.draft.insert(current))
    }

    /// The draft, if the dialog is open.
    #[must_use]
    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    /// # Errors
    ///
    /// [`DialogError::NotOpen`] while closed.
    pub fn draft_mut(&mut self) -> Result<&mut T, DialogError> {
        let group = self.group();
        self.draft.as_mut().ok_or(DialogError::NotOpen { group })
    }

    /// Apply `f` to the draft.
    ///
    /// # Errors
    ///
    /// [`DialogError::NotOpen`] while closed.
    pub fn edit<F>(&mut self, f: F) -> Result<(), DialogError>
    where
        F: FnOnce(&mut T),
    {
        f(self.draft_mut()?);
        Ok(())
    }

    /// Replace the draft with the group default. The store is untouched.
    ///
    /// # Errors
    ///
    /// [`DialogError::NotOpen`] while closed.
    pub fn reset(&mut self) -> Result<(), DialogError> {
        let default = self.cell.default_value();
        *self.draft_mut()? = default;
        Ok(())
    }

    /// Write the draft to the store and close.
    ///
    /// If the store rejects the write the dialog stays open with its draft.
    ///
    /// # Errors
    ///
    /// - [`DialogError::NotOpen`] while closed.
    /// - [`DialogError::Store`] if the update fails.
    pub async fn save(&mut self) -> Result<DialogOutcome<T>, DialogError> {
        let value = match &self.draft {
            Some(draft) => draft.clone(),
            None => return Err(DialogError::NotOpen { group: self.group() }),
        };
        if let Err(e) = self.cell.update(value.clone()).await {
            warn!(group = self.cell.storage_key(), error = %e, "dialog save failed, keeping draft");
            return Err(e.into());
        }
        self.draft = None;
        debug!(group = self.cell.storage_key(), "dialog saved");
        Ok(DialogOutcome::Saved(value))
    }

    /// Drop the draft and close. The store is untouched.
    ///
    /// # Errors
    ///
    /// [`DialogError::NotOpen`] while closed.
    pub fn cancel(&mut self) -> Result<DialogOutcome<T>, DialogError> {
        if self.draft.take().is_none() {
            return Err(DialogError::NotOpen { group: self.group() });
        }
        debug!(group = self.cell.storage_key(), "dialog discarded");
        Ok(DialogOutcome::Discarded)
    }
}

impl<T: SettingsValue + Preview> ManagerDialog<T> {
    /// Preview styles of the draft, drawn at dialog scale. Closed dialogs
    /// render the placeholder.
    #[must_use]
    pub fn preview(&self, device: DeviceClass) -> Vec<StyleBlock> {
        style::render(self.draft.as_ref(), device, Surface::Dialog)
    }
}

impl ManagerDialog<BackgroundSettings> {
    /// Use a fresh upload as the draft background and remember it in the
    /// section's custom backgrounds. Returns the chosen path.
    ///
    /// # Errors
    ///
    /// - [`DialogError::NotOpen`] while closed.
    /// - [`DialogError::NoOriginalVariant`] if `variants` lacks the original.
    /// - [`DialogError::Store`] if the custom background list cannot be saved.
    pub async fn apply_uploaded_image(
        &mut self,
        store: &SettingsStore,
        section: Section,
        variants: &[ImageVariant],
    ) -> Result<String, DialogError> {
        if self.draft.is_none() {
            return Err(DialogError::NotOpen { group: self.group() });
        }
        let path = upload::original_variant(variants)
            .map(|variant| variant.path.clone())
            .ok_or_else(|| DialogError::NoOriginalVariant { group: self.group() })?;

        store.add_custom_background(section, &path).await?;
        self.draft_mut()?.image.clone_from(&path);
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{LoanCardSettings, PaymentCardSettings, set_card_visible};
    use crate::upload::SizeTag;
    use lendfront_storage::{MemoryBackend, StorageBackend};

    async fn hydrated(backend: &MemoryBackend) -> SettingsStore {
        let store = SettingsStore::new(Arc::new(backend.clone()));
        store.hydrate().await;
        store
    }

    async fn storage_snapshot(backend: &MemoryBackend) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        for key in backend.list("").await.unwrap() {
            let value = backend.get(&key).await.unwrap();
            out.push((key, value));
        }
        out
    }

    #[tokio::test]
    async fn open_before_hydrate_is_rejected() {
        let store = SettingsStore::new(Arc::new(MemoryBackend::new()));
        let mut dialog = ManagerDialog::new(Arc::clone(store.user_block()));
        let err = dialog.open().unwrap_err();
        assert!(matches!(err, DialogError::Store(StoreError::NotReady)));
        assert!(!dialog.is_open());
    }

    #[tokio::test]
    async fn open_twice_is_rejected() {
        let store = hydrated(&MemoryBackend::new()).await;
        let mut dialog = ManagerDialog::new(Arc::clone(store.user_block()));
        dialog.open().unwrap();
        assert!(matches!(dialog.open(), Err(DialogError::AlreadyOpen { .. })));
    }

    #[tokio::test]
    async fn cancel_leaves_memory_and_storage_untouched() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;
        let mut card = PaymentCardSettings::group_default();
        card.opacity = 70;
        store.payment_card().update(card.clone()).await.unwrap();

        let before = storage_snapshot(&backend).await;
        let mut dialog = ManagerDialog::new(Arc::clone(store.payment_card()));
        dialog.open().unwrap();
        dialog.edit(|draft| {
            draft.opacity = 10;
            draft.visible = false;
            draft.position.mobile.x = 99;
        })
        .unwrap();

        // Edits never leak into the store.
        assert_eq!(store.payment_card().current().unwrap(), card);

        assert_eq!(dialog.cancel().unwrap(), DialogOutcome::Discarded);
        assert!(!dialog.is_open());
        assert_eq!(store.payment_card().current().unwrap(), card);
        assert_eq!(storage_snapshot(&backend).await, before);
    }

    #[tokio::test]
    async fn reset_then_save_persists_the_default() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;
        let mut cards = LoanCardSettings::group_default();
        set_card_visible(&mut cards, "mortgage-loan", false);
        store.loan_cards().update(cards).await.unwrap();

        let mut dialog = ManagerDialog::new(Arc::clone(store.loan_cards()));
        dialog.open().unwrap();
        dialog.reset().unwrap();
        let outcome = dialog.save().await.unwrap();
        assert_eq!(outcome, DialogOutcome::Saved(LoanCardSettings::group_default()));

        let fresh = hydrated(&backend).await;
        assert_eq!(fresh.loan_cards().current().unwrap(), LoanCardSettings::group_default());
    }

    #[tokio::test]
    async fn reopen_starts_from_latest_value() {
        let store = hydrated(&MemoryBackend::new()).await;
        let mut dialog = ManagerDialog::new(Arc::clone(store.payment_card()));

        dialog.open().unwrap();
        dialog.edit(|draft| draft.opacity = 5).unwrap();
        dialog.cancel().unwrap();

        let mut elsewhere = store.payment_card().current().unwrap();
        elsewhere.opacity = 42;
        store.payment_card().update(elsewhere).await.unwrap();

        let draft = dialog.open().unwrap();
        assert_eq!(draft.opacity, 42);
    }

    #[tokio::test]
    async fn closed_dialog_rejects_draft_operations() {
        let store = hydrated(&MemoryBackend::new()).await;
        let mut dialog = ManagerDialog::new(Arc::clone(store.hero_text()));
        assert!(matches!(dialog.reset(), Err(DialogError::NotOpen { .. })));
        assert!(matches!(dialog.cancel(), Err(DialogError::NotOpen { .. })));
        assert!(matches!(dialog.save().await, Err(DialogError::NotOpen { .. })));
        assert_eq!(dialog.preview(DeviceClass::Desktop), vec![style::placeholder()]);
    }

    #[tokio::test]
    async fn preview_follows_the_draft() {
        let store = hydrated(&MemoryBackend::new()).await;
        let mut dialog = ManagerDialog::new(Arc::clone(store.user_block()));
        dialog.open().unwrap();
        dialog.edit(|draft| draft.position.desktop.x = 12).unwrap();

        let blocks = dialog.preview(DeviceClass::Desktop);
        assert_eq!(blocks[0].get("left"), Some("12%"));
        assert_eq!(blocks[0].get("transform"), Some("translate(-50%, -50%) scale(0.6)"));
    }

    #[tokio::test]
    async fn uploaded_image_becomes_draft_background() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;
        let mut dialog = ManagerDialog::new(Arc::clone(store.background(Section::Service)));
        dialog.open().unwrap();

        let variants = vec![
            ImageVariant {
                size: SizeTag::Mobile,
                path: "/images/service/bg_1_mobile.webp".to_owned(),
                width: 768,
                height: 432,
            },
            ImageVariant {
                size: SizeTag::Original,
                path: "/images/service/bg_1.webp".to_owned(),
                width: 2400,
                height: 1350,
            },
        ];
        let path = dialog
            .apply_uploaded_image(&store, Section::Service, &variants)
            .await
            .unwrap();
        assert_eq!(path, "/images/service/bg_1.webp");
        assert_eq!(dialog.draft().unwrap().image, path);
        assert_eq!(
            store.custom_backgrounds(Section::Service).current().unwrap(),
            vec![path.clone()]
        );
        // The background group itself is unchanged until save.
        assert_eq!(store.service_background().current().unwrap().image, "");

        assert!(matches!(
            dialog.apply_uploaded_image(&store, Section::Service, &variants[..1]).await,
            Err(DialogError::NoOriginalVariant { .. })
        ));
    }
}
