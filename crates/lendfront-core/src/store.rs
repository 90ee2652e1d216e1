//! Settings store.
//!
//! One [`GroupCell`] per settings group holds the current value in memory,
//! broadcasts replacements through a `watch` channel and writes every update
//! through the [`PersistenceAdapter`]. Cells stay unreadable until
//! [`SettingsStore::hydrate`] has loaded every group, so a render surface
//! never shows defaults that are about to be replaced by stored values.
//!
//! Stores built over the same storage do not notify each other. A second
//! store sees another store's writes only after its own `hydrate`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lendfront_storage::StorageBackend;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::adapter::{DefaultReason, PersistenceAdapter, SettingsValue};
use crate::error::StoreError;
use crate::group::{self, GroupId, GroupKey};
use crate::schema::{
    BackgroundSettings, CarouselImage, DeviceClass, HeroImageSettings, HeroTextSettings,
    LoanCardSettings, PaymentCard2Settings, PaymentCardSettings, Section, UserBlockSettings,
};
use crate::style::{self, Preview, StyleBlock, Surface};
use crate::upload::{ImageVariant, SizeTag};

/// Copies part of a saved value to a second, plain-string key.
type Mirror<T> = (&'static str, fn(&T) -> String);

/// Live value of one settings group.
pub struct GroupCell<T> {
    key: GroupKey<T>,
    adapter: PersistenceAdapter,
    ready: watch::Receiver<bool>,
    value: watch::Sender<T>,
    /// Serializes updates in call order.
    write_lock: Mutex<()>,
    mirror: Option<Mirror<T>>,
}

impl<T: SettingsValue> GroupCell<T> {
    fn new(key: GroupKey<T>, adapter: PersistenceAdapter, ready: watch::Receiver<bool>) -> Self {
        let (value, _) = watch::channel(key.default_value());
        Self {
            key,
            adapter,
            ready,
            value,
            write_lock: Mutex::new(()),
            mirror: None,
        }
    }

    fn with_mirror(mut self, key: &'static str, project: fn(&T) -> String) -> Self {
        self.mirror = Some((key, project));
        self
    }

    /// The group's storage key.
    #[must_use]
    pub fn storage_key(&self) -> &'static str {
        self.key.storage_key()
    }

    /// Whether the owning store has finished hydrating.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// The current value, or `None` while the store is still hydrating.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        if self.is_ready() {
            Some(self.value.borrow().clone())
        } else {
            None
        }
    }

    /// The group's hard-coded default record.
    #[must_use]
    pub fn default_value(&self) -> T {
        self.key.default_value()
    }

    /// Receive every replacement of the in-memory value. Drop the receiver to
    /// unsubscribe.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    /// Replace the group's value and persist it.
    ///
    /// The in-memory value is replaced and broadcast before the write. If the
    /// write fails the error is logged and returned, and memory keeps the new
    /// value; storage then holds the previous one until the next update.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotReady`] before hydration.
    /// - [`StoreError::Encode`] / [`StoreError::Storage`] if persisting fails.
    pub async fn update(&self, value: T) -> Result<(), StoreError> {
        if !self.is_ready() {
            return Err(StoreError::NotReady);
        }
        let _guard = self.write_lock.lock().await;
        self.replace_and_save(value).await
    }

    /// Read-modify-write under the update lock. Returns the new value.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub async fn modify<F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut T) + Send,
    {
        if !self.is_ready() {
            return Err(StoreError::NotReady);
        }
        let _guard = self.write_lock.lock().await;
        let mut next = self.value.borrow().clone();
        f(&mut next);
        self.replace_and_save(next.clone()).await?;
        Ok(next)
    }

    async fn replace_and_save(&self, value: T) -> Result<(), StoreError> {
        let storage_key = self.key.storage_key();
        self.value.send_replace(value.clone());

        if let Err(e) = self.adapter.save(&self.key, &value).await {
            warn!(key = storage_key, error = %e, "failed to persist settings update");
            return Err(e);
        }

        if let Some((mirror_key, project)) = self.mirror {
            let mirrored = project(&value);
            if let Err(e) = self.adapter.storage().put(mirror_key, &mirrored).await {
                warn!(key = mirror_key, error = %e, "failed to write mirrored settings key");
            }
        }

        debug!(key = storage_key, "settings updated");
        Ok(())
    }

    async fn hydrate(&self) -> Origin {
        let (value, origin) = match self.adapter.load(&self.key).await {
            Ok(value) => (value, Origin::Stored),
            Err(defaulted) => (defaulted.value, Origin::Defaulted(defaulted.reason)),
        };
        self.value.send_replace(value);
        origin
    }
}

impl<T> fmt::Debug for GroupCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupCell")
            .field("key", &self.key)
            .field("ready", &*self.ready.borrow())
            .finish_non_exhaustive()
    }
}

/// Where a group's value came from during hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Stored,
    Defaulted(DefaultReason),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => f.write_str("stored"),
            Self::Defaulted(reason) => write!(f, "default ({reason})"),
        }
    }
}

/// Per-group outcome of [`SettingsStore::hydrate`].
#[derive(Debug, Clone, Default)]
pub struct HydrationReport {
    pub entries: Vec<(&'static str, Origin)>,
}

impl HydrationReport {
    /// Origin of the group stored under `storage_key`.
    #[must_use]
    pub fn origin(&self, storage_key: &str) -> Option<&Origin> {
        self.entries
            .iter()
            .find(|(key, _)| *key == storage_key)
            .map(|(_, origin)| origin)
    }

    /// Groups that fell back because their stored value was corrupt or unreadable.
    #[must_use]
    pub fn recovered(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, origin)| {
                matches!(
                    origin,
                    Origin::Defaulted(DefaultReason::Corrupt(_) | DefaultReason::Unreadable(_))
                )
            })
            .count()
    }
}

/// Name-addressed, JSON-typed view of a [`GroupCell`].
#[async_trait::async_trait]
pub trait DynGroup: Send + Sync {
    /// Current value as JSON.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotReady`] before hydration, [`StoreError::Encode`] if
    /// serialization fails.
    fn snapshot_json(&self) -> Result<Value, StoreError>;

    /// The group default as JSON.
    ///
    /// # Errors
    ///
    /// [`StoreError::Encode`] if serialization fails.
    fn default_json(&self) -> Result<Value, StoreError>;

    /// Decode `value` strictly into the group's type and replace the group.
    /// Returns the stored value re-serialized.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidValue`] if `value` does not have the group's shape,
    /// otherwise as [`GroupCell::update`].
    async fn replace_json(&self, value: Value) -> Result<Value, StoreError>;

    /// Derived style blocks for the current value.
    fn preview(&self, device: DeviceClass, surface: Surface) -> Vec<StyleBlock>;
}

#[async_trait::async_trait]
impl<T: SettingsValue + Preview> DynGroup for GroupCell<T> {
    fn snapshot_json(&self) -> Result<Value, StoreError> {
        let current = self.current().ok_or(StoreError::NotReady)?;
        to_json(self.storage_key(), &current)
    }

    fn default_json(&self) -> Result<Value, StoreError> {
        to_json(self.storage_key(), &self.default_value())
    }

    async fn replace_json(&self, value: Value) -> Result<Value, StoreError> {
        let decoded: T = serde_json::from_value(value).map_err(|e| StoreError::InvalidValue {
            group: self.storage_key().to_owned(),
            reason: e.to_string(),
        })?;
        self.update(decoded.clone()).await?;
        to_json(self.storage_key(), &decoded)
    }

    fn preview(&self, device: DeviceClass, surface: Surface) -> Vec<StyleBlock> {
        style::render(self.current().as_ref(), device, surface)
    }
}

fn to_json<T: SettingsValue>(key: &str, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Encode {
        key: key.to_owned(),
        reason: e.to_string(),
    })
}

fn background_image(settings: &BackgroundSettings) -> String {
    settings.image.clone()
}

/// In-memory settings for every group, backed by one storage profile.
pub struct SettingsStore {
    adapter: PersistenceAdapter,
    ready: watch::Sender<bool>,
    hero_background: Arc<GroupCell<BackgroundSettings>>,
    loan_background: Arc<GroupCell<BackgroundSettings>>,
    service_background: Arc<GroupCell<BackgroundSettings>>,
    hero_image: Arc<GroupCell<HeroImageSettings>>,
    hero_text: Arc<GroupCell<HeroTextSettings>>,
    payment_card: Arc<GroupCell<PaymentCardSettings>>,
    payment_card_2: Arc<GroupCell<PaymentCard2Settings>>,
    user_block: Arc<GroupCell<UserBlockSettings>>,
    loan_cards: Arc<GroupCell<Vec<LoanCardSettings>>>,
    carousel: Arc<GroupCell<Vec<CarouselImage>>>,
    custom_backgrounds: [Arc<GroupCell<Vec<String>>>; 3],
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("ready", &*self.ready.borrow())
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Build a store over `storage`. Every group holds its default and the
    /// store is not ready until [`hydrate`](Self::hydrate) completes.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        let adapter = PersistenceAdapter::new(storage);
        let (ready, ready_rx) = watch::channel(false);

        let background = |key: GroupKey<BackgroundSettings>, section: Section| {
            Arc::new(
                GroupCell::new(key, adapter.clone(), ready_rx.clone())
                    .with_mirror(legacy_image_key(section), background_image),
            )
        };
        let custom = |section: Section| {
            Arc::new(GroupCell::new(
                group::custom_backgrounds_key(section),
                adapter.clone(),
                ready_rx.clone(),
            ))
        };

        Self {
            hero_background: background(group::HERO_BACKGROUND, Section::Hero),
            loan_background: background(group::LOAN_BACKGROUND, Section::Loan),
            service_background: background(group::SERVICE_BACKGROUND, Section::Service),
            hero_image: Arc::new(GroupCell::new(group::HERO_IMAGE, adapter.clone(), ready_rx.clone())),
            hero_text: Arc::new(GroupCell::new(group::HERO_TEXT, adapter.clone(), ready_rx.clone())),
            payment_card: Arc::new(GroupCell::new(group::PAYMENT_CARD, adapter.clone(), ready_rx.clone())),
            payment_card_2: Arc::new(GroupCell::new(
                group::PAYMENT_CARD_2,
                adapter.clone(),
                ready_rx.clone(),
            )),
            user_block: Arc::new(GroupCell::new(group::USER_BLOCK, adapter.clone(), ready_rx.clone())),
            loan_cards: Arc::new(GroupCell::new(group::LOAN_CARDS, adapter.clone(), ready_rx.clone())),
            carousel: Arc::new(GroupCell::new(group::CAROUSEL, adapter.clone(), ready_rx.clone())),
            custom_backgrounds: [
                custom(Section::Hero),
                custom(Section::Loan),
                custom(Section::Service),
            ],
            adapter,
            ready,
        }
    }

    /// Load every group from storage, then mark the store ready.
    ///
    /// Groups that are absent or fail to decode take their default; the
    /// report records which. Calling this again re-reads storage.
    pub async fn hydrate(&self) -> HydrationReport {
        let mut report = HydrationReport::default();

        report.entries.push((self.hero_background.storage_key(), self.hero_background.hydrate().await));
        report.entries.push((self.loan_background.storage_key(), self.loan_background.hydrate().await));
        report.entries.push((self.service_background.storage_key(), self.service_background.hydrate().await));
        report.entries.push((self.hero_image.storage_key(), self.hero_image.hydrate().await));
        report.entries.push((self.hero_text.storage_key(), self.hero_text.hydrate().await));
        report.entries.push((self.payment_card.storage_key(), self.payment_card.hydrate().await));
        report.entries.push((self.payment_card_2.storage_key(), self.payment_card_2.hydrate().await));
        report.entries.push((self.user_block.storage_key(), self.user_block.hydrate().await));
        report.entries.push((self.loan_cards.storage_key(), self.loan_cards.hydrate().await));
        report.entries.push((self.carousel.storage_key(), self.carousel.hydrate().await));
        for cell in &self.custom_backgrounds {
            report.entries.push((cell.storage_key(), cell.hydrate().await));
        }

        self.ready.send_replace(true);
        info!(
            groups = report.entries.len(),
            recovered = report.recovered(),
            "settings store hydrated"
        );
        report
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolve once hydration has completed.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// The adapter this store persists through.
    #[must_use]
    pub fn adapter(&self) -> &PersistenceAdapter {
        &self.adapter
    }

    #[must_use]
    pub fn hero_background(&self) -> &Arc<GroupCell<BackgroundSettings>> {
        &self.hero_background
    }

    #[must_use]
    pub fn loan_background(&self) -> &Arc<GroupCell<BackgroundSettings>> {
        &self.loan_background
    }

    #[must_use]
    pub fn service_background(&self) -> &Arc<GroupCell<BackgroundSettings>> {
        &self.service_background
    }

    /// The background group of a section.
    #[must_use]
    pub fn background(&self, section: Section) -> &Arc<GroupCell<BackgroundSettings>> {
        match section {
            Section::Hero => &self.hero_background,
            Section::Loan => &self.loan_background,
            Section::Service => &self.service_background,
        }
    }

    #[must_use]
    pub fn hero_image(&self) -> &Arc<GroupCell<HeroImageSettings>> {
        &self.hero_image
    }

    #[must_use]
    pub fn hero_text(&self) -> &Arc<GroupCell<HeroTextSettings>> {
        &self.hero_text
    }

    #[must_use]
    pub fn payment_card(&self) -> &Arc<GroupCell<PaymentCardSettings>> {
        &self.payment_card
    }

    #[must_use]
    pub fn payment_card_2(&self) -> &Arc<GroupCell<PaymentCard2Settings>> {
        &self.payment_card_2
    }

    #[must_use]
    pub fn user_block(&self) -> &Arc<GroupCell<UserBlockSettings>> {
        &self.user_block
    }

    #[must_use]
    pub fn loan_cards(&self) -> &Arc<GroupCell<Vec<LoanCardSettings>>> {
        &self.loan_cards
    }

    #[must_use]
    pub fn carousel(&self) -> &Arc<GroupCell<Vec<CarouselImage>>> {
        &self.carousel
    }

    /// Previously uploaded background images of a section.
    #[must_use]
    pub fn custom_backgrounds(&self, section: Section) -> &Arc<GroupCell<Vec<String>>> {
        match section {
            Section::Hero => &self.custom_backgrounds[0],
            Section::Loan => &self.custom_backgrounds[1],
            Section::Service => &self.custom_backgrounds[2],
        }
    }

    /// Append `path` to a section's custom backgrounds unless already listed.
    ///
    /// # Errors
    ///
    /// As [`GroupCell::update`].
    pub async fn add_custom_background(&self, section: Section, path: &str) -> Result<Vec<String>, StoreError> {
        self.custom_backgrounds(section)
            .modify(|paths| {
                if !paths.iter().any(|p| p == path) {
                    paths.push(path.to_owned());
                }
            })
            .await
    }

    /// Remove every occurrence of `path` from a section's custom backgrounds.
    ///
    /// # Errors
    ///
    /// As [`GroupCell::update`].
    pub async fn remove_custom_background(
        &self,
        section: Section,
        path: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.custom_backgrounds(section)
            .modify(|paths| paths.retain(|p| p != path))
            .await
    }

    /// Append the original variants of an upload to the carousel as new
    /// slides. Returns the slides added.
    ///
    /// # Errors
    ///
    /// As [`GroupCell::update`].
    pub async fn add_carousel_images(
        &self,
        variants: &[ImageVariant],
        received_at: DateTime<Utc>,
    ) -> Result<Vec<CarouselImage>, StoreError> {
        let stamp = received_at.timestamp_millis();
        let originals: Vec<&ImageVariant> = variants
            .iter()
            .filter(|variant| variant.size == SizeTag::Original)
            .collect();
        let mut added = Vec::with_capacity(originals.len());

        self.carousel
            .modify(|slides| {
                let base = slides.len();
                for (index, variant) in originals.iter().enumerate() {
                    let n = base + index + 1;
                    let slide = CarouselImage {
                        id: format!("uploaded-{stamp}-{index}"),
                        src: variant.path.clone(),
                        alt: format!("캐러셀 이미지 {n}"),
                        title: Some(format!("이미지 {n}")),
                        description: Some("새로 업로드된 이미지입니다.".to_owned()),
                    };
                    added.push(slide.clone());
                    slides.push(slide);
                }
            })
            .await?;
        Ok(added)
    }

    /// Remove the carousel slide with `id`. Returns the remaining slides.
    ///
    /// # Errors
    ///
    /// As [`GroupCell::update`].
    pub async fn remove_carousel_image(&self, id: &str) -> Result<Vec<CarouselImage>, StoreError> {
        self.carousel.modify(|slides| slides.retain(|slide| slide.id != id)).await
    }

    /// Name-addressed access to a group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> &dyn DynGroup {
        match id {
            GroupId::HeroBackground => self.hero_background.as_ref(),
            GroupId::LoanBackground => self.loan_background.as_ref(),
            GroupId::ServiceBackground => self.service_background.as_ref(),
            GroupId::HeroImage => self.hero_image.as_ref(),
            GroupId::HeroText => self.hero_text.as_ref(),
            GroupId::PaymentCard => self.payment_card.as_ref(),
            GroupId::PaymentCard2 => self.payment_card_2.as_ref(),
            GroupId::UserBlock => self.user_block.as_ref(),
            GroupId::LoanCards => self.loan_cards.as_ref(),
            GroupId::Carousel => self.carousel.as_ref(),
        }
    }

    /// # Errors
    ///
    /// See [`DynGroup::snapshot_json`].
    pub fn snapshot_json(&self, id: GroupId) -> Result<Value, StoreError> {
        self.group(id).snapshot_json()
    }

    /// # Errors
    ///
    /// See [`DynGroup::default_json`].
    pub fn default_json(&self, id: GroupId) -> Result<Value, StoreError> {
        self.group(id).default_json()
    }

    /// # Errors
    ///
    /// See [`DynGroup::replace_json`].
    pub async fn replace_json(&self, id: GroupId, value: Value) -> Result<Value, StoreError> {
        self.group(id).replace_json(value).await
    }

    #[must_use]
    pub fn preview(&self, id: GroupId, device: DeviceClass, surface: Surface) -> Vec<StyleBlock> {
        self.group(id).preview(device, surface)
    }
}

/// The plain image-path key the site also writes for each section background.
#[must_use]
pub fn legacy_image_key(section: Section) -> &'static str {
    match section {
        Section::Hero => "hero-section-bg",
        Section::Loan => "loan-section-bg",
        Section::Service => "service-section-bg",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{CardSize, TextAlignment};
    use lendfront_storage::MemoryBackend;

    async fn hydrated(backend: &MemoryBackend) -> SettingsStore {
        let store = SettingsStore::new(Arc::new(backend.clone()));
        store.hydrate().await;
        store
    }

    #[tokio::test]
    async fn not_ready_before_hydrate() {
        let store = SettingsStore::new(Arc::new(MemoryBackend::new()));
        assert!(!store.is_ready());
        assert!(store.hero_text().current().is_none());

        let err = store
            .hero_text()
            .update(HeroTextSettings::group_default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotReady));
        assert!(matches!(
            store.snapshot_json(GroupId::HeroText),
            Err(StoreError::NotReady)
        ));
    }

    #[tokio::test]
    async fn hydrate_reports_origins() {
        let backend = MemoryBackend::new();
        backend.put("user-block-settings", "{oops").await.unwrap();
        backend
            .put("payment-card-settings", &serde_json::to_string(&PaymentCardSettings::group_default()).unwrap())
            .await
            .unwrap();

        let store = SettingsStore::new(Arc::new(backend.clone()));
        let report = store.hydrate().await;

        assert!(store.is_ready());
        assert_eq!(report.entries.len(), 13);
        assert_eq!(report.origin("payment-card-settings"), Some(&Origin::Stored));
        assert_eq!(
            report.origin("hero-text-settings"),
            Some(&Origin::Defaulted(DefaultReason::Absent))
        );
        assert!(matches!(
            report.origin("user-block-settings"),
            Some(Origin::Defaulted(DefaultReason::Corrupt(_)))
        ));
        assert_eq!(report.recovered(), 1);
        assert_eq!(
            store.user_block().current().unwrap(),
            UserBlockSettings::group_default()
        );
    }

    #[tokio::test]
    async fn update_persists_for_a_fresh_store() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;

        let mut card = PaymentCard2Settings::group_default();
        card.title = "심사 없이".to_owned();
        card.size = CardSize::Large;
        store.payment_card_2().update(card.clone()).await.unwrap();

        let fresh = hydrated(&backend).await;
        assert_eq!(fresh.payment_card_2().current().unwrap(), card);
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let store = hydrated(&MemoryBackend::new()).await;
        let mut rx = store.hero_text().subscribe();

        let mut text = HeroTextSettings::group_default();
        text.alignment = TextAlignment::Right;
        store.hero_text().update(text.clone()).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), text);
    }

    #[tokio::test]
    async fn stores_do_not_notify_each_other() {
        let backend = MemoryBackend::new();
        let first = hydrated(&backend).await;
        let second = hydrated(&backend).await;

        let mut cards = first.loan_cards().current().unwrap();
        cards.truncate(2);
        first.loan_cards().update(cards.clone()).await.unwrap();

        assert_eq!(second.loan_cards().current().unwrap().len(), 4);
        second.hydrate().await;
        assert_eq!(second.loan_cards().current().unwrap(), cards);
    }

    #[tokio::test]
    async fn background_update_mirrors_image_path() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;

        let mut settings = store.loan_background().current().unwrap();
        settings.image = "/images/loan/new.webp".to_owned();
        store.background(Section::Loan).update(settings).await.unwrap();

        assert_eq!(
            backend.get("loan-section-bg").await.unwrap().as_deref(),
            Some("/images/loan/new.webp")
        );
    }

    #[tokio::test]
    async fn custom_backgrounds_add_and_remove() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;

        store.add_custom_background(Section::Hero, "/images/hero/a.webp").await.unwrap();
        store.add_custom_background(Section::Hero, "/images/hero/b.webp").await.unwrap();
        let paths = store.add_custom_background(Section::Hero, "/images/hero/a.webp").await.unwrap();
        assert_eq!(paths, vec!["/images/hero/a.webp", "/images/hero/b.webp"]);

        let paths = store
            .remove_custom_background(Section::Hero, "/images/hero/a.webp")
            .await
            .unwrap();
        assert_eq!(paths, vec!["/images/hero/b.webp"]);
        assert_eq!(
            backend.get("hero-custom-backgrounds").await.unwrap().as_deref(),
            Some(r#"["/images/hero/b.webp"]"#)
        );
        assert!(store.custom_backgrounds(Section::Loan).current().unwrap().is_empty());
    }

    #[tokio::test]
    async fn carousel_uploads_append_slides() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;
        let at = chrono::TimeZone::timestamp_millis_opt(&Utc, 1_700_000_000_000).unwrap();
        let variants = vec![
            ImageVariant {
                size: SizeTag::Original,
                path: "/images/carousel/a_1.webp".to_owned(),
                width: 1200,
                height: 800,
            },
            ImageVariant {
                size: SizeTag::Mobile,
                path: "/images/carousel/a_1_mobile.webp".to_owned(),
                width: 768,
                height: 512,
            },
        ];

        let added = store.add_carousel_images(&variants, at).await.unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].id, "uploaded-1700000000000-0");
        assert_eq!(added[0].alt, "캐러셀 이미지 1");

        let remaining = store.remove_carousel_image("uploaded-1700000000000-0").await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(backend.get("carousel-images").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn replace_json_rejects_wrong_shape() {
        let backend = MemoryBackend::new();
        let store = hydrated(&backend).await;

        let err = store
            .replace_json(GroupId::HeroImage, serde_json::json!({"image": 3}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { .. }));
        assert!(!backend.exists("hero-image-settings").await.unwrap());

        let mut value = store.default_json(GroupId::HeroImage).unwrap();
        value["opacity"] = serde_json::json!(40);
        let stored = store.replace_json(GroupId::HeroImage, value).await.unwrap();
        assert_eq!(stored["opacity"], 40);
        assert_eq!(store.hero_image().current().unwrap().opacity, 40);
    }

    #[tokio::test]
    async fn wait_ready_resolves_after_hydrate() {
        let store = Arc::new(SettingsStore::new(Arc::new(MemoryBackend::new())));
        let waiter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.wait_ready().await })
        };
        store.hydrate().await;
        waiter.await.unwrap();
        assert!(store.is_ready());
    }
}
