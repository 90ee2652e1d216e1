//! Settings group keys.
//!
//! A [`GroupKey`] binds one settings type to its storage key, its hard-coded
//! default record and the way stored values fall back to that default. The
//! same record type can back several groups (the three section backgrounds
//! share [`BackgroundSettings`] but not their defaults), so the key, not the
//! type, identifies a group.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::schema::{
    BackgroundSettings, CarouselImage, HeroImageSettings, HeroTextSettings, LoanCardSettings,
    PaymentCard2Settings, PaymentCardSettings, Section, UserBlockSettings,
};

/// How a stored value is combined with the group default at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Stored object is deep-merged onto the default object: absent or `null`
    /// fields take the default, nested objects merge recursively.
    Record,
    /// Stored array replaces the default array. Object elements are merged
    /// onto the key's element template, when it has one, the same way a
    /// record is merged onto its default.
    List,
}

/// Typed handle for one independently persisted settings group.
pub struct GroupKey<T> {
    storage_key: &'static str,
    default: fn() -> T,
    merge: MergeStrategy,
    element: Option<fn() -> Value>,
}

impl<T> GroupKey<T> {
    #[must_use]
    pub const fn new(storage_key: &'static str, default: fn() -> T, merge: MergeStrategy) -> Self {
        Self {
            storage_key,
            default,
            merge,
            element: None,
        }
    }

    /// A list group whose object elements fall back per field onto `element`.
    #[must_use]
    pub const fn list_of(storage_key: &'static str, default: fn() -> T, element: fn() -> Value) -> Self {
        Self {
            storage_key,
            default,
            merge: MergeStrategy::List,
            element: Some(element),
        }
    }

    /// The local-storage key this group persists under.
    #[must_use]
    pub const fn storage_key(&self) -> &'static str {
        self.storage_key
    }

    /// A fresh copy of the group's hard-coded default record.
    #[must_use]
    pub fn default_value(&self) -> T {
        (self.default)()
    }

    #[must_use]
    pub const fn merge(&self) -> MergeStrategy {
        self.merge
    }

    /// JSON of a default list element, for list groups that have one.
    #[must_use]
    pub fn element_template(&self) -> Option<Value> {
        self.element.map(|template| template())
    }
}

impl<T> Clone for GroupKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for GroupKey<T> {}

impl<T> fmt::Debug for GroupKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupKey")
            .field("storage_key", &self.storage_key)
            .field("merge", &self.merge)
            .field("element_template", &self.element.is_some())
            .finish_non_exhaustive()
    }
}

fn no_images() -> Vec<CarouselImage> {
    Vec::new()
}

fn no_paths() -> Vec<String> {
    Vec::new()
}

fn loan_card_template() -> Value {
    serde_json::to_value(LoanCardSettings::default()).unwrap_or_default()
}

pub const HERO_BACKGROUND: GroupKey<BackgroundSettings> = GroupKey::new(
    "hero-background-settings",
    BackgroundSettings::hero_default,
    MergeStrategy::Record,
);

pub const LOAN_BACKGROUND: GroupKey<BackgroundSettings> = GroupKey::new(
    "loan-background-settings",
    BackgroundSettings::loan_default,
    MergeStrategy::Record,
);

pub const SERVICE_BACKGROUND: GroupKey<BackgroundSettings> = GroupKey::new(
    "service-background-settings",
    BackgroundSettings::service_default,
    MergeStrategy::Record,
);

pub const HERO_IMAGE: GroupKey<HeroImageSettings> = GroupKey::new(
    "hero-image-settings",
    HeroImageSettings::group_default,
    MergeStrategy::Record,
);

pub const HERO_TEXT: GroupKey<HeroTextSettings> = GroupKey::new(
    "hero-text-settings",
    HeroTextSettings::group_default,
    MergeStrategy::Record,
);

pub const PAYMENT_CARD: GroupKey<PaymentCardSettings> = GroupKey::new(
    "payment-card-settings",
    PaymentCardSettings::group_default,
    MergeStrategy::Record,
);

pub const PAYMENT_CARD_2: GroupKey<PaymentCard2Settings> = GroupKey::new(
    "payment-card-2-settings",
    PaymentCard2Settings::group_default,
    MergeStrategy::Record,
);

pub const USER_BLOCK: GroupKey<UserBlockSettings> = GroupKey::new(
    "user-block-settings",
    UserBlockSettings::group_default,
    MergeStrategy::Record,
);

pub const LOAN_CARDS: GroupKey<Vec<LoanCardSettings>> = GroupKey::list_of(
    "loan-card-settings",
    LoanCardSettings::group_default,
    loan_card_template,
);

pub const CAROUSEL: GroupKey<Vec<CarouselImage>> =
    GroupKey::new("carousel-images", no_images, MergeStrategy::List);

pub const HERO_CUSTOM_BACKGROUNDS: GroupKey<Vec<String>> =
    GroupKey::new("hero-custom-backgrounds", no_paths, MergeStrategy::List);

pub const LOAN_CUSTOM_BACKGROUNDS: GroupKey<Vec<String>> =
    GroupKey::new("loan-custom-backgrounds", no_paths, MergeStrategy::List);

pub const SERVICE_CUSTOM_BACKGROUNDS: GroupKey<Vec<String>> =
    GroupKey::new("service-custom-backgrounds", no_paths, MergeStrategy::List);

/// The custom-background list key for a section.
#[must_use]
pub fn custom_backgrounds_key(section: Section) -> GroupKey<Vec<String>> {
    match section {
        Section::Hero => HERO_CUSTOM_BACKGROUNDS,
        Section::Loan => LOAN_CUSTOM_BACKGROUNDS,
        Section::Service => SERVICE_CUSTOM_BACKGROUNDS,
    }
}

/// Name-addressable settings groups, as used in server paths and CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    HeroBackground,
    LoanBackground,
    ServiceBackground,
    HeroImage,
    HeroText,
    PaymentCard,
    PaymentCard2,
    UserBlock,
    LoanCards,
    Carousel,
}

impl GroupId {
    /// Every group, in hydration order.
    pub const ALL: [Self; 10] = [
        Self::HeroBackground,
        Self::LoanBackground,
        Self::ServiceBackground,
        Self::HeroImage,
        Self::HeroText,
        Self::PaymentCard,
        Self::PaymentCard2,
        Self::UserBlock,
        Self::LoanCards,
        Self::Carousel,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HeroBackground => "hero-background",
            Self::LoanBackground => "loan-background",
            Self::ServiceBackground => "service-background",
            Self::HeroImage => "hero-image",
            Self::HeroText => "hero-text",
            Self::PaymentCard => "payment-card",
            Self::PaymentCard2 => "payment-card-2",
            Self::UserBlock => "user-block",
            Self::LoanCards => "loan-cards",
            Self::Carousel => "carousel",
        }
    }

    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::HeroBackground => HERO_BACKGROUND.storage_key(),
            Self::LoanBackground => LOAN_BACKGROUND.storage_key(),
            Self::ServiceBackground => SERVICE_BACKGROUND.storage_key(),
            Self::HeroImage => HERO_IMAGE.storage_key(),
            Self::HeroText => HERO_TEXT.storage_key(),
            Self::PaymentCard => PAYMENT_CARD.storage_key(),
            Self::PaymentCard2 => PAYMENT_CARD_2.storage_key(),
            Self::UserBlock => USER_BLOCK.storage_key(),
            Self::LoanCards => LOAN_CARDS.storage_key(),
            Self::Carousel => CAROUSEL.storage_key(),
        }
    }

    /// The section whose background this group configures, if any.
    #[must_use]
    pub fn background_section(self) -> Option<Section> {
        match self {
            Self::HeroBackground => Some(Section::Hero),
            Self::LoanBackground => Some(Section::Loan),
            Self::ServiceBackground => Some(Section::Service),
            _ => None,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| format!("unknown settings group '{s}'"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn group_names_round_trip() {
        for id in GroupId::ALL {
            assert_eq!(id.name().parse::<GroupId>().unwrap(), id);
        }
        assert!("footer".parse::<GroupId>().is_err());
    }

    #[test]
    fn storage_keys_are_unique() {
        let mut keys: Vec<&str> = GroupId::ALL.iter().map(|id| id.storage_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), GroupId::ALL.len());
    }

    #[test]
    fn shared_type_distinct_defaults() {
        let hero = HERO_BACKGROUND.default_value();
        let loan = LOAN_BACKGROUND.default_value();
        assert_ne!(hero, loan);
        assert_eq!(hero.overlay.opacity, 68);
        assert_eq!(loan.overlay.color, "#000000");
    }

    #[test]
    fn only_loan_cards_carry_an_element_template() {
        let template = LOAN_CARDS.element_template().unwrap();
        assert_eq!(template["background"]["opacity"], 100);
        assert_eq!(template["textColor"]["features"], "#374151");
        assert!(CAROUSEL.element_template().is_none());
        assert!(HERO_CUSTOM_BACKGROUNDS.element_template().is_none());
    }
}
