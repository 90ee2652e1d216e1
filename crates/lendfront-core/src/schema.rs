//! Settings schema: the fixed-shape records that describe each visual region.
//!
//! Field names serialize in camelCase and enum values in the site's string
//! forms (`"top-left"`, `"to-br"`, ...), so stored records keep the JSON shape
//! the landing page reads. Percentages are plain integers: the editing UI keeps
//! them within 0–100, nothing here enforces it.
//!
//! Each record type has the generic `Default` used as an element template; the
//! per-group defaults (which differ between, say, the hero and loan
//! backgrounds) live next to the types as `*_default()` functions and are
//! bound to storage keys in [`crate::group`].

use serde::{Deserialize, Serialize};

/// Integer percentage, 0–100 by UI convention.
pub type Percent = i32;

// ── Shared value types ───────────────────────────────────────────────

/// Device class used to pick a responsive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    /// Viewports narrower than this many pixels render as mobile.
    pub const MOBILE_BREAKPOINT_PX: u32 = 768;

    /// Classify a viewport width.
    #[must_use]
    pub fn from_viewport_width(width_px: u32) -> Self {
        if width_px < Self::MOBILE_BREAKPOINT_PX {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

impl std::str::FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("unknown device class '{other}' (expected desktop or mobile)")),
        }
    }
}

/// A value with distinct desktop and mobile entries. Both are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Responsive<T> {
    pub desktop: T,
    pub mobile: T,
}

impl<T> Responsive<T> {
    #[must_use]
    pub const fn new(desktop: T, mobile: T) -> Self {
        Self { desktop, mobile }
    }

    /// The entry for the given device class.
    #[must_use]
    pub fn get(&self, device: DeviceClass) -> &T {
        match device {
            DeviceClass::Desktop => &self.desktop,
            DeviceClass::Mobile => &self.mobile,
        }
    }

    pub fn get_mut(&mut self, device: DeviceClass) -> &mut T {
        match device {
            DeviceClass::Desktop => &mut self.desktop,
            DeviceClass::Mobile => &mut self.mobile,
        }
    }
}

/// Position of an element's center, as percentages of its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Percent,
    pub y: Percent,
}

impl Point {
    #[must_use]
    pub const fn new(x: Percent, y: Percent) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Whether an element scrolls with the page or stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attachment {
    #[default]
    Scroll,
    Fixed,
}

/// Scale preset shared by the floating cards and the user block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    #[default]
    Medium,
    Large,
}

// ── Section backgrounds ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSize {
    #[default]
    Cover,
    Contain,
    Auto,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundPosition {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Color wash drawn over a section background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub enabled: bool,
    pub color: String,
    pub opacity: Percent,
}

/// Background of a full-width page section (hero, loan status, services).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    pub image: String,
    pub opacity: Percent,
    pub size: BackgroundSize,
    pub position: BackgroundPosition,
    pub attachment: Attachment,
    pub overlay: Overlay,
}

impl BackgroundSettings {
    /// Hero section: mobile hero photo under a strong white wash.
    #[must_use]
    pub fn hero_default() -> Self {
        Self {
            image: "/images/hero/CK_td01830000604_l_1758789035114_mobile.webp".to_owned(),
            opacity: 100,
            size: BackgroundSize::Cover,
            position: BackgroundPosition::Center,
            attachment: Attachment::Scroll,
            overlay: Overlay {
                enabled: true,
                color: "#ffffff".to_owned(),
                opacity: 68,
            },
        }
    }

    /// Loan status section: photo under a light black wash.
    #[must_use]
    pub fn loan_default() -> Self {
        Self {
            image: "/images/loan/CK_tica114m19040525_l_1758789070676.webp".to_owned(),
            opacity: 100,
            size: BackgroundSize::Cover,
            position: BackgroundPosition::Center,
            attachment: Attachment::Scroll,
            overlay: Overlay {
                enabled: true,
                color: "#000000".to_owned(),
                opacity: 30,
            },
        }
    }

    /// Service section: no image, overlay off.
    #[must_use]
    pub fn service_default() -> Self {
        Self {
            image: String::new(),
            opacity: 100,
            size: BackgroundSize::Cover,
            position: BackgroundPosition::Center,
            attachment: Attachment::Scroll,
            overlay: Overlay {
                enabled: false,
                color: "#ffffff".to_owned(),
                opacity: 50,
            },
        }
    }
}

// ── Hero section ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImageSettings {
    pub image: String,
    pub position: Responsive<Point>,
    pub size: Responsive<Dimensions>,
    pub opacity: Percent,
    pub attachment: Attachment,
    /// Pin the image to the bottom edge of the hero section.
    pub bottom_fixed: bool,
}

impl HeroImageSettings {
    #[must_use]
    pub fn group_default() -> Self {
        Self {
            image: "/ZLGyUnGMg6GvctEx8LUCBP9Fwo.avif".to_owned(),
            position: Responsive::new(Point::new(63, 50), Point::new(50, 15)),
            size: Responsive::new(Dimensions::new(800, 300), Dimensions::new(380, 300)),
            opacity: 100,
            attachment: Attachment::Scroll,
            bottom_fixed: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleSize {
    Small,
    Medium,
    #[default]
    Large,
    Xl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroTextSettings {
    pub alignment: TextAlignment,
    pub title_color: String,
    pub subtitle_color: String,
    pub description_color: String,
    pub title_size: TitleSize,
    pub position: Responsive<Point>,
    pub attachment: Attachment,
}

impl HeroTextSettings {
    #[must_use]
    pub fn group_default() -> Self {
        Self {
            alignment: TextAlignment::Left,
            title_color: "#1f2937".to_owned(),
            subtitle_color: "#2563eb".to_owned(),
            description_color: "#6b7280".to_owned(),
            title_size: TitleSize::Large,
            position: Responsive::new(Point::new(22, 45), Point::new(50, 31)),
            attachment: Attachment::Scroll,
        }
    }
}

// ── Floating cards ───────────────────────────────────────────────────

/// The "monthly payment" card floating over the hero image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCardSettings {
    pub position: Responsive<Point>,
    pub size: CardSize,
    pub opacity: Percent,
    pub visible: bool,
    pub attachment: Attachment,
}

impl PaymentCardSettings {
    #[must_use]
    pub fn group_default() -> Self {
        Self {
            position: Responsive::new(Point::new(67, 32), Point::new(50, 15)),
            size: CardSize::Medium,
            opacity: 95,
            visible: true,
            attachment: Attachment::Scroll,
        }
    }
}

/// The second hero card, which also carries editable copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard2Settings {
    pub position: Responsive<Point>,
    pub size: CardSize,
    pub opacity: Percent,
    pub visible: bool,
    pub attachment: Attachment,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub title_color: String,
    pub subtitle_color: String,
    pub description_color: String,
}

impl PaymentCard2Settings {
    #[must_use]
    pub fn group_default() -> Self {
        Self {
            position: Responsive::new(Point::new(81, 66), Point::new(50, 65)),
            size: CardSize::Medium,
            opacity: 95,
            visible: true,
            attachment: Attachment::Scroll,
            title: "빠른 승인!".to_owned(),
            subtitle: "당일 처리".to_owned(),
            description: "신속한 대출 서비스!".to_owned(),
            title_color: "#1f2937".to_owned(),
            subtitle_color: "#2563eb".to_owned(),
            description_color: "#059669".to_owned(),
        }
    }
}

/// The customer-review block in the hero section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBlockSettings {
    pub position: Responsive<Point>,
    pub size: CardSize,
    pub opacity: Percent,
    pub visible: bool,
    pub attachment: Attachment,
}

impl UserBlockSettings {
    #[must_use]
    pub fn group_default() -> Self {
        Self {
            position: Responsive::new(Point::new(70, 65), Point::new(50, 50)),
            size: CardSize::Medium,
            opacity: 100,
            visible: true,
            attachment: Attachment::Scroll,
        }
    }
}

// ── Loan cards ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBackgroundKind {
    #[default]
    Color,
    Gradient,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientDirection {
    ToR,
    ToL,
    ToT,
    ToB,
    #[default]
    ToBr,
    ToBl,
    ToTr,
    ToTl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gradient {
    pub from: String,
    pub to: String,
    pub direction: GradientDirection,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            from: "#3b82f6".to_owned(),
            to: "#1d4ed8".to_owned(),
            direction: GradientDirection::ToBr,
        }
    }
}

/// Optional custom background of one loan card.
///
/// Missing fields fall back to the defaults below, so cards stored before this
/// record existed still decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardBackground {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: CardBackgroundKind,
    pub color: String,
    pub gradient: Gradient,
    pub image: String,
    pub opacity: Percent,
}

impl Default for CardBackground {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: CardBackgroundKind::Color,
            color: "#ffffff".to_owned(),
            gradient: Gradient::default(),
            image: String::new(),
            opacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextColors {
    pub title: String,
    pub description: String,
    pub features: String,
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            title: "#1f2937".to_owned(),
            description: "#6b7280".to_owned(),
            features: "#374151".to_owned(),
        }
    }
}

/// One card in the loan-product list. Identity is `id`, not list position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanCardSettings {
    pub id: String,
    pub visible: bool,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub color: CardColor,
    pub icon: String,
    pub background: CardBackground,
    pub text_color: TextColors,
}

impl Default for LoanCardSettings {
    fn default() -> Self {
        Self {
            id: String::new(),
            visible: true,
            title: String::new(),
            description: String::new(),
            features: Vec::new(),
            color: CardColor::Blue,
            icon: "CreditCard".to_owned(),
            background: CardBackground::default(),
            text_color: TextColors::default(),
        }
    }
}

impl LoanCardSettings {
    fn preset(
        id: &str,
        title: &str,
        description: &str,
        features: [&str; 3],
        color: CardColor,
        icon: &str,
        gradient: (&str, &str),
    ) -> Self {
        Self {
            id: id.to_owned(),
            visible: true,
            title: title.to_owned(),
            description: description.to_owned(),
            features: features.iter().map(|f| (*f).to_owned()).collect(),
            color,
            icon: icon.to_owned(),
            background: CardBackground {
                gradient: Gradient {
                    from: gradient.0.to_owned(),
                    to: gradient.1.to_owned(),
                    direction: GradientDirection::ToBr,
                },
                ..CardBackground::default()
            },
            text_color: TextColors::default(),
        }
    }

    /// The four loan products shown on a fresh profile.
    #[must_use]
    pub fn group_default() -> Vec<Self> {
        vec![
            Self::preset(
                "credit-loan",
                "신용대출",
                "담보 없이 신용도만으로 대출",
                ["최대 1억원", "연 3.5%~", "24시간 승인"],
                CardColor::Blue,
                "CreditCard",
                ("#3b82f6", "#1d4ed8"),
            ),
            Self::preset(
                "mortgage-loan",
                "주택담보대출",
                "내 집을 담보로 저금리 대출",
                ["최대 20억원", "연 2.5%~", "LTV 80%"],
                CardColor::Green,
                "Home",
                ("#10b981", "#059669"),
            ),
            Self::preset(
                "business-loan",
                "사업자대출",
                "사업자등록증으로 사업자금 조달",
                ["최대 10억원", "연 4.0%~", "서류간소화"],
                CardColor::Purple,
                "Briefcase",
                ("#8b5cf6", "#7c3aed"),
            ),
            Self::preset(
                "property-loan",
                "부동산담보대출",
                "부동산을 담보로 한 대출",
                ["최대 50억원", "연 3.0%~", "높은 한도"],
                CardColor::Orange,
                "Building2",
                ("#f97316", "#ea580c"),
            ),
        ]
    }
}

/// Find a card by id.
pub fn card_mut<'a>(cards: &'a mut [LoanCardSettings], id: &str) -> Option<&'a mut LoanCardSettings> {
    cards.iter_mut().find(|card| card.id == id)
}

/// Show or hide a card by id. Returns `false` if no card has that id.
pub fn set_card_visible(cards: &mut [LoanCardSettings], id: &str, visible: bool) -> bool {
    match card_mut(cards, id) {
        Some(card) => {
            card.visible = visible;
            true
        }
        None => false,
    }
}

// ── Carousel and custom backgrounds ──────────────────────────────────

/// One slide of the testimonial carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselImage {
    pub id: String,
    pub src: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Page sections whose background can be swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    Loan,
    Service,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Hero, Self::Loan, Self::Service];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Loan => "loan",
            Self::Service => "service",
        }
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| format!("unknown section '{s}' (expected hero, loan or service)"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_class_breakpoint() {
        assert_eq!(DeviceClass::from_viewport_width(375), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_viewport_width(767), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_viewport_width(768), DeviceClass::Desktop);
    }

    #[test]
    fn enum_wire_names_match_site() {
        let json = serde_json::to_string(&BackgroundPosition::BottomRight).unwrap();
        assert_eq!(json, "\"bottom-right\"");
        let json = serde_json::to_string(&GradientDirection::ToTl).unwrap();
        assert_eq!(json, "\"to-tl\"");
        let json = serde_json::to_string(&TitleSize::Xl).unwrap();
        assert_eq!(json, "\"xl\"");
    }

    #[test]
    fn hero_image_serializes_camel_case() {
        let value = serde_json::to_value(HeroImageSettings::group_default()).unwrap();
        assert_eq!(value["bottomFixed"], serde_json::Value::Bool(true));
        assert_eq!(value["position"]["desktop"]["x"], 63);
        assert_eq!(value["size"]["mobile"]["width"], 380);
    }

    #[test]
    fn card_background_type_field_name() {
        let value = serde_json::to_value(CardBackground::default()).unwrap();
        assert_eq!(value["type"], "color");
        assert_eq!(value["gradient"]["direction"], "to-br");
    }

    #[test]
    fn default_loan_cards_have_stable_ids() {
        let ids: Vec<String> = LoanCardSettings::group_default()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(
            ids,
            vec!["credit-loan", "mortgage-loan", "business-loan", "property-loan"]
        );
    }

    #[test]
    fn card_visibility_by_id() {
        let mut cards = LoanCardSettings::group_default();
        assert!(set_card_visible(&mut cards, "business-loan", false));
        assert!(!set_card_visible(&mut cards, "missing", false));
        assert!(!cards[2].visible);
        assert!(cards[0].visible);
    }
}
