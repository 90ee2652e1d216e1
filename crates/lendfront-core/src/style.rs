//! Derived style values.
//!
//! Render surfaces and dialog previews turn settings records into CSS
//! declarations. The mapping lives here so both draw from the same numbers:
//! percentages become `left`/`top`, opacity becomes a `0..=1` fraction, card
//! sizes become `scale()` factors. Previews draw cards smaller than the page
//! does so the whole section fits inside the dialog.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::schema::{
    Attachment, BackgroundPosition, BackgroundSettings, BackgroundSize, CardBackground,
    CardBackgroundKind, CardSize, CarouselImage, DeviceClass, GradientDirection,
    HeroImageSettings, HeroTextSettings, LoanCardSettings, Overlay, PaymentCard2Settings,
    PaymentCardSettings, Percent, Point, TextAlignment, TitleSize, UserBlockSettings,
};

/// Where the styles are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// The landing page itself.
    #[default]
    Page,
    /// The scaled-down preview inside a manager dialog.
    Dialog,
}

impl std::str::FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(Self::Page),
            "dialog" => Ok(Self::Dialog),
            other => Err(format!("unknown surface '{other}' (expected page or dialog)")),
        }
    }
}

/// One CSS property and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

/// Declarations for one rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleBlock {
    pub target: String,
    pub declarations: Vec<Declaration>,
}

impl StyleBlock {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.declarations.push(Declaration {
            property,
            value: value.into(),
        });
        self
    }

    /// Value of `property`, if declared.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }

    /// Render as a CSS rule, one declaration per line.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = format!("{} {{\n", self.target);
        for d in &self.declarations {
            let _ = writeln!(css, "  {}: {};", d.property, d.value);
        }
        css.push('}');
        css
    }
}

impl fmt::Display for StyleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Settings types that derive style blocks.
pub trait Preview {
    fn style_blocks(&self, device: DeviceClass, surface: Surface) -> Vec<StyleBlock>;
}

/// Style blocks for the current value, or a placeholder while the store is
/// still hydrating.
pub fn render<T: Preview>(current: Option<&T>, device: DeviceClass, surface: Surface) -> Vec<StyleBlock> {
    match current {
        Some(value) => value.style_blocks(device, surface),
        None => vec![placeholder()],
    }
}

/// Block drawn in place of a region whose settings are not loaded yet.
#[must_use]
pub fn placeholder() -> StyleBlock {
    StyleBlock::new("placeholder")
        .with("visibility", "hidden")
        .with("min-height", "100%")
}

// ── Value mapping ────────────────────────────────────────────────────

/// `opacity` value for an integer percentage.
#[must_use]
pub fn opacity(percent: Percent) -> String {
    format_fraction(f64::from(percent) / 100.0)
}

fn format_fraction(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-" {
        "0".to_owned()
    } else {
        text.to_owned()
    }
}

/// `rgba(...)` for a `#rrggbb` or `#rgb` color at `percent` opacity.
/// Returns `None` for anything else.
#[must_use]
pub fn hex_to_rgba(hex: &str, percent: Percent) -> Option<String> {
    let digits = hex.strip_prefix('#').filter(|d| d.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match digits.len() {
        6 => (channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?),
        3 => {
            let short = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
            (short(0)?, short(1)?, short(2)?)
        }
        _ => return None,
    };
    Some(format!("rgba({r}, {g}, {b}, {})", opacity(percent)))
}

#[must_use]
pub fn background_size(size: BackgroundSize) -> &'static str {
    match size {
        BackgroundSize::Cover => "cover",
        BackgroundSize::Contain => "contain",
        BackgroundSize::Auto => "auto",
        BackgroundSize::Stretch => "100% 100%",
    }
}

#[must_use]
pub fn background_position(position: BackgroundPosition) -> &'static str {
    match position {
        BackgroundPosition::Center => "center",
        BackgroundPosition::Top => "top",
        BackgroundPosition::Bottom => "bottom",
        BackgroundPosition::Left => "left",
        BackgroundPosition::Right => "right",
        BackgroundPosition::TopLeft => "top left",
        BackgroundPosition::TopRight => "top right",
        BackgroundPosition::BottomLeft => "bottom left",
        BackgroundPosition::BottomRight => "bottom right",
    }
}

#[must_use]
pub fn css_position(attachment: Attachment) -> &'static str {
    match attachment {
        Attachment::Scroll => "absolute",
        Attachment::Fixed => "fixed",
    }
}

#[must_use]
pub fn gradient_direction(direction: GradientDirection) -> &'static str {
    match direction {
        GradientDirection::ToR => "to right",
        GradientDirection::ToL => "to left",
        GradientDirection::ToT => "to top",
        GradientDirection::ToB => "to bottom",
        GradientDirection::ToBr => "to bottom right",
        GradientDirection::ToBl => "to bottom left",
        GradientDirection::ToTr => "to top right",
        GradientDirection::ToTl => "to top left",
    }
}

/// `scale()` factor of a card size on a surface.
#[must_use]
pub fn card_scale(size: CardSize, surface: Surface) -> &'static str {
    match (surface, size) {
        (Surface::Page, CardSize::Small) => "0.75",
        (Surface::Page, CardSize::Medium) => "1",
        (Surface::Page, CardSize::Large) => "1.25",
        (Surface::Dialog, CardSize::Small) => "0.5",
        (Surface::Dialog, CardSize::Medium) => "0.6",
        (Surface::Dialog, CardSize::Large) => "0.7",
    }
}

#[must_use]
pub fn title_font_size(size: TitleSize) -> &'static str {
    match size {
        TitleSize::Small => "1.5rem",
        TitleSize::Medium => "1.875rem",
        TitleSize::Large => "2.25rem",
        TitleSize::Xl => "3rem",
    }
}

/// Image value the hero uses for its built-in blue gradient.
const GRADIENT_BLUE: &str = "gradient-blue";

fn section_fill(image: &str) -> String {
    match image {
        "" => "linear-gradient(135deg, #eff6ff 0%, #dbeafe 50%, #e0e7ff 100%)".to_owned(),
        GRADIENT_BLUE => "linear-gradient(135deg, #1e3a8a 0%, #3b82f6 50%, #06b6d4 100%)".to_owned(),
        path => format!("url(\"{path}\")"),
    }
}

fn overlay_block(overlay: &Overlay) -> Option<StyleBlock> {
    if !overlay.enabled {
        return None;
    }
    let block = StyleBlock::new("section-overlay").with("inset", "0");
    Some(match hex_to_rgba(&overlay.color, overlay.opacity) {
        Some(rgba) => block.with("background-color", rgba),
        None => block
            .with("background-color", overlay.color.clone())
            .with("opacity", opacity(overlay.opacity)),
    })
}

fn positioned(target: &str, at: Point, attachment: Attachment, transform: String, percent: Percent) -> StyleBlock {
    StyleBlock::new(target)
        .with("position", css_position(attachment))
        .with("left", format!("{}%", at.x))
        .with("top", format!("{}%", at.y))
        .with("transform", transform)
        .with("opacity", opacity(percent))
}

fn card_transform(size: CardSize, surface: Surface) -> String {
    format!("translate(-50%, -50%) scale({})", card_scale(size, surface))
}

// ── Per-group styles ─────────────────────────────────────────────────

impl Preview for BackgroundSettings {
    fn style_blocks(&self, _device: DeviceClass, _surface: Surface) -> Vec<StyleBlock> {
        let mut blocks = vec![
            StyleBlock::new("section-background")
                .with("position", css_position(self.attachment))
                .with("background", section_fill(&self.image))
                .with("background-size", background_size(self.size))
                .with("background-position", background_position(self.position))
                .with("opacity", opacity(self.opacity)),
        ];
        blocks.extend(overlay_block(&self.overlay));
        blocks
    }
}

impl Preview for HeroImageSettings {
    fn style_blocks(&self, device: DeviceClass, _surface: Surface) -> Vec<StyleBlock> {
        if self.image.is_empty() {
            return Vec::new();
        }
        let at = *self.position.get(device);
        let size = self.size.get(device);
        let block = StyleBlock::new("hero-image")
            .with("position", css_position(self.attachment))
            .with("left", format!("{}%", at.x));
        let block = if self.bottom_fixed {
            block
                .with("bottom", "0px")
                .with("transform", "translate(-50%, 0%)")
        } else {
            block
                .with("top", format!("{}%", at.y))
                .with("transform", "translate(-50%, -50%)")
        };
        vec![
            block
                .with("width", format!("{}px", size.width))
                .with("height", format!("{}px", size.height))
                .with("opacity", opacity(self.opacity))
                .with("background-image", format!("url(\"{}\")", self.image)),
        ]
    }
}

impl Preview for HeroTextSettings {
    fn style_blocks(&self, device: DeviceClass, _surface: Surface) -> Vec<StyleBlock> {
        let at = *self.position.get(device);
        let align = match self.alignment {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
        };
        vec![
            positioned("hero-text", at, self.attachment, "translate(-50%, -50%)".to_owned(), 100)
                .with("text-align", align),
            StyleBlock::new("hero-title")
                .with("color", self.title_color.clone())
                .with("font-size", title_font_size(self.title_size)),
            StyleBlock::new("hero-subtitle").with("color", self.subtitle_color.clone()),
            StyleBlock::new("hero-description").with("color", self.description_color.clone()),
        ]
    }
}

impl Preview for PaymentCardSettings {
    fn style_blocks(&self, device: DeviceClass, surface: Surface) -> Vec<StyleBlock> {
        if !self.visible {
            return Vec::new();
        }
        vec![positioned(
            "payment-card",
            *self.position.get(device),
            self.attachment,
            card_transform(self.size, surface),
            self.opacity,
        )]
    }
}

impl Preview for PaymentCard2Settings {
    fn style_blocks(&self, device: DeviceClass, surface: Surface) -> Vec<StyleBlock> {
        if !self.visible {
            return Vec::new();
        }
        vec![
            positioned(
                "payment-card-2",
                *self.position.get(device),
                self.attachment,
                card_transform(self.size, surface),
                self.opacity,
            ),
            StyleBlock::new("payment-card-2-title").with("color", self.title_color.clone()),
            StyleBlock::new("payment-card-2-subtitle").with("color", self.subtitle_color.clone()),
            StyleBlock::new("payment-card-2-description").with("color", self.description_color.clone()),
        ]
    }
}

impl Preview for UserBlockSettings {
    fn style_blocks(&self, device: DeviceClass, surface: Surface) -> Vec<StyleBlock> {
        if !self.visible {
            return Vec::new();
        }
        vec![positioned(
            "user-block",
            *self.position.get(device),
            self.attachment,
            card_transform(self.size, surface),
            self.opacity,
        )]
    }
}

/// CSS `background` of a loan card, `None` when the custom background is off.
#[must_use]
pub fn card_background(background: &CardBackground) -> Option<String> {
    if !background.enabled {
        return None;
    }
    Some(match background.kind {
        CardBackgroundKind::Color => background.color.clone(),
        CardBackgroundKind::Gradient => format!(
            "linear-gradient({}, {}, {})",
            gradient_direction(background.gradient.direction),
            background.gradient.from,
            background.gradient.to
        ),
        CardBackgroundKind::Image if background.image.is_empty() => return None,
        CardBackgroundKind::Image => format!("url(\"{}\") center / cover", background.image),
    })
}

impl Preview for Vec<LoanCardSettings> {
    fn style_blocks(&self, _device: DeviceClass, _surface: Surface) -> Vec<StyleBlock> {
        let mut blocks = Vec::new();
        for card in self.iter().filter(|card| card.visible) {
            let target = format!("loan-card#{}", card.id);
            let block = match card_background(&card.background) {
                Some(background) => StyleBlock::new(target.as_str())
                    .with("background", background)
                    .with("background-opacity", opacity(card.background.opacity)),
                None => StyleBlock::new(target.as_str()).with("background", "none"),
            };
            blocks.push(block);
            blocks.push(
                StyleBlock::new(format!("{target} .title")).with("color", card.text_color.title.clone()),
            );
            blocks.push(
                StyleBlock::new(format!("{target} .description"))
                    .with("color", card.text_color.description.clone()),
            );
            blocks.push(
                StyleBlock::new(format!("{target} .features"))
                    .with("color", card.text_color.features.clone()),
            );
        }
        blocks
    }
}

impl Preview for Vec<CarouselImage> {
    fn style_blocks(&self, _device: DeviceClass, _surface: Surface) -> Vec<StyleBlock> {
        self.iter()
            .map(|image| {
                StyleBlock::new(format!("carousel#{}", image.id))
                    .with("background-image", format!("url(\"{}\")", image.src))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn opacity_fraction() {
        assert_eq!(opacity(100), "1");
        assert_eq!(opacity(68), "0.68");
        assert_eq!(opacity(5), "0.05");
        assert_eq!(opacity(0), "0");
        assert_eq!(opacity(50), "0.5");
    }

    #[test]
    fn hex_colors_to_rgba() {
        assert_eq!(hex_to_rgba("#ffffff", 68).unwrap(), "rgba(255, 255, 255, 0.68)");
        assert_eq!(hex_to_rgba("#000", 30).unwrap(), "rgba(0, 0, 0, 0.3)");
        assert!(hex_to_rgba("white", 30).is_none());
        assert!(hex_to_rgba("#12345", 30).is_none());
    }

    #[test]
    fn placeholder_until_ready() {
        let blocks = render::<HeroTextSettings>(None, DeviceClass::Desktop, Surface::Page);
        assert_eq!(blocks, vec![placeholder()]);
    }

    #[test]
    fn hero_background_default_styles() {
        let blocks = BackgroundSettings::hero_default().style_blocks(DeviceClass::Desktop, Surface::Page);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].get("background-size"), Some("cover"));
        assert_eq!(blocks[1].get("background-color"), Some("rgba(255, 255, 255, 0.68)"));

        let mut service = BackgroundSettings::service_default();
        service.size = BackgroundSize::Stretch;
        service.position = BackgroundPosition::TopLeft;
        let blocks = service.style_blocks(DeviceClass::Mobile, Surface::Page);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].get("background-size"), Some("100% 100%"));
        assert_eq!(blocks[0].get("background-position"), Some("top left"));
    }

    #[test]
    fn responsive_position_by_device() {
        let text = HeroTextSettings::group_default();
        let desktop = text.style_blocks(DeviceClass::Desktop, Surface::Page);
        let mobile = text.style_blocks(DeviceClass::Mobile, Surface::Page);
        assert_eq!(desktop[0].get("left"), Some("22%"));
        assert_eq!(mobile[0].get("top"), Some("31%"));
    }

    #[test]
    fn hero_image_pinned_to_bottom() {
        let blocks = HeroImageSettings::group_default().style_blocks(DeviceClass::Desktop, Surface::Page);
        assert_eq!(blocks[0].get("bottom"), Some("0px"));
        assert_eq!(blocks[0].get("top"), None);
        assert_eq!(blocks[0].get("width"), Some("800px"));
    }

    #[test]
    fn card_scale_differs_between_page_and_dialog() {
        let mut card = PaymentCardSettings::group_default();
        card.size = CardSize::Large;
        let page = card.style_blocks(DeviceClass::Desktop, Surface::Page);
        let dialog = card.style_blocks(DeviceClass::Desktop, Surface::Dialog);
        assert_eq!(page[0].get("transform"), Some("translate(-50%, -50%) scale(1.25)"));
        assert_eq!(dialog[0].get("transform"), Some("translate(-50%, -50%) scale(0.7)"));

        card.visible = false;
        assert!(card.style_blocks(DeviceClass::Desktop, Surface::Page).is_empty());
    }

    #[test]
    fn loan_card_backgrounds() {
        let mut background = CardBackground {
            enabled: true,
            kind: CardBackgroundKind::Gradient,
            ..CardBackground::default()
        };
        assert_eq!(
            card_background(&background).unwrap(),
            "linear-gradient(to bottom right, #3b82f6, #1d4ed8)"
        );
        background.kind = CardBackgroundKind::Image;
        assert!(card_background(&background).is_none());
        background.enabled = false;
        assert!(card_background(&background).is_none());

        let mut cards = LoanCardSettings::group_default();
        cards[0].visible = false;
        let blocks = cards.style_blocks(DeviceClass::Desktop, Surface::Page);
        assert!(blocks.iter().all(|b| !b.target.starts_with("loan-card#credit-loan")));
        assert_eq!(blocks[0].target, "loan-card#mortgage-loan");
        assert_eq!(blocks[0].get("background"), Some("none"));
    }

    #[test]
    fn css_rendering() {
        let css = StyleBlock::new("x").with("left", "5%").to_css();
        assert_eq!(css, "x {\n  left: 5%;\n}");
    }
}
