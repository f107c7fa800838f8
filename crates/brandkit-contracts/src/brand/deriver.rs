use serde::{Deserialize, Serialize};

use crate::catalog::{Industry, Tone, BASELINE_FONT};
use crate::form::FormInput;
use crate::i18n::{Bilingual, Language};

use super::ai_result::AiResult;
use super::color::{hex_to_rgb, hsl_to_hex, Rgb};

pub const DEFAULT_HUE: f64 = 220.0;
pub const BASE_SATURATION: f64 = 60.0;
pub const BASE_LIGHTNESS: f64 = 50.0;
pub const SECONDARY_HUE_SHIFT: f64 = 30.0;
pub const SECONDARY_SATURATION_SCALE: f64 = 0.8;
pub const SECONDARY_LIGHTNESS_LIFT: f64 = 10.0;
pub const DEFAULT_ACCENT: &str = "#FFFFFF";
pub const MAX_KEYWORD_CARDS: usize = 4;

const INDUSTRY_HUES: &[(Industry, f64)] = &[
    (Industry::Technology, 210.0),
    (Industry::Healthcare, 200.0),
    (Industry::Finance, 230.0),
    (Industry::FoodBeverage, 25.0),
    (Industry::Fashion, 330.0),
    (Industry::Education, 45.0),
    (Industry::Beauty, 340.0),
    (Industry::RealEstate, 150.0),
    (Industry::Entertainment, 280.0),
];

struct IndustryCard {
    industry: Industry,
    title: (&'static str, &'static str),
    description: (&'static str, &'static str),
}

const INDUSTRY_CARDS: &[IndustryCard] = &[
    IndustryCard {
        industry: Industry::Technology,
        title: ("Cutting-edge", "첨단"),
        description: (
            "Technology that feels effortless and ahead of its time.",
            "앞서가면서도 쉽게 느껴지는 기술을 지향합니다.",
        ),
    },
    IndustryCard {
        industry: Industry::Healthcare,
        title: ("Empathetic", "공감"),
        description: (
            "Care that listens first and treats every person with dignity.",
            "먼저 귀 기울이고 모든 사람을 존중하는 케어를 전합니다.",
        ),
    },
    IndustryCard {
        industry: Industry::Finance,
        title: ("Reliable", "신뢰"),
        description: (
            "Steady guidance people can count on for every financial decision.",
            "모든 금융 결정에서 믿고 기댈 수 있는 든든함을 제공합니다.",
        ),
    },
    IndustryCard {
        industry: Industry::FoodBeverage,
        title: ("Appetizing", "미각"),
        description: (
            "Flavor-first storytelling that makes every moment delicious.",
            "모든 순간을 맛있게 만드는 맛 중심의 이야기를 전합니다.",
        ),
    },
    IndustryCard {
        industry: Industry::Fashion,
        title: ("Trendsetting", "트렌드"),
        description: (
            "Style that leads the conversation instead of following it.",
            "흐름을 따르기보다 대화를 이끄는 스타일을 제안합니다.",
        ),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
}

impl ColorRole {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (ColorRole::Primary, Language::En) => "Primary",
            (ColorRole::Primary, Language::Ko) => "메인 컬러",
            (ColorRole::Secondary, Language::En) => "Secondary",
            (ColorRole::Secondary, Language::Ko) => "보조 컬러",
            (ColorRole::Accent, Language::En) => "Accent",
            (ColorRole::Accent, Language::Ko) => "포인트 컬러",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColor {
    pub hex: String,
    pub rgb: Rgb,
    pub role: ColorRole,
}

impl BrandColor {
    fn new(hex: &str, role: ColorRole) -> Self {
        // Derived and overlay colors are normalized before they get here.
        let rgb = hex_to_rgb(hex).unwrap_or(Rgb { r: 255, g: 255, b: 255 });
        Self {
            hex: rgb.to_hex(),
            rgb,
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPair {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconStyle {
    Line,
    Solid,
}

impl IconStyle {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (IconStyle::Line, Language::En) => "Line",
            (IconStyle::Line, Language::Ko) => "라인",
            (IconStyle::Solid, Language::En) => "Solid",
            (IconStyle::Solid, Language::Ko) => "솔리드",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCard {
    pub title: Bilingual,
    pub description: Bilingual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandAssets {
    /// Always Primary, Secondary, Accent in that order.
    pub colors: Vec<BrandColor>,
    pub fonts: FontPair,
    pub slogan: Bilingual,
    pub mission: Bilingual,
    pub core_value: Bilingual,
    pub keywords: Vec<KeywordCard>,
    pub icon_style: IconStyle,
}

pub fn base_hue(industry: Option<Industry>) -> f64 {
    industry
        .and_then(|industry| {
            INDUSTRY_HUES
                .iter()
                .find(|(candidate, _)| *candidate == industry)
                .map(|(_, hue)| *hue)
        })
        .unwrap_or(DEFAULT_HUE)
}

/// Deterministic assets with the AI fields laid over them where present.
pub fn derive_brand_assets(input: &FormInput, ai: Option<&AiResult>) -> BrandAssets {
    let mut assets = baseline_assets(input);
    if let Some(ai) = ai {
        apply_overlay(&mut assets, ai);
    }
    assets
}

pub fn baseline_assets(input: &FormInput) -> BrandAssets {
    BrandAssets {
        colors: derived_palette(input.industry),
        fonts: FontPair {
            heading: BASELINE_FONT.to_string(),
            body: BASELINE_FONT.to_string(),
        },
        slogan: default_slogan(input),
        mission: default_mission(input),
        core_value: default_core_value(input),
        keywords: keyword_cards(input),
        icon_style: if input.has_tone(Tone::Minimal) {
            IconStyle::Line
        } else {
            IconStyle::Solid
        },
    }
}

fn apply_overlay(assets: &mut BrandAssets, ai: &AiResult) {
    if let (Some(primary), Some(secondary)) = (&ai.primary_color, &ai.secondary_color) {
        let accent = ai.accent_color.as_deref().unwrap_or(DEFAULT_ACCENT);
        assets.colors = vec![
            BrandColor::new(primary, ColorRole::Primary),
            BrandColor::new(secondary, ColorRole::Secondary),
            BrandColor::new(accent, ColorRole::Accent),
        ];
    }
    if let Some(font) = &ai.primary_font {
        assets.fonts.heading = font.clone();
    }
    if let Some(font) = &ai.secondary_font {
        assets.fonts.body = font.clone();
    }
    if let Some(slogan) = &ai.slogan {
        assets.slogan = slogan.clone();
    }
    if let Some(mission) = &ai.mission {
        assets.mission = mission.clone();
    }
    if let Some(core_value) = &ai.core_value {
        assets.core_value = core_value.clone();
    }
}

pub fn derived_palette(industry: Option<Industry>) -> Vec<BrandColor> {
    let hue = base_hue(industry);
    let primary = hsl_to_hex(hue, BASE_SATURATION, BASE_LIGHTNESS);
    let secondary = hsl_to_hex(
        (hue + SECONDARY_HUE_SHIFT).rem_euclid(360.0),
        BASE_SATURATION * SECONDARY_SATURATION_SCALE,
        (BASE_LIGHTNESS + SECONDARY_LIGHTNESS_LIFT).min(100.0),
    );
    vec![
        BrandColor::new(&primary, ColorRole::Primary),
        BrandColor::new(&secondary, ColorRole::Secondary),
        BrandColor::new(DEFAULT_ACCENT, ColorRole::Accent),
    ]
}

fn default_slogan(input: &FormInput) -> Bilingual {
    if input.has_tone(Tone::Innovative) {
        Bilingual::new("Shaping tomorrow, today.", "내일을 오늘 만들어갑니다.")
    } else {
        Bilingual::new("Made for the way you live.", "당신의 일상을 위해 만들었습니다.")
    }
}

fn default_core_value(input: &FormInput) -> Bilingual {
    if input.has_tone(Tone::Premium) {
        Bilingual::new(
            "Uncompromising quality in every detail",
            "모든 디테일에 타협 없는 품질",
        )
    } else {
        Bilingual::new("Honest value for everyday life", "일상을 위한 정직한 가치")
    }
}

fn default_mission(input: &FormInput) -> Bilingual {
    let industry = |language: Language| match input.industry {
        Some(industry) => industry.label(language),
        None => match language {
            Language::En => "our industry",
            Language::Ko => "업계",
        },
    };
    Bilingual::new(
        format!(
            "To redefine {} with an experience that feels {}.",
            industry(Language::En),
            joined_tones(input, Language::En)
        ),
        format!(
            "{} 경험으로 {}의 기준을 새롭게 정의합니다.",
            joined_tones(input, Language::Ko),
            industry(Language::Ko)
        ),
    )
}

/// Strategy text used when the service answered but left strategy out.
pub fn default_strategy(input: &FormInput) -> Bilingual {
    let brand = match input.trimmed_brand_name() {
        "" => "The brand",
        name => name,
    };
    let touchpoint = |language: Language| match input.touchpoint {
        Some(touchpoint) => touchpoint.label(language),
        None => match language {
            Language::En => "every channel",
            Language::Ko => "모든 채널",
        },
    };
    Bilingual::new(
        format!(
            "{brand} builds an identity that feels {}, expressed first through {}.",
            joined_tones(input, Language::En),
            touchpoint(Language::En)
        ),
        format!(
            "{brand}은(는) {}을 중심으로 {} 아이덴티티를 전달합니다.",
            touchpoint(Language::Ko),
            joined_tones(input, Language::Ko)
        ),
    )
}

/// Tone labels as running text: "calm, warm and bold" in English, comma
/// separated in Korean.
fn joined_tones(input: &FormInput, language: Language) -> String {
    let labels: Vec<String> = input
        .selected_tones
        .iter()
        .map(|tone| match language {
            Language::En => tone.label(language).to_lowercase(),
            Language::Ko => tone.label(language).to_string(),
        })
        .collect();
    match (language, labels.as_slice()) {
        (Language::En, []) => "distinctive".to_string(),
        (Language::Ko, []) => "차별화된".to_string(),
        (Language::En, [head @ .., last]) if !head.is_empty() => {
            format!("{} and {last}", head.join(", "))
        }
        _ => labels.join(", "),
    }
}

fn keyword_cards(input: &FormInput) -> Vec<KeywordCard> {
    let mut cards: Vec<KeywordCard> = input
        .selected_tones
        .iter()
        .map(|tone| KeywordCard {
            title: Bilingual::new(tone.label(Language::En), tone.label(Language::Ko)),
            description: Bilingual::new(
                format!(
                    "A {} sensibility runs through every brand touchpoint.",
                    tone.label(Language::En).to_lowercase()
                ),
                format!(
                    "모든 브랜드 접점에 {} 감성을 일관되게 담아냅니다.",
                    tone.label(Language::Ko)
                ),
            ),
        })
        .collect();

    if cards.len() < MAX_KEYWORD_CARDS {
        let industry_card = input.industry.and_then(|industry| {
            INDUSTRY_CARDS
                .iter()
                .find(|card| card.industry == industry)
        });
        if let Some(card) = industry_card {
            cards.push(KeywordCard {
                title: Bilingual::new(card.title.0, card.title.1),
                description: Bilingual::new(card.description.0, card.description.1),
            });
        }
    }
    cards.truncate(MAX_KEYWORD_CARDS);
    cards
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Industry, Tone, Touchpoint};

    use super::*;

    fn input(industry: Option<Industry>, tones: &[Tone]) -> FormInput {
        FormInput {
            brand_name: "Lumen".to_string(),
            industry,
            touchpoint: Some(Touchpoint::MobileApp),
            selected_tones: tones.to_vec(),
            negative_preference: String::new(),
        }
    }

    #[test]
    fn healthcare_uses_base_hue_and_empathetic_card() {
        let assets = derive_brand_assets(&input(Some(Industry::Healthcare), &[Tone::Calm]), None);
        assert_eq!(base_hue(Some(Industry::Healthcare)), 200.0);
        assert_eq!(assets.colors[0].hex, hsl_to_hex(200.0, 60.0, 50.0));
        assert_eq!(assets.colors[0].hex, "#3399CC");
        assert_eq!(assets.colors[1].hex, hsl_to_hex(230.0, 48.0, 60.0));
        assert_eq!(assets.colors[2].hex, DEFAULT_ACCENT);
        assert_eq!(
            assets.colors.iter().map(|color| color.role).collect::<Vec<_>>(),
            vec![ColorRole::Primary, ColorRole::Secondary, ColorRole::Accent]
        );
        let titles: Vec<&str> = assets.keywords.iter().map(|card| card.title.en.as_str()).collect();
        assert_eq!(titles, vec!["Calm", "Empathetic"]);
    }

    #[test]
    fn unknown_or_missing_industry_uses_default_hue() {
        assert_eq!(base_hue(Some(Industry::Other)), DEFAULT_HUE);
        assert_eq!(base_hue(None), DEFAULT_HUE);
        let assets = derive_brand_assets(&input(None, &[]), None);
        assert_eq!(assets.colors[0].hex, hsl_to_hex(DEFAULT_HUE, 60.0, 50.0));
        assert!(assets.keywords.is_empty());
    }

    #[test]
    fn secondary_hue_wraps_past_360() {
        let palette = derived_palette(Some(Industry::Beauty));
        assert_eq!(palette[1].hex, hsl_to_hex(10.0, 48.0, 60.0));
    }

    #[test]
    fn minimal_and_premium_pick_line_icons_and_premium_value() {
        let assets = derive_brand_assets(
            &input(Some(Industry::Fashion), &[Tone::Minimal, Tone::Premium]),
            None,
        );
        assert_eq!(assets.icon_style, IconStyle::Line);
        assert_eq!(assets.core_value.en, "Uncompromising quality in every detail");
        assert_eq!(assets.slogan.en, "Made for the way you live.");

        let solid = derive_brand_assets(&input(Some(Industry::Fashion), &[Tone::Bold]), None);
        assert_eq!(solid.icon_style, IconStyle::Solid);
        assert_eq!(solid.core_value.en, "Honest value for everyday life");
    }

    #[test]
    fn innovative_switches_slogan_and_mission_lists_tones() {
        let assets = derive_brand_assets(
            &input(Some(Industry::Technology), &[Tone::Innovative, Tone::Friendly]),
            None,
        );
        assert_eq!(assets.slogan.en, "Shaping tomorrow, today.");
        assert_eq!(
            assets.mission.en,
            "To redefine Technology with an experience that feels innovative and friendly."
        );
        assert!(assets.mission.ko.contains("혁신적인, 친근한"));

        let three = derive_brand_assets(
            &input(None, &[Tone::Innovative, Tone::Calm, Tone::Bold]),
            None,
        );
        assert_eq!(
            three.mission.en,
            "To redefine our industry with an experience that feels innovative, calm and bold."
        );
        assert_eq!(
            default_strategy(&input(None, &[Tone::Elegant])).en,
            "Lumen builds an identity that feels elegant, expressed first through Mobile App."
        );
    }

    #[test]
    fn keyword_cards_follow_selection_order_and_cap_at_four() {
        let tones = [
            Tone::Warm,
            Tone::Elegant,
            Tone::Calm,
            Tone::Witty,
            Tone::Classic,
        ];
        let assets = derive_brand_assets(&input(Some(Industry::Healthcare), &tones), None);
        let titles: Vec<&str> = assets.keywords.iter().map(|card| card.title.en.as_str()).collect();
        assert_eq!(titles, vec!["Warm", "Elegant", "Calm", "Witty"]);

        let four = derive_brand_assets(
            &input(Some(Industry::Healthcare), &tones[..4]),
            None,
        );
        assert!(four.keywords.iter().all(|card| card.title.en != "Empathetic"));

        let three = derive_brand_assets(&input(Some(Industry::Finance), &tones[..3]), None);
        assert_eq!(three.keywords.len(), 4);
        assert_eq!(three.keywords[3].title.en, "Reliable");
    }

    #[test]
    fn overlay_replaces_only_supplied_fields() {
        let ai = AiResult {
            slogan: Some(Bilingual::new("Glow on", "빛나게")),
            primary_color: Some("#112233".to_string()),
            secondary_color: Some("#445566".to_string()),
            primary_font: Some("Playfair Display".to_string()),
            ..AiResult::default()
        };
        let base = input(Some(Industry::Healthcare), &[Tone::Premium]);
        let assets = derive_brand_assets(&base, Some(&ai));
        assert_eq!(assets.slogan.en, "Glow on");
        assert_eq!(assets.colors[0].hex, "#112233");
        assert_eq!(assets.colors[0].rgb, Rgb { r: 0x11, g: 0x22, b: 0x33 });
        assert_eq!(assets.colors[2].hex, DEFAULT_ACCENT);
        assert_eq!(assets.fonts.heading, "Playfair Display");
        assert_eq!(assets.fonts.body, BASELINE_FONT);
        assert_eq!(assets.core_value, baseline_assets(&base).core_value);
    }

    #[test]
    fn overlay_needs_both_primary_and_secondary_colors() {
        let ai = AiResult {
            primary_color: Some("#112233".to_string()),
            accent_color: Some("#FF0000".to_string()),
            ..AiResult::default()
        };
        let base = input(Some(Industry::Healthcare), &[]);
        let assets = derive_brand_assets(&base, Some(&ai));
        assert_eq!(assets.colors, derived_palette(Some(Industry::Healthcare)));
    }

    #[test]
    fn derivation_is_pure() {
        let ai = AiResult {
            mission: Some(Bilingual::new("m", "미")),
            ..AiResult::default()
        };
        let base = input(Some(Industry::Education), &[Tone::Playful, Tone::Sustainable]);
        assert_eq!(
            derive_brand_assets(&base, Some(&ai)),
            derive_brand_assets(&base, Some(&ai))
        );
        assert_eq!(derive_brand_assets(&base, None), derive_brand_assets(&base, None));
    }
}
