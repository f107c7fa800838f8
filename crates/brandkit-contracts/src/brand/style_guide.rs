use serde::Serialize;

use crate::form::FormInput;
use crate::i18n::Language;

use super::ai_result::GenerationOutcome;
use super::color::Rgb;
use super::deriver::{derive_brand_assets, BrandAssets, FontPair};
use super::moodboard::moodboard_urls;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleGuideColor {
    pub role: String,
    pub hex: String,
    pub rgb: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleGuideKeyword {
    pub title: String,
    pub description: String,
}

/// The result screen in one language: every bilingual pair resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleGuide {
    pub language: Language,
    pub brand_name: String,
    pub industry: Option<String>,
    pub touchpoint: Option<String>,
    pub tones: Vec<String>,
    pub strategy: String,
    pub slogan: String,
    pub mission: String,
    pub core_value: String,
    pub colors: Vec<StyleGuideColor>,
    pub fonts: FontPair,
    pub keywords: Vec<StyleGuideKeyword>,
    pub icon_style: String,
    pub moodboard: Vec<String>,
    pub degraded: bool,
}

impl BrandAssets {
    pub fn localize(
        &self,
        input: &FormInput,
        outcome: &GenerationOutcome,
        language: Language,
    ) -> StyleGuide {
        StyleGuide {
            language,
            brand_name: input.trimmed_brand_name().to_string(),
            industry: input
                .industry
                .map(|industry| industry.label(language).to_string()),
            touchpoint: input
                .touchpoint
                .map(|touchpoint| touchpoint.label(language).to_string()),
            tones: input
                .selected_tones
                .iter()
                .map(|tone| tone.label(language).to_string())
                .collect(),
            strategy: outcome.strategy.get(language).to_string(),
            slogan: self.slogan.get(language).to_string(),
            mission: self.mission.get(language).to_string(),
            core_value: self.core_value.get(language).to_string(),
            colors: self
                .colors
                .iter()
                .map(|color| StyleGuideColor {
                    role: color.role.label(language).to_string(),
                    hex: color.hex.clone(),
                    rgb: color.rgb,
                })
                .collect(),
            fonts: self.fonts.clone(),
            keywords: self
                .keywords
                .iter()
                .map(|card| StyleGuideKeyword {
                    title: card.title.get(language).to_string(),
                    description: card.description.get(language).to_string(),
                })
                .collect(),
            icon_style: self.icon_style.label(language).to_string(),
            moodboard: moodboard_urls(input),
            degraded: outcome.is_degraded(),
        }
    }
}

/// Derives and localizes in one step; recomputed on every render.
pub fn compose_style_guide(
    input: &FormInput,
    outcome: &GenerationOutcome,
    language: Language,
) -> StyleGuide {
    derive_brand_assets(input, outcome.ai.as_ref()).localize(input, outcome, language)
}
