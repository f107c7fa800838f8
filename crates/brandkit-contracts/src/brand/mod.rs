mod ai_result;
mod color;
mod deriver;
mod moodboard;
mod style_guide;

pub use ai_result::{generation_failure_message, AiResult, GenerationOutcome};
pub use color::{hex_to_rgb, hsl_to_hex, hsl_to_rgb, normalize_hex, Rgb};
pub use deriver::{
    base_hue, baseline_assets, default_strategy, derive_brand_assets, derived_palette,
    BrandAssets, BrandColor, ColorRole, FontPair, IconStyle, KeywordCard, DEFAULT_ACCENT,
    DEFAULT_HUE, MAX_KEYWORD_CARDS,
};
pub use moodboard::{moodboard_seeds, moodboard_urls, MOODBOARD_SIZE};
pub use style_guide::{compose_style_guide, StyleGuide, StyleGuideColor, StyleGuideKeyword};
