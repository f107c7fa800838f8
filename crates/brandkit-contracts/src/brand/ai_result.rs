use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::canonical_font;
use crate::form::FormInput;
use crate::i18n::Bilingual;

use super::color::normalize_hex;
use super::deriver::default_strategy;

/// Structured answer from the completion service. Every field is optional;
/// whatever is missing falls back to the deterministic derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slogan: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_value: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_font: Option<String>,
}

impl AiResult {
    /// Lenient field-by-field read of a completion payload. Malformed fields
    /// (bad hex, fonts outside the catalog, blank text) are dropped rather
    /// than failing the whole result. Returns `None` for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            strategy: bilingual_field(obj, "strategy"),
            slogan: bilingual_field(obj, "slogan"),
            mission: bilingual_field(obj, "mission"),
            core_value: bilingual_field(obj, "coreValue"),
            primary_color: color_field(obj, "primaryColor"),
            secondary_color: color_field(obj, "secondaryColor"),
            accent_color: color_field(obj, "accentColor"),
            primary_font: font_field(obj, "primaryFont"),
            secondary_font: font_field(obj, "secondaryFont"),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn bilingual_field(obj: &Map<String, Value>, key: &str) -> Option<Bilingual> {
    match obj.get(key)? {
        Value::String(text) if !text.trim().is_empty() => {
            Some(Bilingual::new(text.trim(), text.trim()))
        }
        Value::Object(pair) => {
            let half = |lang: &str| {
                pair.get(lang)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string()
            };
            let text = Bilingual::new(half("en"), half("ko"));
            text.is_complete().then_some(text)
        }
        _ => None,
    }
}

fn color_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).and_then(normalize_hex)
}

fn font_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .and_then(canonical_font)
        .map(str::to_string)
}

const GENERATION_FAILURE_EN: &str =
    "We couldn't reach the strategy generator. This guide was composed from your answers instead.";
const GENERATION_FAILURE_KO: &str =
    "전략 생성에 실패했습니다. 입력하신 정보를 바탕으로 가이드를 구성했습니다.";

pub fn generation_failure_message() -> Bilingual {
    Bilingual::new(GENERATION_FAILURE_EN, GENERATION_FAILURE_KO)
}

/// What one generation attempt produced. A failed attempt still yields a
/// displayable outcome: no AI overlay and the fixed failure strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub ai: Option<AiResult>,
    pub strategy: Bilingual,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl GenerationOutcome {
    pub fn succeeded(input: &FormInput, ai: AiResult, elapsed_ms: u64) -> Self {
        let strategy = ai
            .strategy
            .clone()
            .unwrap_or_else(|| default_strategy(input));
        Self {
            ai: Some(ai),
            strategy,
            error: None,
            elapsed_ms,
        }
    }

    pub fn failed(error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            ai: None,
            strategy: generation_failure_message(),
            error: Some(error.into()),
            elapsed_ms,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
