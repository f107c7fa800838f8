use serde_json::{json, Map, Value};

use crate::catalog::FONT_CATALOG;
use crate::form::FormInput;
use crate::i18n::Language;

pub const SCHEMA_NAME: &str = "brand_identity";

const BILINGUAL_FIELDS: &[&str] = &["strategy", "slogan", "mission", "coreValue"];
const COLOR_FIELDS: &[&str] = &["primaryColor", "secondaryColor", "accentColor"];
const FONT_FIELDS: &[&str] = &["primaryFont", "secondaryFont"];

/// Structured-output flavor understood by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDialect {
    /// JSON Schema as used by OpenAI `response_format`.
    JsonSchema,
    /// Gemini `responseSchema` (OpenAPI subset, upper-case type names).
    Gemini,
}

pub fn build_prompt(input: &FormInput) -> String {
    let industry = input
        .industry
        .map(|industry| industry.label(Language::En))
        .unwrap_or("Unspecified");
    let touchpoint = input
        .touchpoint
        .map(|touchpoint| touchpoint.label(Language::En))
        .unwrap_or("Unspecified");
    let tones = if input.selected_tones.is_empty() {
        "None".to_string()
    } else {
        input
            .selected_tones
            .iter()
            .map(|tone| tone.label(Language::En))
            .collect::<Vec<&str>>()
            .join(", ")
    };

    let mut lines = vec![
        "You are a senior brand strategist. Design a brand identity for the brand below."
            .to_string(),
        String::new(),
        format!("Brand name: {}", input.trimmed_brand_name()),
        format!("Industry: {industry}"),
        format!("Primary touchpoint: {touchpoint}"),
        format!("Tone keywords: {tones}"),
    ];
    if let Some(avoid) = input.negative_preference() {
        lines.push(String::new());
        lines.push(format!(
            "ABSOLUTE CONSTRAINT: the user explicitly does not want the following. \
             Never include or suggest it in any field: {avoid}"
        ));
    }
    lines.extend([
        String::new(),
        "Respond with a single JSON object and nothing else.".to_string(),
        "- strategy, slogan, mission, coreValue: objects with an English \"en\" and a Korean \"ko\" string.".to_string(),
        "- primaryColor, secondaryColor, accentColor: hex colors in the form #RRGGBB.".to_string(),
        format!(
            "- primaryFont (headings) and secondaryFont (body): pick from {}.",
            FONT_CATALOG.join(", ")
        ),
        "- Keep the slogan under 12 words and the mission to one sentence.".to_string(),
    ]);
    lines.join("\n")
}

/// Schema of the expected completion payload; every field is required.
pub fn response_schema(dialect: SchemaDialect) -> Value {
    let (object, string) = match dialect {
        SchemaDialect::JsonSchema => ("object", "string"),
        SchemaDialect::Gemini => ("OBJECT", "STRING"),
    };

    let mut bilingual = json!({
        "type": object,
        "properties": {
            "en": { "type": string },
            "ko": { "type": string },
        },
        "required": ["en", "ko"],
    });
    if dialect == SchemaDialect::JsonSchema {
        bilingual["additionalProperties"] = Value::Bool(false);
    }

    let mut properties = Map::new();
    for field in BILINGUAL_FIELDS {
        properties.insert((*field).to_string(), bilingual.clone());
    }
    for field in COLOR_FIELDS {
        properties.insert(
            (*field).to_string(),
            json!({ "type": string, "description": "Hex color, #RRGGBB" }),
        );
    }
    for field in FONT_FIELDS {
        properties.insert(
            (*field).to_string(),
            json!({ "type": string, "enum": FONT_CATALOG }),
        );
    }

    let required: Vec<&str> = BILINGUAL_FIELDS
        .iter()
        .chain(COLOR_FIELDS)
        .chain(FONT_FIELDS)
        .copied()
        .collect();
    let mut schema = json!({
        "type": object,
        "properties": properties,
        "required": required,
    });
    if dialect == SchemaDialect::JsonSchema {
        schema["additionalProperties"] = Value::Bool(false);
    }
    schema
}
