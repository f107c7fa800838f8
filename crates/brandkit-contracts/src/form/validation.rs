use std::fmt;

use crate::catalog::{Tone, ToneCategory, ToneTable};
use crate::i18n::{Bilingual, Language};

use super::input::FormInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    BrandName,
    Industry,
    Touchpoint,
}

impl RequiredField {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (RequiredField::BrandName, Language::En) => "brand name",
            (RequiredField::BrandName, Language::Ko) => "브랜드 이름",
            (RequiredField::Industry, Language::En) => "industry",
            (RequiredField::Industry, Language::Ko) => "산업군",
            (RequiredField::Touchpoint, Language::En) => "touchpoint",
            (RequiredField::Touchpoint, Language::Ko) => "접점",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields(Vec<RequiredField>),
    NoToneSelected,
    CategoryLimit {
        tone: Tone,
        category: ToneCategory,
        limit: usize,
    },
    UnknownTone(Tone),
}

impl ValidationError {
    pub fn message(&self) -> Bilingual {
        match self {
            ValidationError::MissingFields(fields) => {
                let join = |language: Language| {
                    fields
                        .iter()
                        .map(|field| field.label(language))
                        .collect::<Vec<&str>>()
                        .join(", ")
                };
                Bilingual::new(
                    format!("Please fill in: {}.", join(Language::En)),
                    format!("다음 항목을 입력해 주세요: {}.", join(Language::Ko)),
                )
            }
            ValidationError::NoToneSelected => Bilingual::new(
                "Select at least one tone keyword.",
                "톤 키워드를 하나 이상 선택해 주세요.",
            ),
            ValidationError::CategoryLimit {
                category, limit, ..
            } => Bilingual::new(
                format!(
                    "You can pick up to {limit} keywords in {}.",
                    category.label(Language::En)
                ),
                format!(
                    "{} 카테고리는 최대 {limit}개까지 선택할 수 있습니다.",
                    category.label(Language::Ko)
                ),
            ),
            ValidationError::UnknownTone(tone) => Bilingual::new(
                format!("'{}' is not an available tone.", tone.label(Language::En)),
                format!("'{}' 톤은 선택할 수 없습니다.", tone.label(Language::Ko)),
            ),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message().en)
    }
}

impl std::error::Error for ValidationError {}

/// Step 1 completeness: brand name (non-blank), industry and touchpoint.
pub fn validate_details(input: &FormInput) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    if input.trimmed_brand_name().is_empty() {
        missing.push(RequiredField::BrandName);
    }
    if input.industry.is_none() {
        missing.push(RequiredField::Industry);
    }
    if input.touchpoint.is_none() {
        missing.push(RequiredField::Touchpoint);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

pub fn validate_tones(input: &FormInput) -> Result<(), ValidationError> {
    if input.selected_tones.is_empty() {
        return Err(ValidationError::NoToneSelected);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneToggle {
    Selected,
    Deselected,
}

/// Toggles `tone` in `selected`. Deselecting always succeeds; selecting is
/// refused once the tone's category already holds `limit` entries.
pub fn toggle_tone(
    table: &ToneTable,
    limit: usize,
    selected: &mut Vec<Tone>,
    tone: Tone,
) -> Result<ToneToggle, ValidationError> {
    if let Some(position) = selected.iter().position(|item| *item == tone) {
        selected.remove(position);
        return Ok(ToneToggle::Deselected);
    }

    let Some(category) = table.category_of(tone) else {
        return Err(ValidationError::UnknownTone(tone));
    };
    let in_category = selected
        .iter()
        .filter(|item| table.category_of(**item) == Some(category))
        .count();
    if in_category >= limit {
        return Err(ValidationError::CategoryLimit {
            tone,
            category,
            limit,
        });
    }
    selected.push(tone);
    Ok(ToneToggle::Selected)
}
