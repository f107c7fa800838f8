use serde::{Deserialize, Serialize};

use crate::i18n::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Industry {
    Technology,
    Healthcare,
    Finance,
    FoodBeverage,
    Fashion,
    Education,
    Beauty,
    RealEstate,
    Entertainment,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 10] = [
        Industry::Technology,
        Industry::Healthcare,
        Industry::Finance,
        Industry::FoodBeverage,
        Industry::Fashion,
        Industry::Education,
        Industry::Beauty,
        Industry::RealEstate,
        Industry::Entertainment,
        Industry::Other,
    ];

    pub fn label(self, language: Language) -> &'static str {
        let (en, ko) = match self {
            Industry::Technology => ("Technology", "기술/IT"),
            Industry::Healthcare => ("Healthcare", "헬스케어"),
            Industry::Finance => ("Finance", "금융"),
            Industry::FoodBeverage => ("Food & Beverage", "식음료"),
            Industry::Fashion => ("Fashion", "패션"),
            Industry::Education => ("Education", "교육"),
            Industry::Beauty => ("Beauty", "뷰티"),
            Industry::RealEstate => ("Real Estate", "부동산"),
            Industry::Entertainment => ("Entertainment", "엔터테인먼트"),
            Industry::Other => ("Other", "기타"),
        };
        match language {
            Language::En => en,
            Language::Ko => ko,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Industry::Technology => "technology",
            Industry::Healthcare => "healthcare",
            Industry::Finance => "finance",
            Industry::FoodBeverage => "food-beverage",
            Industry::Fashion => "fashion",
            Industry::Education => "education",
            Industry::Beauty => "beauty",
            Industry::RealEstate => "real-estate",
            Industry::Entertainment => "entertainment",
            Industry::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = normalize_label(raw);
        Industry::ALL.into_iter().find(|industry| {
            needle == industry.slug()
                || Language::ALL
                    .into_iter()
                    .any(|language| needle == normalize_label(industry.label(language)))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Touchpoint {
    MobileApp,
    Website,
    PhysicalStore,
    Packaging,
    SocialMedia,
    Print,
}

impl Touchpoint {
    pub const ALL: [Touchpoint; 6] = [
        Touchpoint::MobileApp,
        Touchpoint::Website,
        Touchpoint::PhysicalStore,
        Touchpoint::Packaging,
        Touchpoint::SocialMedia,
        Touchpoint::Print,
    ];

    pub fn label(self, language: Language) -> &'static str {
        let (en, ko) = match self {
            Touchpoint::MobileApp => ("Mobile App", "모바일 앱"),
            Touchpoint::Website => ("Website", "웹사이트"),
            Touchpoint::PhysicalStore => ("Physical Store", "오프라인 매장"),
            Touchpoint::Packaging => ("Packaging", "패키지"),
            Touchpoint::SocialMedia => ("Social Media", "소셜 미디어"),
            Touchpoint::Print => ("Print", "인쇄물"),
        };
        match language {
            Language::En => en,
            Language::Ko => ko,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Touchpoint::MobileApp => "mobile-app",
            Touchpoint::Website => "website",
            Touchpoint::PhysicalStore => "physical-store",
            Touchpoint::Packaging => "packaging",
            Touchpoint::SocialMedia => "social-media",
            Touchpoint::Print => "print",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = normalize_label(raw);
        Touchpoint::ALL.into_iter().find(|touchpoint| {
            needle == touchpoint.slug()
                || Language::ALL
                    .into_iter()
                    .any(|language| needle == normalize_label(touchpoint.label(language)))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToneCategory {
    Vibe,
    Voice,
    Concept,
}

impl ToneCategory {
    pub const ALL: [ToneCategory; 3] = [ToneCategory::Vibe, ToneCategory::Voice, ToneCategory::Concept];

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (ToneCategory::Vibe, Language::En) => "Vibe",
            (ToneCategory::Vibe, Language::Ko) => "분위기",
            (ToneCategory::Voice, Language::En) => "Voice",
            (ToneCategory::Voice, Language::Ko) => "말투",
            (ToneCategory::Concept, Language::En) => "Concept",
            (ToneCategory::Concept, Language::Ko) => "콘셉트",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tone {
    Minimal,
    Bold,
    Warm,
    Playful,
    Elegant,
    Friendly,
    Professional,
    Witty,
    Calm,
    Confident,
    Innovative,
    Premium,
    Sustainable,
    Classic,
    Trustworthy,
}

impl Tone {
    pub fn label(self, language: Language) -> &'static str {
        let (en, ko) = match self {
            Tone::Minimal => ("Minimal", "미니멀"),
            Tone::Bold => ("Bold", "대담한"),
            Tone::Warm => ("Warm", "따뜻한"),
            Tone::Playful => ("Playful", "유쾌한"),
            Tone::Elegant => ("Elegant", "우아한"),
            Tone::Friendly => ("Friendly", "친근한"),
            Tone::Professional => ("Professional", "전문적인"),
            Tone::Witty => ("Witty", "위트 있는"),
            Tone::Calm => ("Calm", "차분한"),
            Tone::Confident => ("Confident", "자신감 있는"),
            Tone::Innovative => ("Innovative", "혁신적인"),
            Tone::Premium => ("Premium", "프리미엄"),
            Tone::Sustainable => ("Sustainable", "지속 가능한"),
            Tone::Classic => ("Classic", "클래식"),
            Tone::Trustworthy => ("Trustworthy", "신뢰할 수 있는"),
        };
        match language {
            Language::En => en,
            Language::Ko => ko,
        }
    }

    /// Lowercase English label, used in seeds and command arguments.
    pub fn slug(self) -> String {
        self.label(Language::En).to_ascii_lowercase()
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = normalize_label(raw);
        TONE_TABLE.tones().find(|tone| {
            Language::ALL
                .into_iter()
                .any(|language| needle == normalize_label(tone.label(language)))
        })
    }
}

/// Tone to category assignment. Validation takes the table as an argument so
/// the per-category cap can be exercised against any grouping.
#[derive(Debug, Clone, Copy)]
pub struct ToneTable {
    entries: &'static [(Tone, ToneCategory)],
}

impl ToneTable {
    pub const fn new(entries: &'static [(Tone, ToneCategory)]) -> Self {
        Self { entries }
    }

    pub fn category_of(&self, tone: Tone) -> Option<ToneCategory> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == tone)
            .map(|(_, category)| *category)
    }

    pub fn tones(&self) -> impl Iterator<Item = Tone> {
        self.entries.iter().map(|(tone, _)| *tone)
    }

    pub fn tones_in(&self, category: ToneCategory) -> impl Iterator<Item = Tone> {
        self.entries
            .iter()
            .filter(move |(_, candidate)| *candidate == category)
            .map(|(tone, _)| *tone)
    }
}

pub const TONE_TABLE: ToneTable = ToneTable::new(&[
    (Tone::Minimal, ToneCategory::Vibe),
    (Tone::Bold, ToneCategory::Vibe),
    (Tone::Warm, ToneCategory::Vibe),
    (Tone::Playful, ToneCategory::Vibe),
    (Tone::Elegant, ToneCategory::Vibe),
    (Tone::Friendly, ToneCategory::Voice),
    (Tone::Professional, ToneCategory::Voice),
    (Tone::Witty, ToneCategory::Voice),
    (Tone::Calm, ToneCategory::Voice),
    (Tone::Confident, ToneCategory::Voice),
    (Tone::Innovative, ToneCategory::Concept),
    (Tone::Premium, ToneCategory::Concept),
    (Tone::Sustainable, ToneCategory::Concept),
    (Tone::Classic, ToneCategory::Concept),
    (Tone::Trustworthy, ToneCategory::Concept),
]);

pub const MAX_TONES_PER_CATEGORY: usize = 2;

pub const BASELINE_FONT: &str = "Pretendard";

pub const FONT_CATALOG: &[&str] = &[
    "Pretendard",
    "Noto Sans KR",
    "Noto Serif KR",
    "Nanum Myeongjo",
    "Inter",
    "Montserrat",
    "Playfair Display",
    "Poppins",
    "Lato",
    "Roboto",
];

/// Catalog spelling of `raw`, matched case-insensitively.
pub fn canonical_font(raw: &str) -> Option<&'static str> {
    let needle = normalize_label(raw);
    FONT_CATALOG
        .iter()
        .copied()
        .find(|font| normalize_label(font) == needle)
}

fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn industry_parse_accepts_labels_slugs_and_korean() {
        assert_eq!(Industry::parse("healthcare"), Some(Industry::Healthcare));
        assert_eq!(Industry::parse("Food  &  Beverage"), Some(Industry::FoodBeverage));
        assert_eq!(Industry::parse("food-beverage"), Some(Industry::FoodBeverage));
        assert_eq!(Industry::parse("패션"), Some(Industry::Fashion));
        assert_eq!(Industry::parse("space mining"), None);
    }

    #[test]
    fn touchpoint_parse_accepts_labels_and_slugs() {
        assert_eq!(Touchpoint::parse("Mobile App"), Some(Touchpoint::MobileApp));
        assert_eq!(Touchpoint::parse("physical-store"), Some(Touchpoint::PhysicalStore));
        assert_eq!(Touchpoint::parse("웹사이트"), Some(Touchpoint::Website));
    }

    #[test]
    fn every_tone_belongs_to_exactly_one_category() {
        for tone in TONE_TABLE.tones() {
            let matches = ToneCategory::ALL
                .into_iter()
                .filter(|category| TONE_TABLE.tones_in(*category).any(|item| item == tone))
                .count();
            assert_eq!(matches, 1, "{tone:?}");
        }
        assert_eq!(TONE_TABLE.category_of(Tone::Premium), Some(ToneCategory::Concept));
        assert_eq!(TONE_TABLE.category_of(Tone::Minimal), Some(ToneCategory::Vibe));
    }

    #[test]
    fn tone_parse_matches_either_language() {
        assert_eq!(Tone::parse("minimal"), Some(Tone::Minimal));
        assert_eq!(Tone::parse("위트 있는"), Some(Tone::Witty));
        assert_eq!(Tone::parse("grumpy"), None);
    }

    #[test]
    fn canonical_font_normalizes_case_and_spacing() {
        assert_eq!(canonical_font("playfair  display"), Some("Playfair Display"));
        assert_eq!(canonical_font("Comic Sans"), None);
        assert!(FONT_CATALOG.contains(&BASELINE_FONT));
    }
}
