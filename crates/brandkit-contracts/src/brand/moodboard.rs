use crate::form::FormInput;

pub const MOODBOARD_SIZE: usize = 8;
const PLACEHOLDER_BASE: &str = "https://picsum.photos/seed";
const PLACEHOLDER_DIMENSION: u32 = 600;

/// One seed per moodboard tile, cycling through the selected tones.
pub fn moodboard_seeds(input: &FormInput) -> Vec<String> {
    let brand = slug(input.trimmed_brand_name());
    let industry = input
        .industry
        .map(|industry| industry.slug())
        .unwrap_or("general");
    (0..MOODBOARD_SIZE)
        .map(|idx| {
            let tone = if input.selected_tones.is_empty() {
                "neutral".to_string()
            } else {
                input.selected_tones[idx % input.selected_tones.len()].slug()
            };
            format!("{brand}-{industry}-{tone}-{idx}")
        })
        .collect()
}

pub fn moodboard_urls(input: &FormInput) -> Vec<String> {
    moodboard_seeds(input)
        .into_iter()
        .map(|seed| {
            format!("{PLACEHOLDER_BASE}/{seed}/{PLACEHOLDER_DIMENSION}/{PLACEHOLDER_DIMENSION}")
        })
        .collect()
}

/// URL-safe seed fragment. Non-ASCII characters become their code point in
/// hex so Hangul brand names still give distinct seeds.
fn slug(raw: &str) -> String {
    let mut out = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else {
            out.push_str(&format!("u{:x}", ch as u32));
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "brand".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Industry, Tone};

    use super::*;

    #[test]
    fn seeds_cycle_tones_and_are_deterministic() {
        let input = FormInput {
            brand_name: "Blue Harbor Co.".to_string(),
            industry: Some(Industry::FoodBeverage),
            selected_tones: vec![Tone::Warm, Tone::Friendly],
            ..FormInput::default()
        };
        let seeds = moodboard_seeds(&input);
        assert_eq!(seeds.len(), MOODBOARD_SIZE);
        assert_eq!(seeds[0], "blue-harbor-co-food-beverage-warm-0");
        assert_eq!(seeds[1], "blue-harbor-co-food-beverage-friendly-1");
        assert_eq!(seeds[2], "blue-harbor-co-food-beverage-warm-2");
        assert_eq!(seeds, moodboard_seeds(&input));
        assert_eq!(
            moodboard_urls(&input)[0],
            "https://picsum.photos/seed/blue-harbor-co-food-beverage-warm-0/600/600"
        );
    }

    #[test]
    fn seeds_handle_empty_and_hangul_names() {
        let empty = moodboard_seeds(&FormInput::default());
        assert_eq!(empty[0], "brand-general-neutral-0");

        let hangul = FormInput {
            brand_name: "하루".to_string(),
            ..FormInput::default()
        };
        assert_eq!(moodboard_seeds(&hangul)[0], "ud558ub8e8-general-neutral-0");
    }
}
