use serde::{Deserialize, Serialize};

use crate::catalog::{Industry, Tone, Touchpoint};

/// Everything the user has entered in the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub brand_name: String,
    pub industry: Option<Industry>,
    pub touchpoint: Option<Touchpoint>,
    /// Selection order is preserved; keyword cards follow it.
    pub selected_tones: Vec<Tone>,
    pub negative_preference: String,
}

impl FormInput {
    pub fn has_tone(&self, tone: Tone) -> bool {
        self.selected_tones.contains(&tone)
    }

    pub fn trimmed_brand_name(&self) -> &str {
        self.brand_name.trim()
    }

    pub fn negative_preference(&self) -> Option<&str> {
        let trimmed = self.negative_preference.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
