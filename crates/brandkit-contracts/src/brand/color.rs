use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// HSL with hue in degrees and saturation/lightness in percent. Out of range
/// inputs are wrapped (hue) or clamped (saturation, lightness).
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let h = hue.rem_euclid(360.0);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: channel(r1),
        g: channel(g1),
        b: channel(b1),
    }
}

pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    hsl_to_rgb(hue, saturation, lightness).to_hex()
}

/// Decodes `#RRGGBB` or `#RGB` (the `#` is optional).
pub fn hex_to_rgb(raw: &str) -> Option<Rgb> {
    let digits = raw.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|ch| [ch, ch]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    if !expanded.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |idx: usize| u8::from_str_radix(&expanded[idx..idx + 2], 16).ok();
    Some(Rgb {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
    })
}

/// Canonical uppercase `#RRGGBB`, or `None` when `raw` is not a hex color.
pub fn normalize_hex(raw: &str) -> Option<String> {
    hex_to_rgb(raw).map(Rgb::to_hex)
}
