use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use brandkit_contracts::brand::{compose_style_guide, StyleGuide, StyleGuideColor};
use brandkit_contracts::catalog::ToneCategory;
use brandkit_contracts::form::{FormController, FormStep, View};
use brandkit_contracts::i18n::Language;
use image::{Rgb, RgbImage};

const SWATCH_WIDTH: u32 = 160;
const SWATCH_HEIGHT: u32 = 120;

#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
    pub palette: PathBuf,
}

fn pick(language: Language, en: &'static str, ko: &'static str) -> &'static str {
    match language {
        Language::En => en,
        Language::Ko => ko,
    }
}

/// Terminal rendering of whatever the controller is showing right now.
pub fn render_view(controller: &FormController, now: Instant) -> String {
    let language = controller.language();
    let mut out = match controller.view() {
        View::Landing => render_landing(language),
        View::Form { step, input } => {
            let mut lines = vec![format!(
                "{} {}/3",
                pick(language, "Step", "단계"),
                step.number()
            )];
            let unset = pick(language, "(not set)", "(미입력)");
            match step {
                FormStep::Details => {
                    let name = input.trimmed_brand_name();
                    lines.push(format!(
                        "  {}: {}",
                        pick(language, "Brand name", "브랜드 이름"),
                        if name.is_empty() { unset } else { name }
                    ));
                    lines.push(format!(
                        "  {}: {}",
                        pick(language, "Industry", "산업군"),
                        input
                            .industry
                            .map(|industry| industry.label(language))
                            .unwrap_or(unset)
                    ));
                    lines.push(format!(
                        "  {}: {}",
                        pick(language, "Touchpoint", "접점"),
                        input
                            .touchpoint
                            .map(|touchpoint| touchpoint.label(language))
                            .unwrap_or(unset)
                    ));
                    lines.push("  /name /industry /touchpoint, then /next".to_string());
                }
                FormStep::Tones => {
                    let table = controller.tone_table();
                    for category in ToneCategory::ALL {
                        let tones: Vec<String> = table
                            .tones_in(category)
                            .map(|tone| {
                                let mark = if input.has_tone(tone) { "[x]" } else { "[ ]" };
                                format!("{mark} {}", tone.label(language))
                            })
                            .collect();
                        lines.push(format!("  {}: {}", category.label(language), tones.join("  ")));
                    }
                    lines.push("  /tone <tone> to toggle, then /next".to_string());
                }
                FormStep::Constraints => {
                    lines.push(format!(
                        "  {}: {}",
                        pick(language, "Avoid", "피하고 싶은 것"),
                        input.negative_preference().unwrap_or(unset)
                    ));
                    lines.push("  /avoid <text>, then /generate".to_string());
                }
            }
            lines.join("\n")
        }
        View::Loading { status_index, .. } => {
            brandkit_contracts::form::loading_message(*status_index)
                .get(language)
                .to_string()
        }
        View::Result { input, outcome } => {
            render_style_guide(&compose_style_guide(input, outcome, language))
        }
    };
    if let Some(notice) = controller.notice_at(now) {
        out.push_str(&format!("\n! {}", notice.error.message().get(language)));
    }
    out
}

fn render_landing(language: Language) -> String {
    match language {
        Language::En => "Brandkit: answer three short steps and get a brand style guide.\nType /start to begin, /lang to switch language.".to_string(),
        Language::Ko => "Brandkit: 세 단계의 질문에 답하면 브랜드 스타일 가이드를 만들어 드립니다.\n/start 로 시작하고 /lang 으로 언어를 바꿀 수 있습니다.".to_string(),
    }
}

pub fn render_style_guide(guide: &StyleGuide) -> String {
    let language = guide.language;
    let mut lines = vec![format!("== {} ==", guide.brand_name)];
    if guide.degraded {
        lines.push(format!("! {}", guide.strategy));
    } else {
        lines.push(guide.strategy.clone());
    }
    lines.push(String::new());
    lines.push(format!("{}: {}", pick(language, "Slogan", "슬로건"), guide.slogan));
    lines.push(format!("{}: {}", pick(language, "Mission", "미션"), guide.mission));
    lines.push(format!(
        "{}: {}",
        pick(language, "Core value", "핵심 가치"),
        guide.core_value
    ));
    lines.push(String::new());
    for color in &guide.colors {
        lines.push(format!("  {:<12} {}  {}", color.role, color.hex, color.rgb.css()));
    }
    lines.push(format!(
        "{}: {} / {}",
        pick(language, "Fonts", "서체"),
        guide.fonts.heading,
        guide.fonts.body
    ));
    lines.push(format!(
        "{}: {}",
        pick(language, "Icon style", "아이콘 스타일"),
        guide.icon_style
    ));
    for keyword in &guide.keywords {
        lines.push(format!("  * {}: {}", keyword.title, keyword.description));
    }
    lines.push(format!(
        "{}: {}",
        pick(language, "Moodboard", "무드보드"),
        guide.moodboard.len()
    ));
    lines.join("\n")
}

/// Writes `style-guide.json`, `palette.png` and `style-guide.html` into `dir`.
pub fn export_style_guide(dir: &Path, guide: &StyleGuide) -> Result<ExportPaths> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let paths = ExportPaths {
        json: dir.join("style-guide.json"),
        html: dir.join("style-guide.html"),
        palette: dir.join("palette.png"),
    };

    fs::write(&paths.json, serde_json::to_string_pretty(guide)?)
        .with_context(|| format!("writing {}", paths.json.display()))?;
    write_palette_png(&paths.palette, &guide.colors)?;
    let swatch = read_image_as_data_url(&paths.palette)?;
    fs::write(&paths.html, style_guide_html(guide, Some(&swatch)))
        .with_context(|| format!("writing {}", paths.html.display()))?;
    Ok(paths)
}

pub fn write_palette_png(path: &Path, colors: &[StyleGuideColor]) -> Result<()> {
    let count = colors.len().max(1) as u32;
    let mut image = RgbImage::new(SWATCH_WIDTH * count, SWATCH_HEIGHT);
    for (x, _, pixel) in image.enumerate_pixels_mut() {
        let band = (x / SWATCH_WIDTH) as usize;
        if let Some(color) = colors.get(band) {
            *pixel = Rgb([color.rgb.r, color.rgb.g, color.rgb.b]);
        }
    }
    image
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(())
}

fn read_image_as_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
}

pub fn style_guide_html(guide: &StyleGuide, swatch_data_url: Option<&str>) -> String {
    let language = guide.language;
    let colors: String = guide
        .colors
        .iter()
        .map(|color| {
            format!(
                "<div class='color'><div class='chip' style='background:{hex}'></div><div class='role'>{role}</div><div class='hex'>{hex}</div><div class='rgb'>{rgb}</div></div>",
                hex = escape_html(&color.hex),
                role = escape_html(&color.role),
                rgb = escape_html(&color.rgb.css()),
            )
        })
        .collect();
    let keywords: String = guide
        .keywords
        .iter()
        .map(|keyword| {
            format!(
                "<div class='card'><h3>{}</h3><p>{}</p></div>",
                escape_html(&keyword.title),
                escape_html(&keyword.description)
            )
        })
        .collect();
    let moodboard: String = guide
        .moodboard
        .iter()
        .map(|url| format!("<img src='{}' alt='moodboard' loading='lazy'>", escape_html(url)))
        .collect();
    let swatch = swatch_data_url
        .map(|src| format!("<img class='swatch' src='{}' alt='palette'>", escape_html(src)))
        .unwrap_or_default();
    let notice_class = if guide.degraded { "strategy degraded" } else { "strategy" };

    format!(
        "<!doctype html>\n<html lang='{lang}'>\n<head>\n  <meta charset='utf-8'>\n  <title>{title}</title>\n  <style>\n    body {{ font-family: '{body_font}', Arial, sans-serif; margin: 0; padding: 32px; background: #fafafa; color: #222; }}\n    h1, h2 {{ font-family: '{heading_font}', Arial, sans-serif; }}\n    .strategy {{ font-size: 18px; max-width: 720px; }}\n    .degraded {{ color: #8a5a00; }}\n    .colors, .cards {{ display: flex; gap: 16px; flex-wrap: wrap; }}\n    .chip {{ width: 120px; height: 80px; border-radius: 8px; border: 1px solid #ddd; }}\n    .card {{ background: white; border-radius: 10px; padding: 12px; width: 200px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }}\n    .moodboard {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 8px; }}\n    .moodboard img {{ width: 100%; }}\n  </style>\n</head>\n<body>\n  <h1>{title}</h1>\n  <p class='{notice_class}'>{strategy}</p>\n  <h2>{slogan_label}</h2>\n  <p>{slogan}</p>\n  <h2>{mission_label}</h2>\n  <p>{mission}</p>\n  <h2>{core_label}</h2>\n  <p>{core_value}</p>\n  <h2>{color_label}</h2>\n  <div class='colors'>{colors}</div>\n  {swatch}\n  <h2>{font_label}</h2>\n  <p>{heading_font} / {body_font}</p>\n  <h2>{icon_label}</h2>\n  <p>{icon_style}</p>\n  <h2>{keyword_label}</h2>\n  <div class='cards'>{keywords}</div>\n  <h2>{mood_label}</h2>\n  <div class='moodboard'>{moodboard}</div>\n</body>\n</html>\n",
        lang = language.code(),
        title = escape_html(&guide.brand_name),
        strategy = escape_html(&guide.strategy),
        slogan = escape_html(&guide.slogan),
        mission = escape_html(&guide.mission),
        core_value = escape_html(&guide.core_value),
        heading_font = escape_html(&guide.fonts.heading),
        body_font = escape_html(&guide.fonts.body),
        icon_style = escape_html(&guide.icon_style),
        slogan_label = pick(language, "Slogan", "슬로건"),
        mission_label = pick(language, "Mission", "미션"),
        core_label = pick(language, "Core Value", "핵심 가치"),
        color_label = pick(language, "Colors", "컬러"),
        font_label = pick(language, "Typography", "타이포그래피"),
        icon_label = pick(language, "Icon Style", "아이콘 스타일"),
        keyword_label = pick(language, "Tone of Voice", "톤 앤 보이스"),
        mood_label = pick(language, "Moodboard", "무드보드"),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use brandkit_contracts::brand::GenerationOutcome;
    use brandkit_contracts::catalog::{Industry, Tone, Touchpoint};
    use brandkit_contracts::form::FormInput;
    use serde_json::Value;

    use super::*;

    fn guide(language: Language) -> StyleGuide {
        let input = FormInput {
            brand_name: "Fig & <Thistle>".to_string(),
            industry: Some(Industry::Fashion),
            touchpoint: Some(Touchpoint::SocialMedia),
            selected_tones: vec![Tone::Bold, Tone::Witty],
            negative_preference: String::new(),
        };
        compose_style_guide(&input, &GenerationOutcome::failed("offline", 3000), language)
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn html_escapes_user_text_and_sets_language() {
        let html = style_guide_html(&guide(Language::Ko), None);
        assert!(html.contains("<html lang='ko'>"));
        assert!(html.contains("Fig &amp; &lt;Thistle&gt;"));
        assert!(!html.contains("<Thistle>"));
        assert!(html.contains("슬로건"));
        assert_eq!(html.matches("alt='moodboard'").count(), 8);
    }

    #[test]
    fn export_writes_all_three_files() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let guide = guide(Language::En);
        let paths = export_style_guide(&temp.path().join("out"), &guide)?;

        let json: Value = serde_json::from_str(&fs::read_to_string(&paths.json)?)?;
        assert_eq!(json["brand_name"], Value::String("Fig & <Thistle>".to_string()));
        assert_eq!(json["colors"].as_array().map(Vec::len), Some(3));

        let palette = image::open(&paths.palette)?.to_rgb8();
        assert_eq!(palette.dimensions(), (SWATCH_WIDTH * 3, SWATCH_HEIGHT));
        let first = guide.colors[0].rgb;
        assert_eq!(palette.get_pixel(0, 0).0, [first.r, first.g, first.b]);
        let accent = guide.colors[2].rgb;
        assert_eq!(
            palette.get_pixel(SWATCH_WIDTH * 2 + 5, 10).0,
            [accent.r, accent.g, accent.b]
        );

        let html = fs::read_to_string(&paths.html)?;
        assert!(html.contains("src='data:image/png;base64,"));
        Ok(())
    }

    #[test]
    fn terminal_guide_flags_degraded_strategy() {
        let text = render_style_guide(&guide(Language::En));
        assert!(text.starts_with("== Fig & <Thistle> =="));
        assert!(text.contains("! We couldn't reach the strategy generator."));
        assert!(text.contains("Fonts: Pretendard / Pretendard"));
    }

    #[test]
    fn form_view_lists_tones_by_category() -> anyhow::Result<()> {
        let mut controller = FormController::new();
        controller.start()?;
        controller.set_brand_name("Fig")?;
        controller.set_industry(Industry::Fashion)?;
        controller.set_touchpoint(Touchpoint::Print)?;
        controller.next()?;
        controller.toggle_tone(Tone::Calm)?;

        let text = render_view(&controller, Instant::now());
        assert!(text.starts_with("Step 2/3"));
        assert!(text.contains("[x] Calm"));
        assert!(text.contains("[ ] Minimal"));
        Ok(())
    }
}
