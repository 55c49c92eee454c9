use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::debug;

/// Built-in palettes a page description may select with `theme`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
    Ocean,
    Sunset,
    Forest,
}

impl ThemeName {
    /// Unknown names fall back to `Light`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => ThemeName::Light,
            "dark" => ThemeName::Dark,
            "ocean" => ThemeName::Ocean,
            "sunset" => ThemeName::Sunset,
            "forest" => ThemeName::Forest,
            other => {
                debug!(theme = other, "unknown theme, using light");
                ThemeName::Light
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
            ThemeName::Ocean => "ocean",
            ThemeName::Sunset => "sunset",
            ThemeName::Forest => "forest",
        }
    }
}

/// Design tokens for one theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default, rename = "borderRadius")]
    pub border_radius: BTreeMap<String, f64>,
    #[serde(default)]
    pub fonts: BTreeMap<String, String>,
}

const PALETTES: &[(ThemeName, &[(&str, &str)])] = &[
    (
        ThemeName::Light,
        &[
            ("bg", "#ffffff"),
            ("surface", "#f8fafc"),
            ("border", "#e2e8f0"),
            ("text", "#0f172a"),
            ("muted", "#64748b"),
            ("accent", "#2563eb"),
            ("accent-text", "#ffffff"),
            ("success", "#16a34a"),
            ("warning", "#d97706"),
            ("danger", "#dc2626"),
            ("code-bg", "#0f172a"),
            ("code-text", "#e2e8f0"),
        ],
    ),
    (
        ThemeName::Dark,
        &[
            ("bg", "#09090b"),
            ("surface", "#18181b"),
            ("border", "#3f3f46"),
            ("text", "#e4e4e7"),
            ("muted", "#a1a1aa"),
            ("accent", "#f59e0b"),
            ("accent-text", "#09090b"),
            ("success", "#22c55e"),
            ("warning", "#fbbf24"),
            ("danger", "#f87171"),
            ("code-bg", "#27272a"),
            ("code-text", "#fbbf24"),
        ],
    ),
    (
        ThemeName::Ocean,
        &[
            ("bg", "#f0f9ff"),
            ("surface", "#e0f2fe"),
            ("border", "#bae6fd"),
            ("text", "#0c4a6e"),
            ("muted", "#0369a1"),
            ("accent", "#0284c7"),
            ("accent-text", "#ffffff"),
            ("success", "#059669"),
            ("warning", "#d97706"),
            ("danger", "#e11d48"),
            ("code-bg", "#082f49"),
            ("code-text", "#e0f2fe"),
        ],
    ),
    (
        ThemeName::Sunset,
        &[
            ("bg", "#fff7ed"),
            ("surface", "#ffedd5"),
            ("border", "#fed7aa"),
            ("text", "#431407"),
            ("muted", "#9a3412"),
            ("accent", "#ea580c"),
            ("accent-text", "#ffffff"),
            ("success", "#15803d"),
            ("warning", "#ca8a04"),
            ("danger", "#be123c"),
            ("code-bg", "#431407"),
            ("code-text", "#ffedd5"),
        ],
    ),
    (
        ThemeName::Forest,
        &[
            ("bg", "#f7fee7"),
            ("surface", "#ecfccb"),
            ("border", "#d9f99d"),
            ("text", "#1a2e05"),
            ("muted", "#3f6212"),
            ("accent", "#4d7c0f"),
            ("accent-text", "#ffffff"),
            ("success", "#15803d"),
            ("warning", "#a16207"),
            ("danger", "#b91c1c"),
            ("code-bg", "#1a2e05"),
            ("code-text", "#ecfccb"),
        ],
    ),
];

impl Theme {
    /// Create a new empty theme
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens for one of the built-in palettes.
    pub fn preset(name: ThemeName) -> Self {
        let mut theme = Theme::new();
        if let Some((_, palette)) = PALETTES.iter().find(|(n, _)| *n == name) {
            for (key, value) in palette.iter() {
                theme.colors.insert(key.to_string(), value.to_string());
            }
        }
        theme.border_radius.insert("sm".into(), 6.0);
        theme.border_radius.insert("md".into(), 12.0);
        theme.border_radius.insert("lg".into(), 20.0);
        theme.fonts.insert(
            "sans".into(),
            "Inter, system-ui, -apple-system, sans-serif".into(),
        );
        theme.fonts.insert(
            "mono".into(),
            "ui-monospace, SFMono-Regular, Menlo, monospace".into(),
        );
        theme
    }

    /// Overlay `other` on top of `self`. Values that are not safe CSS are
    /// skipped.
    pub fn merge(&mut self, other: &Theme) {
        for (key, value) in &other.colors {
            if is_token_key(key) && is_safe_color(value) {
                self.colors.insert(key.clone(), value.clone());
            } else {
                debug!(token = key.as_str(), "color token ignored");
            }
        }
        for (key, value) in &other.border_radius {
            if is_token_key(key) && value.is_finite() && *value >= 0.0 {
                self.border_radius.insert(key.clone(), *value);
            }
        }
        for (key, value) in &other.fonts {
            if is_token_key(key) && is_safe_font_stack(value) {
                self.fonts.insert(key.clone(), value.clone());
            }
        }
    }

    /// Resolve a theme variable reference (e.g., "$theme.colors.accent")
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let rest = reference.strip_prefix("$theme.")?;
        let (category, key) = rest.split_once('.')?;
        match category {
            "colors" => self.colors.get(key).cloned(),
            "borderRadius" => self.border_radius.get(key).map(|v| v.to_string()),
            "fonts" => self.fonts.get(key).cloned(),
            _ => None,
        }
    }

    /// Check if a string is a theme variable reference
    pub fn is_theme_reference(value: &str) -> bool {
        value.starts_with("$theme.")
    }

    fn color(&self, key: &str, fallback: &'static str) -> String {
        self.colors
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

fn is_token_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= 32 && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Strict color grammar: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
/// `rgba()`, `hsl()`, `hsla()` with numeric arguments, or `transparent`.
pub fn is_safe_color(value: &str) -> bool {
    let v = value.trim();
    if v == "transparent" {
        return true;
    }
    if let Some(hex) = v.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    for func in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(args) = v.strip_prefix(func).and_then(|r| r.strip_suffix(')')) {
            return !args.is_empty()
                && args.len() <= 48
                && args
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ' ' | '%' | '/'));
        }
    }
    false
}

fn is_safe_font_stack(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 200
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '-' | '_'))
}

/// Resolve a page-level `style.background` value: a theme reference or a
/// strictly validated color. Anything else is ignored.
pub fn resolve_background(theme: &Theme, raw: &str) -> Option<String> {
    let candidate = if Theme::is_theme_reference(raw) {
        theme.resolve(raw)?
    } else {
        raw.trim().to_string()
    };
    if is_safe_color(&candidate) {
        Some(candidate)
    } else {
        debug!("page background ignored: not a safe color");
        None
    }
}

/// Scoped stylesheet for the output root.
pub fn stylesheet_css(theme: &Theme, background: Option<&str>) -> String {
    let mut css = String::new();
    let radius = |key: &str, fallback: f64| theme.border_radius.get(key).copied().unwrap_or(fallback);
    let font = |key: &str, fallback: &str| {
        theme
            .fonts
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    let _ = write!(
        css,
        ".lp-root{{--lp-bg:{bg};--lp-surface:{surface};--lp-border:{border};--lp-text:{text};\
--lp-muted:{muted};--lp-accent:{accent};--lp-accent-text:{accent_text};--lp-success:{success};\
--lp-warning:{warning};--lp-danger:{danger};--lp-code-bg:{code_bg};--lp-code-text:{code_text};\
--lp-radius-sm:{rsm}px;--lp-radius-md:{rmd}px;--lp-radius-lg:{rlg}px;\
font-family:{sans};color:var(--lp-text);background:{page_bg};line-height:1.6;}}",
        bg = theme.color("bg", "#ffffff"),
        surface = theme.color("surface", "#f8fafc"),
        border = theme.color("border", "#e2e8f0"),
        text = theme.color("text", "#0f172a"),
        muted = theme.color("muted", "#64748b"),
        accent = theme.color("accent", "#2563eb"),
        accent_text = theme.color("accent-text", "#ffffff"),
        success = theme.color("success", "#16a34a"),
        warning = theme.color("warning", "#d97706"),
        danger = theme.color("danger", "#dc2626"),
        code_bg = theme.color("code-bg", "#0f172a"),
        code_text = theme.color("code-text", "#e2e8f0"),
        rsm = radius("sm", 6.0),
        rmd = radius("md", 12.0),
        rlg = radius("lg", 20.0),
        sans = font("sans", "system-ui, sans-serif"),
        page_bg = background.unwrap_or("var(--lp-bg)"),
    );
    let _ = write!(css, ".lp-root code,.lp-root pre{{font-family:{};}}", font("mono", "monospace"));
    css.push_str(BASE_STYLES);
    css
}

/// Design-system rules shared by every theme.
const BASE_STYLES: &str = ".lp-root *{box-sizing:border-box;}\
.lp-section{max-width:1080px;margin:0 auto;padding:48px 24px;}\
.lp-nested>.lp-section,.lp-nested .lp-section{padding:0;margin:0;max-width:none;}\
.lp-animate{animation:lp-fade-in .4s ease both;}\
@keyframes lp-fade-in{from{opacity:0;transform:translateY(8px);}to{opacity:1;transform:none;}}\
.lp-hero{text-align:left;}.lp-hero--center{text-align:center;}\
.lp-label{display:inline-block;font-size:.8rem;font-weight:600;letter-spacing:.06em;text-transform:uppercase;color:var(--lp-accent);}\
.lp-muted{color:var(--lp-muted);}\
.lp-button{display:inline-flex;align-items:center;gap:8px;padding:10px 18px;border-radius:var(--lp-radius-sm);background:var(--lp-accent);color:var(--lp-accent-text);text-decoration:none;font-weight:600;border:1px solid transparent;cursor:pointer;}\
.lp-button--secondary{background:transparent;color:var(--lp-accent);border-color:var(--lp-accent);}\
.lp-grid{display:grid;gap:24px;}\
.lp-grid--2{grid-template-columns:repeat(2,minmax(0,1fr));}\
.lp-grid--3{grid-template-columns:repeat(3,minmax(0,1fr));}\
.lp-grid--4{grid-template-columns:repeat(4,minmax(0,1fr));}\
.lp-card{background:var(--lp-surface);border:1px solid var(--lp-border);border-radius:var(--lp-radius-md);padding:24px;}\
.lp-stack{display:flex;flex-direction:column;gap:16px;}\
.lp-icon{width:24px;height:24px;display:inline-block;vertical-align:middle;}\
.lp-stat-value{font-size:2rem;font-weight:700;}\
.lp-steps,.lp-timeline{list-style:none;padding:0;margin:0;display:grid;gap:16px;}\
.lp-table{width:100%;border-collapse:collapse;}\
.lp-table th,.lp-table td{border-bottom:1px solid var(--lp-border);padding:10px 12px;text-align:left;}\
.lp-check{color:var(--lp-success);}.lp-cross{color:var(--lp-danger);}\
.lp-faq-item{border-bottom:1px solid var(--lp-border);}\
.lp-faq-trigger{width:100%;text-align:left;background:none;border:0;padding:16px 0;font:inherit;font-weight:600;cursor:pointer;color:inherit;}\
.lp-tablist{display:flex;gap:4px;border-bottom:1px solid var(--lp-border);}\
.lp-tab{background:none;border:0;padding:10px 16px;font:inherit;cursor:pointer;color:var(--lp-muted);border-bottom:2px solid transparent;}\
.lp-tab[aria-selected=\"true\"]{color:var(--lp-text);border-bottom-color:var(--lp-accent);}\
.lp-form{display:grid;gap:16px;}\
.lp-field{display:grid;gap:6px;}\
.lp-input{font:inherit;padding:10px 12px;border:1px solid var(--lp-border);border-radius:var(--lp-radius-sm);background:var(--lp-bg);color:inherit;}\
.lp-field--invalid .lp-input{border-color:var(--lp-danger);}\
.lp-field-error{color:var(--lp-danger);font-size:.875rem;}\
.lp-code{position:relative;background:var(--lp-code-bg);color:var(--lp-code-text);border-radius:var(--lp-radius-md);overflow:hidden;}\
.lp-code pre{margin:0;padding:20px;overflow-x:auto;}\
.lp-copy{position:absolute;top:8px;right:8px;}\
.lp-media{position:relative;border-radius:var(--lp-radius-md);overflow:hidden;}\
.lp-media img{display:block;width:100%;height:auto;}\
.lp-play{position:absolute;inset:0;display:flex;align-items:center;justify-content:center;pointer-events:none;}\
.lp-quote{border-left:4px solid var(--lp-accent);padding-left:20px;font-size:1.2rem;}\
.lp-callout{border-radius:var(--lp-radius-md);padding:16px 20px;border:1px solid var(--lp-border);display:flex;gap:12px;}\
.lp-callout--info{border-color:var(--lp-accent);}\
.lp-callout--success{border-color:var(--lp-success);}\
.lp-callout--warning{border-color:var(--lp-warning);}\
.lp-callout--danger{border-color:var(--lp-danger);}\
.lp-divider{border:0;border-top:1px solid var(--lp-border);margin:0;}\
.lp-image-text{display:grid;grid-template-columns:1fr 1fr;gap:32px;align-items:center;}\
.lp-image-text--reverse>:first-child{order:2;}\
@media (max-width:720px){.lp-grid--2,.lp-grid--3,.lp-grid--4,.lp-image-text{grid-template-columns:1fr;}}";
