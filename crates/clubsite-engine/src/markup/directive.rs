use super::render::{clamp_font_size, valid_hex_color};

/// Font sizes offered as one-click presets in the editor.
pub const FONT_SIZE_PRESETS: [u32; 6] = [12, 14, 16, 18, 22, 26];

/// Text colours offered as presets, as `(label, hex)`.
pub const COLOR_PRESETS: [(&str, &str); 5] = [
    ("purple", "#813eb6"),
    ("black", "#111827"),
    ("red", "#ef4444"),
    ("blue", "#2563eb"),
    ("green", "#16a34a"),
];

/// Highlight colours offered as presets, as `(label, hex)`.
pub const HIGHLIGHT_PRESETS: [(&str, &str); 3] = [
    ("yellow", "#fff3a3"),
    ("purple", "#e9d5ff"),
    ("grey", "#e5e7eb"),
];

/// A directive the editor can wrap around a selection.
///
/// Builders validate the user's input up front so that only well-formed
/// directives are ever written into a block's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Bold,
    Color(String),
    Highlight(String),
    FontSize(u32),
}

impl Directive {
    /// `None` unless the trimmed input is `#RRGGBB`.
    pub fn color(input: &str) -> Option<Self> {
        valid_hex_color(input.trim()).map(|hex| Self::Color(hex.to_string()))
    }

    /// `None` unless the trimmed input is `#RRGGBB`.
    pub fn highlight(input: &str) -> Option<Self> {
        valid_hex_color(input.trim()).map(|hex| Self::Highlight(hex.to_string()))
    }

    /// Rounds and clamps into 12..=28; `None` for non-numeric input.
    pub fn font_size(input: &str) -> Option<Self> {
        clamp_font_size(input).map(Self::FontSize)
    }

    /// The `(open, close)` source strings for this directive.
    pub fn delimiters(&self) -> (String, String) {
        match self {
            Self::Bold => ("{b}".to_string(), "{/b}".to_string()),
            Self::Color(hex) => (format!("{{c:{hex}}}"), "{/c}".to_string()),
            Self::Highlight(hex) => (format!("{{bg:{hex}}}"), "{/bg}".to_string()),
            Self::FontSize(px) => (format!("{{fs:{px}}}"), "{/fs}".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::render_safe_html;

    #[test]
    fn color_requires_full_hex() {
        assert_eq!(
            Directive::color(" #813EB6 "),
            Some(Directive::Color("#813EB6".to_string()))
        );
        assert_eq!(Directive::color("purple"), None);
        assert_eq!(Directive::highlight("#fff"), None);
    }

    #[test]
    fn font_size_is_clamped() {
        assert_eq!(Directive::font_size("40"), Some(Directive::FontSize(28)));
        assert_eq!(Directive::font_size("x"), None);
    }

    #[test]
    fn delimiters_render_as_intended() {
        for preset in FONT_SIZE_PRESETS {
            let (open, close) = Directive::FontSize(preset).delimiters();
            let html = render_safe_html(&format!("{open}x{close}"));
            assert_eq!(html, format!(r#"<span data-rt-fs="{preset}">x</span>"#));
        }
    }

    #[test]
    fn presets_are_valid_colors() {
        for (_, hex) in COLOR_PRESETS.iter().chain(HIGHLIGHT_PRESETS.iter()) {
            assert!(Directive::color(hex).is_some(), "{hex}");
        }
    }
}
