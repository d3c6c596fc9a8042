use html_escape::{encode_double_quoted_attribute, encode_quoted_attribute};

use super::style::styles_for;
use super::token::{RichToken, TagName};
use super::tokenizer::tokenize;

/// Smallest font size a `{fs:N}` directive may produce, in px.
pub const MIN_FONT_SIZE: u32 = 12;
/// Largest font size a `{fs:N}` directive may produce, in px.
pub const MAX_FONT_SIZE: u32 = 28;

/// Renders markup source to HTML that is safe to inject verbatim.
///
/// The output only ever contains `<strong>`, `<span>` with one of
/// `data-rt-color`, `data-rt-bg`, `data-rt-fs`, escaped text and `<br/>`.
/// Styling is left to a consumer that reads the `data-rt-*` annotations; see
/// [`render_styled_html`](super::render_styled_html) for output with the
/// styles already inlined.
pub fn render_safe_html(input: &str) -> String {
    emit(&tokenize(input), EmitMode::Annotated)
}

/// Returns `value` if it is exactly `#RRGGBB`.
pub fn valid_hex_color(value: &str) -> Option<&str> {
    let hex = value.strip_prefix('#')?;
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(value)
    } else {
        None
    }
}

/// Parses a font size, rounds it and clamps it into
/// `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
///
/// Accepts decimals, exponents and unsigned `0x`/`0o`/`0b` integers; blank input
/// reads as zero. Returns `None` for anything that is not a finite number.
pub fn clamp_font_size(value: &str) -> Option<u32> {
    let n = parse_js_number(value)?;
    if !n.is_finite() {
        return None;
    }
    // Halves round up, including negative ones.
    let rounded = (n + 0.5).floor();
    Some(rounded.clamp(MIN_FONT_SIZE as f64, MAX_FONT_SIZE as f64) as u32)
}

fn parse_js_number(value: &str) -> Option<f64> {
    let s = value.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    match radix {
        Some(radix) => parse_radix_digits(&s[2..], radix),
        None => s.parse::<f64>().ok(),
    }
}

/// Unsigned digits only. Values past `u64` keep growing as `f64`.
fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}

/// Validates a raw directive value for `tag`.
///
/// `Bold` never carries a value. An invalid value yields `None`, which renders
/// as an empty annotation.
pub fn validated_value(tag: TagName, raw: Option<&str>) -> Option<String> {
    match tag {
        TagName::Bold => None,
        TagName::Color | TagName::Background => {
            raw.and_then(valid_hex_color).map(str::to_string)
        }
        TagName::FontSize => raw.and_then(clamp_font_size).map(|n| n.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmitMode {
    /// `data-rt-*` annotations only.
    Annotated,
    /// Annotations plus an inline `style` attribute for non-empty values.
    Styled,
}

pub(crate) fn emit(tokens: &[RichToken], mode: EmitMode) -> String {
    let mut html = String::new();
    let mut stack: Vec<TagName> = Vec::new();

    for token in tokens {
        match token {
            RichToken::Text(value) => {
                html.push_str(&encode_quoted_attribute(value).replace('\n', "<br/>"));
            }
            RichToken::Open { tag, value } => {
                open_tag(&mut html, *tag, value.as_deref(), mode);
                stack.push(*tag);
            }
            RichToken::Close(tag) => {
                // Closes everything opened after the most recent `tag`, too.
                let Some(idx) = stack.iter().rposition(|t| t == tag) else {
                    continue;
                };
                while stack.len() > idx {
                    if let Some(open) = stack.pop() {
                        html.push_str(open.closing_html());
                    }
                }
            }
        }
    }

    while let Some(open) = stack.pop() {
        html.push_str(open.closing_html());
    }

    html
}

fn open_tag(html: &mut String, tag: TagName, raw: Option<&str>, mode: EmitMode) {
    let Some(attribute) = tag.data_attribute() else {
        html.push_str("<strong>");
        return;
    };

    let value = validated_value(tag, raw).unwrap_or_default();
    html.push_str("<span ");
    html.push_str(attribute);
    html.push_str("=\"");
    html.push_str(&encode_double_quoted_attribute(&value));
    html.push('"');

    if mode == EmitMode::Styled && !value.is_empty() {
        let style = styles_for(tag, &value)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        html.push_str(" style=\"");
        html.push_str(&encode_double_quoted_attribute(&style));
        html.push('"');
    }

    html.push('>');
}
