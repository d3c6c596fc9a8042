use std::fmt;

use super::render::{EmitMode, emit};
use super::token::TagName;
use super::tokenizer::tokenize;

/// One CSS declaration applied at maximum specificity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDecl {
    pub property: &'static str,
    pub value: String,
}

impl StyleDecl {
    fn new(property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

impl fmt::Display for StyleDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} !important", self.property, self.value)
    }
}

/// The styles an annotated element resolves to.
///
/// `value` is the already-validated annotation value. An empty value means
/// the directive was invalid and the element stays unstyled.
pub fn styles_for(tag: TagName, value: &str) -> Vec<StyleDecl> {
    if value.is_empty() {
        return vec![];
    }
    match tag {
        TagName::Bold => vec![],
        TagName::Color => vec![StyleDecl::new("color", value)],
        TagName::Background => vec![
            StyleDecl::new("background-color", value),
            StyleDecl::new("display", "inline-block"),
            StyleDecl::new("padding", "0 4px"),
            StyleDecl::new("border-radius", "4px"),
        ],
        TagName::FontSize => vec![
            StyleDecl::new("font-size", format!("{value}px")),
            StyleDecl::new("line-height", "1.6"),
        ],
    }
}

/// Renders markup source with styles computed during emission.
///
/// Same structure as [`render_safe_html`](super::render_safe_html); elements
/// with a non-empty annotation additionally carry a `style` attribute built
/// only from validated values.
pub fn render_styled_html(input: &str) -> String {
    emit(&tokenize(input), EmitMode::Styled)
}
