//! # Rich Text Markup
//!
//! A small inline markup language for post bodies, rendered to HTML that is
//! safe to inject verbatim.
//!
//! ## Directives
//!
//! - Bold: `{b}...{/b}`, plus the legacy shorthand `**...**`
//! - Text colour: `{c:#RRGGBB}...{/c}`
//! - Highlight: `{bg:#RRGGBB}...{/bg}`
//! - Font size: `{fs:N}...{/fs}`, clamped to 12..=28 px
//!
//! Line breaks in the source become `<br/>`.
//!
//! ## Modules
//!
//! - **`token`**: `TagName` and `RichToken`
//! - **`tokenizer`**: `tokenize()` splits source into text/open/close tokens
//! - **`render`**: stack-based emission into `data-rt-*` annotated HTML
//! - **`style`**: the style each annotation resolves to, and a single-pass
//!   renderer that writes those styles inline
//! - **`directive`**: builders the editor toolbar uses to insert directives
//!
//! ## Leniency
//!
//! Rendering never fails. Invalid directive values still emit a wrapper with
//! an empty annotation so open/close bookkeeping stays balanced, and a close
//! tag that does not match anything open is ignored.

pub mod directive;
pub mod render;
pub mod style;
pub mod token;
pub mod tokenizer;

pub use directive::Directive;
pub use render::render_safe_html;
pub use style::{StyleDecl, render_styled_html, styles_for};
pub use token::{RichToken, TagName};
pub use tokenizer::tokenize;
