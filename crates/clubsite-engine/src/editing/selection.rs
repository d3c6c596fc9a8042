use std::ops::Range;

use crate::markup::Directive;

/// Result of wrapping a selection: the new source and where the selection
/// now sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEdit {
    pub text: String,
    pub selection: Range<usize>,
}

/// Wraps the byte range `selection` of `text` with `left` and `right`.
///
/// The selection keeps covering the same characters afterwards. An empty
/// selection inserts `left + right` and leaves the caret between them.
/// Offsets past the end, or inside a multi-byte character, are moved back to
/// the nearest valid boundary.
pub fn wrap_selection(text: &str, selection: Range<usize>, left: &str, right: &str) -> SelectionEdit {
    let mut start = floor_boundary(text, selection.start);
    let mut end = floor_boundary(text, selection.end);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    let mut next = String::with_capacity(text.len() + left.len() + right.len());
    next.push_str(&text[..start]);
    next.push_str(left);
    next.push_str(&text[start..end]);
    next.push_str(right);
    next.push_str(&text[end..]);

    SelectionEdit {
        text: next,
        selection: start + left.len()..end + left.len(),
    }
}

/// [`wrap_selection`] with a directive's delimiters.
pub fn apply_directive(text: &str, selection: Range<usize>, directive: &Directive) -> SelectionEdit {
    let (open, close) = directive.delimiters();
    wrap_selection(text, selection, &open, &close)
}

fn floor_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
