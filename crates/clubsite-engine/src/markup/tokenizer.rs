use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use super::token::{RichToken, TagName};

fn legacy_bold_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\*\*([^\n\r\x{2028}\x{2029}]+?)\*\*").expect("Invalid legacy bold regex")
    })
}

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{/?(?:c|bg|fs|b)(?::[^}]+)?\}").expect("Invalid directive regex")
    })
}

fn open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\{(c|bg|fs|b)(?::([^}]+))?\}$").expect("Invalid open regex"))
}

fn close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\{/(c|bg|fs|b)\}$").expect("Invalid close regex"))
}

/// Rewrites the legacy `**bold**` shorthand into `{b}bold{/b}`.
///
/// Single pass, shortest match, no nesting. `**a **b** c**` does not nest.
/// A match never spans a line break (`\n`, `\r`, U+2028 or U+2029).
pub fn rewrite_legacy_bold(input: &str) -> Cow<'_, str> {
    legacy_bold_regex().replace_all(input, "{b}${1}{/b}")
}

/// Splits markup source into tokens.
///
/// Every fragment is either literal text or exactly one directive. Text is
/// returned unescaped; escaping happens at emission.
pub fn tokenize(input: &str) -> Vec<RichToken> {
    let normalized = rewrite_legacy_bold(input);
    let s = normalized.as_ref();

    let mut tokens = Vec::new();
    let mut last = 0;
    for m in directive_regex().find_iter(s) {
        push_fragment(&mut tokens, &s[last..m.start()]);
        push_fragment(&mut tokens, m.as_str());
        last = m.end();
    }
    push_fragment(&mut tokens, &s[last..]);
    tokens
}

fn push_fragment(tokens: &mut Vec<RichToken>, part: &str) {
    if part.is_empty() {
        return;
    }
    tokens.push(classify(part));
}

fn classify(part: &str) -> RichToken {
    if let Some(caps) = open_regex().captures(part)
        && let Some(tag) = TagName::from_name(&caps[1])
    {
        return RichToken::Open {
            tag,
            value: caps.get(2).map(|v| v.as_str().to_string()),
        };
    }
    if let Some(caps) = close_regex().captures(part)
        && let Some(tag) = TagName::from_name(&caps[1])
    {
        return RichToken::Close(tag);
    }
    RichToken::Text(part.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> RichToken {
        RichToken::Text(s.to_string())
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(tokenize("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn splits_open_and_close() {
        assert_eq!(
            tokenize("a{c:#813EB6}b{/c}c"),
            vec![
                text("a"),
                RichToken::Open {
                    tag: TagName::Color,
                    value: Some("#813EB6".to_string()),
                },
                text("b"),
                RichToken::Close(TagName::Color),
                text("c"),
            ]
        );
    }

    #[test]
    fn bold_open_has_no_value() {
        assert_eq!(
            tokenize("{b}x{/b}"),
            vec![
                RichToken::Open {
                    tag: TagName::Bold,
                    value: None,
                },
                text("x"),
                RichToken::Close(TagName::Bold),
            ]
        );
    }

    #[test]
    fn legacy_bold_is_rewritten() {
        assert_eq!(tokenize("**hi**"), tokenize("{b}hi{/b}"));
    }

    #[test]
    fn legacy_bold_is_shortest_match() {
        assert_eq!(rewrite_legacy_bold("**a** and **b**"), "{b}a{/b} and {b}b{/b}");
    }

    #[test]
    fn legacy_bold_does_not_span_lines() {
        assert_eq!(rewrite_legacy_bold("**a\nb**"), "**a\nb**");
        assert_eq!(rewrite_legacy_bold("**a\rb**"), "**a\rb**");
        assert_eq!(rewrite_legacy_bold("**a\u{2028}b**"), "**a\u{2028}b**");
        assert_eq!(rewrite_legacy_bold("**a\u{2029}b**"), "**a\u{2029}b**");
    }

    #[test]
    fn unknown_directive_stays_text() {
        assert_eq!(tokenize("{i}x{/i}"), vec![text("{i}x{/i}")]);
    }

    #[test]
    fn close_with_value_is_text() {
        assert_eq!(
            tokenize("{/c:#000000}"),
            vec![text("{/c:#000000}")]
        );
    }

    #[test]
    fn value_is_kept_raw() {
        assert_eq!(
            tokenize("{fs:abc}"),
            vec![RichToken::Open {
                tag: TagName::FontSize,
                value: Some("abc".to_string()),
            }]
        );
    }
}
