/// The four directive names the markup language understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagName {
    /// `{b}` - rendered as `<strong>`.
    Bold,
    /// `{c:#RRGGBB}` - foreground colour.
    Color,
    /// `{bg:#RRGGBB}` - highlight pill.
    Background,
    /// `{fs:N}` - font size in px.
    FontSize,
}

impl TagName {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "b" => Some(Self::Bold),
            "c" => Some(Self::Color),
            "bg" => Some(Self::Background),
            "fs" => Some(Self::FontSize),
            _ => None,
        }
    }

    /// Name as written in source, e.g. `bg`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Color => "c",
            Self::Background => "bg",
            Self::FontSize => "fs",
        }
    }

    /// The `data-rt-*` attribute emitted for this tag, if any.
    pub fn data_attribute(self) -> Option<&'static str> {
        match self {
            Self::Bold => None,
            Self::Color => Some("data-rt-color"),
            Self::Background => Some("data-rt-bg"),
            Self::FontSize => Some("data-rt-fs"),
        }
    }

    pub(crate) fn closing_html(self) -> &'static str {
        match self {
            Self::Bold => "</strong>",
            _ => "</span>",
        }
    }
}

/// One fragment of tokenized markup source.
///
/// Tokens are derived on every render and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichToken {
    /// Literal text, not yet escaped.
    Text(String),
    /// `{name}` or `{name:value}`. The value is raw and unvalidated.
    Open {
        tag: TagName,
        value: Option<String>,
    },
    /// `{/name}`.
    Close(TagName),
}
