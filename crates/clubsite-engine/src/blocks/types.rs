use serde::{Deserialize, Serialize};

/// Variant tag of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockType {
    Text,
    Image,
    Video,
    File,
    Embed,
    Link,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        Self::Text,
        Self::Image,
        Self::Video,
        Self::File,
        Self::Embed,
        Self::Link,
    ];

    /// Wire name, e.g. `TEXT`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::File => "FILE",
            Self::Embed => "EMBED",
            Self::Link => "LINK",
        }
    }

    /// Block types produced by uploading a file.
    pub fn is_uploadable(self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::File)
    }
}

/// One ordered unit of post content.
///
/// A `TEXT` block's content is `text` (markup source, not HTML). Every other
/// block's content is `url` plus optional `meta`, a JSON string whose shape
/// depends on the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

impl ContentBlock {
    /// A block of `block_type` with the default empty payload.
    pub fn empty(block_type: BlockType, sort_order: i32) -> Self {
        let (text, url) = match block_type {
            BlockType::Text => (Some(String::new()), None),
            _ => (None, Some(String::new())),
        };
        Self {
            block_type,
            sort_order,
            text,
            url,
            meta: None,
        }
    }

    pub fn text(source: impl Into<String>) -> Self {
        Self {
            text: Some(source.into()),
            ..Self::empty(BlockType::Text, 0)
        }
    }

    pub fn with_url(block_type: BlockType, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::empty(block_type, 0)
        }
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// The authoritative text, only for `TEXT` blocks.
    pub fn text_source(&self) -> Option<&str> {
        match self.block_type {
            BlockType::Text => self.text.as_deref(),
            _ => None,
        }
    }

    /// The authoritative URL, never for `TEXT` blocks.
    pub fn url_source(&self) -> Option<&str> {
        match self.block_type {
            BlockType::Text => None,
            _ => self.url.as_deref(),
        }
    }
}
