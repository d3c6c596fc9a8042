//! Typed views over a block's `meta` JSON string.
//!
//! Parsing is lenient: a missing, malformed or non-object blob is simply "no
//! metadata", and a field of the wrong JSON type reads as absent.

use serde::Serialize;
use serde_json::{Map, Value};

use super::types::BlockType;

/// Metadata recorded for uploaded files (FILE, and also IMAGE/VIDEO uploads).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileMeta {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            key: str_field(obj, &["key"]),
            original_filename: str_field(obj, &["originalFilename", "fileName"]),
            content_type: str_field(obj, &["contentType"]),
            size: u64_field(obj, &["size", "fileSize"]),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Preview data for LINK blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMeta {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub site_name: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl LinkMeta {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            title: str_field(obj, &["title"]),
            desc: str_field(obj, &["desc", "description"]),
            site_name: str_field(obj, &["siteName"]),
            thumbnail_url: str_field(obj, &["thumbnailUrl", "image"]),
        }
    }

    /// True when nothing worth showing on a card is present.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.desc.is_none() && self.thumbnail_url.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMeta {
    pub caption: Option<String>,
    pub file: FileMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMeta {
    pub embed_url: Option<String>,
    pub file: FileMeta,
}

/// Metadata interpreted according to the owning block's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockMeta {
    File(FileMeta),
    Link(LinkMeta),
    Image(ImageMeta),
    Video(VideoMeta),
}

/// Parses a meta blob for a block of `block_type`.
///
/// `TEXT` and `EMBED` blocks carry no typed metadata.
pub fn parse_meta(block_type: BlockType, raw: Option<&str>) -> Option<BlockMeta> {
    let obj = parse_object(raw?)?;
    match block_type {
        BlockType::File => Some(BlockMeta::File(FileMeta::from_object(&obj))),
        BlockType::Link => Some(BlockMeta::Link(LinkMeta::from_object(&obj))),
        BlockType::Image => Some(BlockMeta::Image(ImageMeta {
            caption: str_field(&obj, &["caption"]),
            file: FileMeta::from_object(&obj),
        })),
        BlockType::Video => Some(BlockMeta::Video(VideoMeta {
            embed_url: str_field(&obj, &["embedUrl"]),
            file: FileMeta::from_object(&obj),
        })),
        BlockType::Text | BlockType::Embed => None,
    }
}

/// File metadata regardless of which upload type produced it.
pub fn file_meta(block_type: BlockType, raw: Option<&str>) -> Option<FileMeta> {
    match parse_meta(block_type, raw)? {
        BlockMeta::File(f) => Some(f),
        BlockMeta::Image(i) => Some(i.file),
        BlockMeta::Video(v) => Some(v.file),
        BlockMeta::Link(_) => None,
    }
}

pub fn link_meta(raw: Option<&str>) -> Option<LinkMeta> {
    match parse_meta(BlockType::Link, raw)? {
        BlockMeta::Link(l) => Some(l),
        _ => None,
    }
}

/// Overlays `patch` onto a previous meta blob and serializes the result.
///
/// A malformed previous blob is treated as `{}`. Null patch values are
/// dropped rather than written.
pub fn merge_meta(previous: Option<&str>, patch: Map<String, Value>) -> String {
    let mut base = previous.and_then(parse_object).unwrap_or_default();
    for (k, v) in patch {
        if !v.is_null() {
            base.insert(k, v);
        }
    }
    Value::Object(base).to_string()
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Object(obj) => Some(obj),
        _ => None,
    }
}

fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn u64_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
