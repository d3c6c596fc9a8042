//! # Block Rendering
//!
//! Maps a post's block list to a presentation tree, one [`RenderNode`] per
//! visible block, in ascending `sort_order`. The input is never reordered in
//! place.
//!
//! - **`html`**: serializes nodes to an HTML fragment
//! - **`link_preview`**: link card hydration with a stale-response guard

pub mod html;
pub mod link_preview;

use crate::blocks::{
    BlockMeta, BlockType, ContentBlock, FileMeta, LinkMeta, file_label, ops::sorted, parse_meta,
};
use crate::markup::{render_safe_html, render_styled_html};
use crate::url::{is_frameable, is_video_host, normalize_external_url, video_embed_url};

pub use html::render_html;
pub use link_preview::{LinkPreviewSlot, PreviewState, PreviewTicket, hydrate_link_cards};

/// How TEXT block markup is turned into HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextStyling {
    /// `data-rt-*` annotations for a client that applies styles itself.
    #[default]
    Annotated,
    /// Styles inlined during emission.
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Video,
    Embed,
}

/// A link preview card. Fields stay `None` until known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCard {
    pub url: String,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub image: Option<String>,
    pub site_name: Option<String>,
}

impl LinkCard {
    fn new(url: String, meta: Option<LinkMeta>) -> Self {
        let meta = meta.unwrap_or_default();
        Self {
            url,
            title: meta.title,
            desc: meta.desc,
            image: meta.thumbnail_url.as_deref().and_then(normalize_external_url),
            site_name: meta.site_name,
        }
    }

    /// True when the card has nothing but its URL and a preview should be fetched.
    pub fn needs_preview(&self) -> bool {
        self.title.is_none() && self.desc.is_none() && self.image.is_none()
    }

    /// Title to display; the URL itself when no title is known.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// A downloadable file row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub url: String,
    pub filename: String,
    pub size: Option<u64>,
    pub meta: FileMeta,
}

impl FileRow {
    /// Resolves the download for this row; see [`crate::download::resolve_download`].
    pub async fn download(
        &self,
        backend: &dyn crate::api::FileBackend,
    ) -> Result<crate::download::DownloadAction, crate::download::DownloadError> {
        crate::download::resolve_download(Some(&self.url), Some(&self.meta), backend).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    RichText { html: String },
    Image { src: String, caption: Option<String> },
    EmbedFrame { src: String, kind: FrameKind },
    NativeVideo { src: String },
    LinkCard(LinkCard),
    FileRow(FileRow),
}

/// Renders blocks with annotated TEXT markup.
pub fn render_blocks(blocks: &[ContentBlock]) -> Vec<RenderNode> {
    render_blocks_with(blocks, TextStyling::Annotated)
}

pub fn render_blocks_with(blocks: &[ContentBlock], styling: TextStyling) -> Vec<RenderNode> {
    sorted(blocks)
        .iter()
        .filter_map(|b| render_block(b, styling))
        .collect()
}

/// Renders a single block, or `None` when it has nothing to show.
pub fn render_block(block: &ContentBlock, styling: TextStyling) -> Option<RenderNode> {
    if block.block_type == BlockType::Text {
        let text = block.text_source()?.trim();
        if text.is_empty() {
            return None;
        }
        let html = match styling {
            TextStyling::Annotated => render_safe_html(text),
            TextStyling::Inline => render_styled_html(text),
        };
        return Some(RenderNode::RichText { html });
    }

    let raw = block.url_source().unwrap_or("");
    let Some(url) = normalize_external_url(raw) else {
        if !raw.trim().is_empty() {
            log::debug!("Dropping {} block with rejected URL", block.block_type.as_str());
        }
        return None;
    };
    let meta = parse_meta(block.block_type, block.meta.as_deref());

    let node = match (block.block_type, meta) {
        (BlockType::Image, meta) => RenderNode::Image {
            src: url,
            caption: match meta {
                Some(BlockMeta::Image(m)) => m.caption,
                _ => None,
            },
        },
        (BlockType::Video, meta) => {
            let embed = match meta {
                Some(BlockMeta::Video(m)) => m.embed_url.as_deref().and_then(normalize_external_url),
                _ => None,
            };
            match embed {
                Some(src) => RenderNode::EmbedFrame {
                    src,
                    kind: FrameKind::Video,
                },
                None if is_video_host(&url) => RenderNode::EmbedFrame {
                    src: video_embed_url(&url),
                    kind: FrameKind::Video,
                },
                None => RenderNode::NativeVideo { src: url },
            }
        }
        (BlockType::Embed, _) => {
            if is_frameable(&url) {
                let src = if is_video_host(&url) {
                    video_embed_url(&url)
                } else {
                    url
                };
                RenderNode::EmbedFrame {
                    src,
                    kind: FrameKind::Embed,
                }
            } else {
                RenderNode::LinkCard(LinkCard::new(url, None))
            }
        }
        (BlockType::Link, meta) => {
            let link = match meta {
                Some(BlockMeta::Link(m)) => Some(m),
                _ => None,
            };
            RenderNode::LinkCard(LinkCard::new(url, link))
        }
        (BlockType::File, meta) => {
            let meta = match meta {
                Some(BlockMeta::File(m)) => m,
                _ => FileMeta::default(),
            };
            let filename = meta
                .original_filename
                .clone()
                .unwrap_or_else(|| file_label(&url));
            RenderNode::FileRow(FileRow {
                size: meta.size,
                url,
                filename,
                meta,
            })
        }
        (BlockType::Text, _) => return None,
    };
    Some(node)
}
