use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::{FileRow, FrameKind, LinkCard, RenderNode};
use crate::url::normalize_external_url;

/// Serializes rendered nodes into one HTML fragment.
///
/// TEXT nodes are already safe HTML and are inserted as-is; every other
/// string is escaped for its position.
pub fn render_html(nodes: &[RenderNode]) -> String {
    let mut out = String::from("<div class=\"blocks\">\n");
    for node in nodes {
        out.push_str(&node_html(node));
        out.push('\n');
    }
    out.push_str("</div>\n");
    out
}

fn node_html(node: &RenderNode) -> String {
    match node {
        RenderNode::RichText { html } => format!("<div class=\"rt-text\">{html}</div>"),
        RenderNode::Image { src, caption } => {
            let caption = caption
                .as_deref()
                .map(|c| format!("<figcaption>{}</figcaption>", text(c)))
                .unwrap_or_default();
            format!(
                "<figure class=\"block-image\"><img src=\"{}\" alt=\"\"/>{caption}</figure>",
                attr(src)
            )
        }
        RenderNode::EmbedFrame { src, kind } => {
            let (title, allow) = match kind {
                FrameKind::Video => (
                    "video",
                    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture",
                ),
                FrameKind::Embed => ("embed", "clipboard-write; encrypted-media; picture-in-picture"),
            };
            format!(
                "<div class=\"block-embed\"><iframe src=\"{}\" title=\"{title}\" allow=\"{allow}\" allowfullscreen></iframe></div>",
                attr(src)
            )
        }
        RenderNode::NativeVideo { src } => format!(
            "<video class=\"block-video\" controls><source src=\"{}\"/></video>",
            attr(src)
        ),
        RenderNode::LinkCard(card) => link_card_html(card),
        RenderNode::FileRow(row) => file_row_html(row),
    }
}

fn link_card_html(card: &LinkCard) -> String {
    let mut out = format!(
        "<a class=\"link-card\" href=\"{}\" target=\"_blank\" rel=\"noreferrer\">",
        attr(&card.url)
    );
    if let Some(image) = card.image.as_deref().and_then(normalize_external_url) {
        out.push_str(&format!(
            "<img class=\"link-thumb\" src=\"{}\" alt=\"\"/>",
            attr(&image)
        ));
    }
    out.push_str(&format!(
        "<div class=\"link-title\">{}</div>",
        text(card.display_title())
    ));
    if let Some(desc) = &card.desc {
        out.push_str(&format!("<div class=\"link-desc\">{}</div>", text(desc)));
    }
    if let Some(site) = &card.site_name {
        out.push_str(&format!("<div class=\"link-site\">{}</div>", text(site)));
    }
    out.push_str(&format!("<div class=\"link-url\">{}</div></a>", text(&card.url)));
    out
}

fn file_row_html(row: &FileRow) -> String {
    let mut out = format!(
        "<a class=\"file-row\" href=\"{}\" download=\"{}\" target=\"_blank\" rel=\"noreferrer\">",
        attr(&row.url),
        attr(&row.filename)
    );
    out.push_str(&format!("<span class=\"file-name\">{}</span>", text(&row.filename)));
    if let Some(size) = row.size {
        out.push_str(&format!("<span class=\"file-size\">{}</span>", format_size(size)));
    }
    out.push_str("</a>");
    out
}

/// Human-readable byte count, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
