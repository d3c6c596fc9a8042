pub mod api;
pub mod blocks;
pub mod download;
pub mod editing;
pub mod markup;
pub mod render;
pub mod upload;
pub mod url;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use api::{BackendError, BoardCode, FileBackend, LinkPreviewSource};
pub use blocks::{BlockType, ContentBlock};
pub use download::{DownloadAction, DownloadError, resolve_download};
pub use editing::{BlockCmd, PostEditor};
pub use markup::{render_safe_html, render_styled_html};
pub use render::{RenderNode, TextStyling, render_blocks, render_blocks_with, render_html};
pub use upload::{PendingFile, UploadError, UploadManager, UploadStatus};
pub use url::normalize_external_url;
