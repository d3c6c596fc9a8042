//! # Authoring
//!
//! Everything the post editor does between loading a post and saving it.
//!
//! - **`commands`**: `BlockCmd`, one value per structural edit, applied to a
//!   block list to produce the next one
//! - **`selection`**: wrapping a TEXT block's selection in markup directives
//! - **`session`**: `PostEditor`, which owns the block list and the upload
//!   queue for one post, runs multi-file uploads in order, and fills LINK
//!   meta from previews
//!
//! ## Usage Pattern
//!
//! ```rust
//! use clubsite_engine::api::BoardCode;
//! use clubsite_engine::blocks::{BlockPatch, BlockType};
//! use clubsite_engine::editing::{BlockCmd, PostEditor};
//!
//! let mut editor = PostEditor::new(BoardCode::Notice, Some(1));
//! editor.apply(BlockCmd::Append(BlockType::Text));
//! editor.apply(BlockCmd::Patch {
//!     index: 0,
//!     patch: BlockPatch::text("**hello**"),
//! });
//! let blocks = editor.to_upsert_blocks();
//! assert_eq!(blocks[0].sort_order, 0);
//! ```

pub mod commands;
pub mod selection;
pub mod session;

pub use commands::BlockCmd;
pub use selection::{SelectionEdit, apply_directive, wrap_selection};
pub use session::{PostEditor, UploadBatch};
