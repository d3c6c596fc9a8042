//! # Content Blocks
//!
//! A post body is an ordered list of heterogeneous blocks (TEXT, IMAGE,
//! VIDEO, FILE, EMBED, LINK). The whole list is the unit of update: it is
//! edited locally, saved wholesale, and read back unchanged.
//!
//! - **`types`**: `BlockType` and the wire-shaped `ContentBlock`
//! - **`meta`**: typed, lenient parsing of the per-type `meta` JSON blob
//! - **`ops`**: pure add/remove/move/patch/insert operations that keep
//!   `sort_order` equal to array position
//! - **`classify`**: MIME → block type, URL → display filename

pub mod classify;
pub mod meta;
pub mod ops;
pub mod types;

pub use classify::{FALLBACK_CONTENT_TYPE, file_label, infer_block_type};
pub use meta::{BlockMeta, FileMeta, ImageMeta, LinkMeta, VideoMeta, merge_meta, parse_meta};
pub use ops::{BlockPatch, MoveDirection, normalize_sort_order};
pub use types::{BlockType, ContentBlock};
