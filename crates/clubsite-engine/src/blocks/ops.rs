//! Pure authoring operations over a post's block list.
//!
//! Every structural operation returns a new list whose `sort_order` values
//! are exactly `0..n` in array order.

use super::types::{BlockType, ContentBlock};

/// Direction for [`move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    fn target(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Self::Up => index.checked_sub(1),
            Self::Down => Some(index + 1).filter(|to| *to < len),
        }
    }
}

/// Fields to shallow-merge into one block. `None` leaves a field untouched.
///
/// The block type is deliberately absent: changing type means replacing the
/// block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPatch {
    pub text: Option<String>,
    pub url: Option<String>,
    pub meta: Option<String>,
}

impl BlockPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn meta(meta: impl Into<String>) -> Self {
        Self {
            meta: Some(meta.into()),
            ..Self::default()
        }
    }

    fn apply_to(self, block: &mut ContentBlock) {
        if let Some(text) = self.text {
            block.text = Some(text);
        }
        if let Some(url) = self.url {
            block.url = Some(url);
        }
        if let Some(meta) = self.meta {
            block.meta = Some(meta);
        }
    }
}

/// Rewrites every block's `sort_order` to its array index.
pub fn normalize_sort_order(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    blocks
        .into_iter()
        .enumerate()
        .map(|(idx, mut b)| {
            b.sort_order = idx as i32;
            b
        })
        .collect()
}

/// Appends an empty block of `block_type`.
pub fn append(blocks: &[ContentBlock], block_type: BlockType) -> Vec<ContentBlock> {
    let mut next = blocks.to_vec();
    next.push(ContentBlock::empty(block_type, blocks.len() as i32));
    normalize_sort_order(next)
}

/// Removes the block at `index`. Out of range is a no-op.
pub fn remove(blocks: &[ContentBlock], index: usize) -> Vec<ContentBlock> {
    let mut next = blocks.to_vec();
    if index < next.len() {
        next.remove(index);
    }
    normalize_sort_order(next)
}

/// Swaps the block at `index` with its neighbour. No-op at either end.
pub fn move_block(
    blocks: &[ContentBlock],
    index: usize,
    direction: MoveDirection,
) -> Vec<ContentBlock> {
    let mut next = blocks.to_vec();
    if index < next.len()
        && let Some(to) = direction.target(index, next.len())
    {
        next.swap(index, to);
    }
    normalize_sort_order(next)
}

/// Shallow-merges `patch` into the block at `index`.
///
/// Siblings are left exactly as they were, including their `sort_order`.
pub fn patch(blocks: &[ContentBlock], index: usize, patch: BlockPatch) -> Vec<ContentBlock> {
    let mut next = blocks.to_vec();
    if let Some(block) = next.get_mut(index) {
        patch.apply_to(block);
    }
    next
}

/// Inserts `block` at `index` (clamped to the end), or appends when `None`.
pub fn insert_at(
    blocks: &[ContentBlock],
    index: Option<usize>,
    block: ContentBlock,
) -> Vec<ContentBlock> {
    let mut next = blocks.to_vec();
    match index {
        Some(at) => next.insert(at.min(next.len()), block),
        None => next.push(block),
    }
    normalize_sort_order(next)
}

/// Moves the element at `from` to position `to`, shifting the rest.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut next = items.to_vec();
    if from >= next.len() {
        return next;
    }
    let picked = next.remove(from);
    next.insert(to.min(next.len()), picked);
    next
}

/// A copy of `blocks` in ascending `sort_order`. Stable for ties.
pub fn sorted(blocks: &[ContentBlock]) -> Vec<ContentBlock> {
    let mut copy = blocks.to_vec();
    copy.sort_by_key(|b| b.sort_order);
    copy
}
