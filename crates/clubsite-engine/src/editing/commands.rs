use crate::blocks::ops::{self, BlockPatch, MoveDirection};
use crate::blocks::{BlockType, ContentBlock};

/// One authoring edit to a post's block list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockCmd {
    Append(BlockType),
    Remove { index: usize },
    Move { index: usize, direction: MoveDirection },
    Patch { index: usize, patch: BlockPatch },
    /// `at: None` appends.
    Insert { at: Option<usize>, block: ContentBlock },
}

impl BlockCmd {
    /// Applies the command, returning the next block list.
    pub fn apply(self, blocks: &[ContentBlock]) -> Vec<ContentBlock> {
        match self {
            Self::Append(block_type) => ops::append(blocks, block_type),
            Self::Remove { index } => ops::remove(blocks, index),
            Self::Move { index, direction } => ops::move_block(blocks, index, direction),
            Self::Patch { index, patch } => ops::patch(blocks, index, patch),
            Self::Insert { at, block } => ops::insert_at(blocks, at, block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_compose() {
        let blocks = BlockCmd::Append(BlockType::Text).apply(&[]);
        let blocks = BlockCmd::Append(BlockType::Link).apply(&blocks);
        let blocks = BlockCmd::Move {
            index: 1,
            direction: MoveDirection::Up,
        }
        .apply(&blocks);
        let blocks = BlockCmd::Patch {
            index: 1,
            patch: BlockPatch::text("hi"),
        }
        .apply(&blocks);

        assert_eq!(blocks[0].block_type, BlockType::Link);
        assert_eq!(blocks[1].text.as_deref(), Some("hi"));
        assert_eq!(
            blocks.iter().map(|b| b.sort_order).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn insert_clamps_and_normalizes() {
        let blocks = BlockCmd::Append(BlockType::Text).apply(&[]);
        let blocks = BlockCmd::Insert {
            at: Some(10),
            block: ContentBlock::with_url(BlockType::Image, "https://cdn/i.png"),
        }
        .apply(&blocks);
        assert_eq!(blocks[1].block_type, BlockType::Image);
        assert_eq!(blocks[1].sort_order, 1);

        let blocks = BlockCmd::Remove { index: 0 }.apply(&blocks);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].sort_order, 0);
    }
}
