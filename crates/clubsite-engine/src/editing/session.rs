use std::ops::Range;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::{BoardCode, FileBackend, LinkPreviewSource, PostUpsertRequest, RecruitPost};
use crate::blocks::meta::link_meta;
use crate::blocks::ops::{normalize_sort_order, sorted};
use crate::blocks::{BlockPatch, BlockType, ContentBlock, merge_meta};
use crate::markup::Directive;
use crate::upload::{PendingFile, UploadError, UploadManager};
use crate::url::normalize_external_url;

use super::commands::BlockCmd;
use super::selection::apply_directive;

/// Outcome of a multi-file upload.
#[derive(Debug, Default)]
pub struct UploadBatch {
    /// Items whose block was inserted, in selection order.
    pub inserted: Vec<Uuid>,
    /// Items left in the error state, retryable through the editor.
    pub failed: Vec<Uuid>,
}

/// Authoring state for one post: its block list and the uploads feeding it.
#[derive(Debug)]
pub struct PostEditor {
    pub board_code: BoardCode,
    /// `None` until the post has been created on the server.
    pub post_id: Option<i64>,
    pub title: String,
    blocks: Vec<ContentBlock>,
    uploads: UploadManager,
}

impl PostEditor {
    pub fn new(board_code: BoardCode, post_id: Option<i64>) -> Self {
        Self {
            board_code,
            post_id,
            title: String::new(),
            blocks: Vec::new(),
            uploads: UploadManager::new(),
        }
    }

    /// Starts editing an existing post. Blocks are taken in `sort_order`.
    pub fn from_post(post: &RecruitPost) -> Self {
        Self {
            board_code: post.board_code,
            post_id: Some(post.id),
            title: post.title.clone(),
            blocks: normalize_sort_order(sorted(&post.blocks)),
            uploads: UploadManager::new(),
        }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn uploads(&self) -> &UploadManager {
        &self.uploads
    }

    pub fn apply(&mut self, cmd: BlockCmd) {
        self.blocks = cmd.apply(&self.blocks);
    }

    /// Wraps part of a TEXT block in a directive and returns the new
    /// selection. `None` when `index` is not a TEXT block.
    pub fn apply_directive(
        &mut self,
        index: usize,
        selection: Range<usize>,
        directive: &Directive,
    ) -> Option<Range<usize>> {
        let text = self.blocks.get(index)?.text_source()?;
        let edit = apply_directive(text, selection, directive);
        self.apply(BlockCmd::Patch {
            index,
            patch: BlockPatch::text(edit.text),
        });
        Some(edit.selection)
    }

    /// Uploads `files` one at a time, inserting a block for each success.
    ///
    /// With `insert_at`, blocks land from that position onward in selection
    /// order; otherwise they are appended. A failed file is skipped and the
    /// next one proceeds.
    pub async fn upload_files(
        &mut self,
        files: Vec<PendingFile>,
        insert_at: Option<usize>,
        backend: &dyn FileBackend,
    ) -> Result<UploadBatch, UploadError> {
        if self.post_id.is_none() {
            return Err(UploadError::PostNotCreated);
        }
        let mut at = insert_at;
        let mut batch = UploadBatch::default();
        for file in files {
            let id = self.uploads.add(self.board_code, self.post_id, file)?;
            if self.upload_and_insert(id, at, backend).await {
                batch.inserted.push(id);
                at = at.map(|i| i + 1);
            } else {
                batch.failed.push(id);
            }
        }
        Ok(batch)
    }

    /// Retries a failed upload and inserts its block on success.
    pub async fn retry_upload(
        &mut self,
        id: Uuid,
        insert_at: Option<usize>,
        backend: &dyn FileBackend,
    ) -> Result<(), UploadError> {
        let block = self.uploads.retry(id, backend).await?.block();
        if let Some(block) = block {
            self.apply(BlockCmd::Insert {
                at: insert_at,
                block,
            });
        }
        Ok(())
    }

    pub fn remove_upload(&mut self, id: Uuid) -> bool {
        self.uploads.remove(id)
    }

    async fn upload_and_insert(
        &mut self,
        id: Uuid,
        at: Option<usize>,
        backend: &dyn FileBackend,
    ) -> bool {
        match self.uploads.start(id, backend).await {
            Ok(item) => {
                if let Some(block) = item.block() {
                    self.apply(BlockCmd::Insert { at, block });
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Normalizes a block's URL when its field is committed.
    ///
    /// Writes the normalized form back if it differs. Returns the normalized
    /// URL, or `None` when the URL is rejected.
    pub fn commit_url(&mut self, index: usize) -> Option<String> {
        let raw = self.blocks.get(index)?.url_source()?.to_string();
        let normalized = normalize_external_url(&raw)?;
        if normalized != raw {
            self.apply(BlockCmd::Patch {
                index,
                patch: BlockPatch::url(normalized.clone()),
            });
        }
        Some(normalized)
    }

    /// Commits a LINK block's URL and fills its meta from a preview.
    ///
    /// Skipped when the meta already has a title or thumbnail. A failed
    /// preview leaves the block as committed. The preview's image is stored
    /// only if it passes URL normalization. Returns whether meta changed.
    pub async fn hydrate_link(&mut self, index: usize, source: &dyn LinkPreviewSource) -> bool {
        let Some(block) = self.blocks.get(index) else {
            return false;
        };
        if block.block_type != BlockType::Link {
            return false;
        }
        let previous_meta = block.meta.clone();
        let existing = link_meta(previous_meta.as_deref()).unwrap_or_default();
        if existing.title.is_some() || existing.thumbnail_url.is_some() {
            return false;
        }
        let Some(url) = self.commit_url(index) else {
            return false;
        };

        let preview = match source.link_preview(&url).await {
            Ok(preview) => preview,
            Err(err) => {
                log::debug!("Link preview failed for {url}: {err}");
                return false;
            }
        };
        let final_url = normalize_external_url(&preview.url).unwrap_or(url);
        let thumbnail = preview.image.as_deref().and_then(normalize_external_url);

        let mut fields = Map::new();
        fields.insert("title".into(), preview.title.into());
        fields.insert("desc".into(), preview.desc.into());
        fields.insert("siteName".into(), preview.site_name.into());
        fields.insert("thumbnailUrl".into(), thumbnail.into());
        fields.insert("url".into(), Value::String(final_url.clone()));
        let meta = merge_meta(previous_meta.as_deref(), fields);

        self.apply(BlockCmd::Patch {
            index,
            patch: BlockPatch {
                url: Some(final_url),
                meta: Some(meta),
                ..BlockPatch::default()
            },
        });
        true
    }

    /// The block list to save, with `sort_order` matching position.
    pub fn to_upsert_blocks(&self) -> Vec<ContentBlock> {
        normalize_sort_order(self.blocks.clone())
    }

    pub fn to_upsert_request(&self) -> PostUpsertRequest {
        PostUpsertRequest {
            title: self.title.clone(),
            author_name: None,
            secret: None,
            pinned: None,
            comment_enabled: None,
            like_enabled: None,
            blocks: self.to_upsert_blocks(),
        }
    }
}
