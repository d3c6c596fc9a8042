//! # File Uploads
//!
//! Files reach object storage in two steps: ask the backend for a
//! short-lived write URL scoped to a board and post, then `PUT` the bytes
//! straight to storage. The resulting public URL and storage key end up in a
//! new block.
//!
//! [`UploadManager`] owns the per-item state for an editing session:
//!
//! ```text
//! idle ──▶ uploading ──▶ success
//!               │
//!               ▼
//!             error ──(retry)──▶ uploading
//! ```
//!
//! A retry always asks for a fresh write URL; a previous one is never
//! reused. Removal is allowed from any state.

use uuid::Uuid;

use crate::api::{BackendError, BoardCode, FileBackend, PresignRequest};
use crate::blocks::{BlockType, ContentBlock, FALLBACK_CONTENT_TYPE, FileMeta, infer_block_type};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("the post must be saved before files can be attached")]
    PostNotCreated,
    #[error("could not get an upload URL for {filename}: {source}")]
    Presign {
        filename: String,
        #[source]
        source: BackendError,
    },
    #[error("upload of {filename} failed: {source}")]
    Put {
        filename: String,
        #[source]
        source: BackendError,
    },
    #[error("no upload with id {0}")]
    UnknownItem(Uuid),
    #[error("upload {id} cannot start while {from:?}")]
    InvalidTransition { id: Uuid, from: UploadStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success,
    Error,
}

/// A file picked or pasted by the author, held in memory until uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    /// An empty `content_type` becomes `application/octet-stream`.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = content_type.into();
        let content_type = if content_type.trim().is_empty() {
            FALLBACK_CONTENT_TYPE.to_string()
        } else {
            content_type
        };
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn block_type(&self) -> BlockType {
        infer_block_type(&self.content_type)
    }
}

/// The meta blob written on an uploaded FILE/IMAGE/VIDEO block.
pub fn file_meta_for(file: &PendingFile, key: Option<&str>) -> String {
    FileMeta {
        key: key.map(str::to_string),
        original_filename: Some(file.name.clone()),
        content_type: Some(file.content_type.clone()),
        size: Some(file.size()),
    }
    .to_json()
}

#[derive(Debug, Clone)]
pub struct UploadItem {
    pub id: Uuid,
    pub file: PendingFile,
    pub board_code: BoardCode,
    pub post_id: i64,
    pub block_type: BlockType,
    pub status: UploadStatus,
    pub file_url: Option<String>,
    pub key: Option<String>,
    /// Human-readable reason for the last failure.
    pub error: Option<String>,
}

impl UploadItem {
    /// The block to insert, once the upload has succeeded.
    pub fn block(&self) -> Option<ContentBlock> {
        if self.status != UploadStatus::Success {
            return None;
        }
        let url = self.file_url.as_deref()?;
        Some(
            ContentBlock::with_url(self.block_type, url)
                .with_meta(file_meta_for(&self.file, self.key.as_deref())),
        )
    }

    fn presign_request(&self) -> PresignRequest {
        PresignRequest {
            board_code: self.board_code,
            post_id: self.post_id,
            content_type: self.file.content_type.clone(),
            original_filename: self.file.name.clone(),
        }
    }
}

/// Upload items for one editing session.
#[derive(Debug, Default)]
pub struct UploadManager {
    items: Vec<UploadItem>,
}

impl UploadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a file in the `Idle` state. Fails when the post has no id yet.
    pub fn add(
        &mut self,
        board_code: BoardCode,
        post_id: Option<i64>,
        file: PendingFile,
    ) -> Result<Uuid, UploadError> {
        let post_id = post_id.ok_or(UploadError::PostNotCreated)?;
        let id = Uuid::new_v4();
        self.items.push(UploadItem {
            id,
            block_type: file.block_type(),
            file,
            board_code,
            post_id,
            status: UploadStatus::Idle,
            file_url: None,
            key: None,
            error: None,
        });
        Ok(id)
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&UploadItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Drops an item regardless of state. Returns whether it existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn is_uploading(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status == UploadStatus::Uploading)
    }

    /// Runs the presign-then-put sequence for an `Idle` or `Error` item.
    ///
    /// On failure the item is left in `Error` with a message and the error is
    /// also returned.
    pub async fn start(
        &mut self,
        id: Uuid,
        backend: &dyn FileBackend,
    ) -> Result<&UploadItem, UploadError> {
        let idx = self.index_of(id)?;
        let item = &mut self.items[idx];
        if !matches!(item.status, UploadStatus::Idle | UploadStatus::Error) {
            return Err(UploadError::InvalidTransition {
                id,
                from: item.status,
            });
        }
        item.status = UploadStatus::Uploading;
        item.error = None;
        let req = item.presign_request();
        let bytes = item.file.bytes.clone();

        log::info!("Uploading {} ({} bytes)", req.original_filename, bytes.len());
        let outcome = transfer(backend, &req, bytes).await;

        let item = &mut self.items[idx];
        match outcome {
            Ok((file_url, key)) => {
                log::info!("Uploaded {} to {file_url}", item.file.name);
                item.status = UploadStatus::Success;
                item.file_url = Some(file_url);
                item.key = Some(key);
                Ok(&self.items[idx])
            }
            Err(err) => {
                log::warn!("{err}");
                item.status = UploadStatus::Error;
                item.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Retries an item in the `Error` state with a fresh write URL.
    pub async fn retry(
        &mut self,
        id: Uuid,
        backend: &dyn FileBackend,
    ) -> Result<&UploadItem, UploadError> {
        let idx = self.index_of(id)?;
        let status = self.items[idx].status;
        if status != UploadStatus::Error {
            return Err(UploadError::InvalidTransition { id, from: status });
        }
        self.start(id, backend).await
    }

    fn index_of(&self, id: Uuid) -> Result<usize, UploadError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(UploadError::UnknownItem(id))
    }
}

async fn transfer(
    backend: &dyn FileBackend,
    req: &PresignRequest,
    bytes: Vec<u8>,
) -> Result<(String, String), UploadError> {
    let presigned = backend
        .presign_upload(req)
        .await
        .map_err(|source| UploadError::Presign {
            filename: req.original_filename.clone(),
            source,
        })?;
    backend
        .put_object(&presigned.put_url, &req.content_type, bytes)
        .await
        .map_err(|source| UploadError::Put {
            filename: req.original_filename.clone(),
            source,
        })?;
    Ok((presigned.file_url, presigned.key))
}
