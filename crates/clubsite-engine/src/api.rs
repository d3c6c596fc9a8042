//! Wire types and backend seams for the services this crate depends on.
//!
//! The engine never talks HTTP itself. [`FileBackend`] and
//! [`LinkPreviewSource`] are implemented by the HTTP client crate and by
//! in-memory fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::blocks::ContentBlock;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("not authorized")]
    Unauthorized,
}

/// Board a recruitment post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoardCode {
    Notice,
    Qa,
}

impl BoardCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "NOTICE",
            Self::Qa => "QA",
        }
    }
}

impl std::str::FromStr for BoardCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NOTICE" => Ok(Self::Notice),
            "QA" => Ok(Self::Qa),
            other => Err(format!("unknown board code: {other}")),
        }
    }
}

/// `POST /files/presign`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub board_code: BoardCode,
    pub post_id: i64,
    pub content_type: String,
    pub original_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    /// Short-lived, single-use write URL.
    pub put_url: String,
    /// Storage object key, kept in block meta for downloads.
    pub key: String,
    /// Long-lived public read URL stored in the block.
    pub file_url: String,
}

/// `POST /files/download-presign`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPresignRequest {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadPresignResponse {
    pub url: String,
}

/// `GET /link/preview?url=...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPreview {
    pub url: String,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A recruitment post as returned by `GET /recruit/posts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitPost {
    pub id: i64,
    pub board_code: BoardCode,
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub comment_enabled: bool,
    #[serde(default)]
    pub like_enabled: bool,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub locked: bool,
}

/// Body of `PATCH /recruit/posts/{id}`. Blocks replace the stored list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpsertRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_enabled: Option<bool>,
    pub blocks: Vec<ContentBlock>,
}

/// Object storage reached through presigned URLs.
#[async_trait]
pub trait FileBackend: Send + Sync {
    async fn presign_upload(&self, req: &PresignRequest) -> Result<PresignResponse, BackendError>;

    /// `PUT` raw bytes to a presigned write URL. Any non-2xx is a failure.
    async fn put_object(
        &self,
        put_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError>;

    async fn presign_download(
        &self,
        req: &DownloadPresignRequest,
    ) -> Result<DownloadPresignResponse, BackendError>;
}

/// The backend's link-preview proxy.
#[async_trait]
pub trait LinkPreviewSource: Send + Sync {
    async fn link_preview(&self, url: &str) -> Result<LinkPreview, BackendError>;
}
