use crate::api::{BackendError, DownloadPresignRequest, FileBackend};
use crate::blocks::{FileMeta, file_label};
use crate::url::normalize_external_url;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("no download URL available")]
    NoUrl,
    #[error("could not presign download for {key}: {source}")]
    Presign {
        key: String,
        #[source]
        source: BackendError,
    },
    #[error("presigned download URL for {key} was rejected: {url}")]
    RejectedUrl { key: String, url: String },
}

/// What the caller should do to start a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadAction {
    /// Full navigation to a presigned URL that carries the filename itself.
    Navigate { url: String },
    /// Plain link click; the filename is only a hint the browser may ignore.
    DirectLink { url: String, filename_hint: String },
}

impl DownloadAction {
    pub fn url(&self) -> &str {
        match self {
            Self::Navigate { url } | Self::DirectLink { url, .. } => url,
        }
    }
}

/// Resolves how to download a FILE block.
///
/// With a storage key, a filename-preserving presigned URL is requested. If
/// that request fails the error is returned; there is no fallback to the raw
/// URL once a key was present. Both the presigned and the raw URL go through
/// [`normalize_external_url`]. Without a key the raw URL is used directly.
pub async fn resolve_download(
    url: Option<&str>,
    meta: Option<&FileMeta>,
    backend: &dyn FileBackend,
) -> Result<DownloadAction, DownloadError> {
    if let Some(meta) = meta
        && let Some(key) = meta.key.as_deref()
    {
        let req = DownloadPresignRequest {
            key: key.to_string(),
            content_type: meta.content_type.clone(),
            original_filename: meta.original_filename.clone(),
        };
        return match backend.presign_download(&req).await {
            Ok(resp) => match normalize_external_url(&resp.url) {
                Some(url) => Ok(DownloadAction::Navigate { url }),
                None => {
                    log::error!("Presigned download URL for {key} rejected: {}", resp.url);
                    Err(DownloadError::RejectedUrl {
                        key: key.to_string(),
                        url: resp.url,
                    })
                }
            },
            Err(source) => {
                log::error!("Presigned download failed for {key}: {source}");
                Err(DownloadError::Presign {
                    key: key.to_string(),
                    source,
                })
            }
        };
    }

    let url = url
        .and_then(normalize_external_url)
        .ok_or(DownloadError::NoUrl)?;
    let filename_hint = meta
        .and_then(|m| m.original_filename.clone())
        .unwrap_or_else(|| file_label(&url));
    Ok(DownloadAction::DirectLink { url, filename_hint })
}
