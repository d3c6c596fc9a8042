use std::path::PathBuf;

use clubsite_engine::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to access token file at {path}: {source}")]
    TokenIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid API URL {url}: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not authorized; log in again")]
    Unauthorized,
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, body } => BackendError::Status { status, body },
            ClientError::Decode(e) => BackendError::Decode(e.to_string()),
            ClientError::Unauthorized => BackendError::Unauthorized,
            other => BackendError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_across() {
        let err: BackendError = ClientError::Status {
            status: 413,
            body: "too large".into(),
        }
        .into();
        assert!(matches!(err, BackendError::Status { status: 413, .. }));
    }

    #[test]
    fn token_io_becomes_transport() {
        let err: BackendError = ClientError::TokenIo {
            path: PathBuf::from("/nope/token"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
        .into();
        let BackendError::Transport(msg) = err else {
            panic!("expected transport error");
        };
        assert!(msg.contains("/nope/token"));
    }
}
