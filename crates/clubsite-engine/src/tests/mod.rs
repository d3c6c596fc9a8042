use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{
    BackendError, BoardCode, DownloadPresignRequest, DownloadPresignResponse, FileBackend,
    LinkPreview, LinkPreviewSource, PresignRequest, PresignResponse, RecruitPost,
};
use crate::blocks::ContentBlock;

/// In-memory object storage.
///
/// Presigning yields `https://cdn.test/{name}` as the public URL and
/// `posts/{post_id}/{name}` as the key. Every presign hands out a distinct
/// write URL. Downloads presign to `https://storage.test/get/{key}` unless
/// overridden with [`FakeBackend::with_download_url`].
#[derive(Default)]
pub struct FakeBackend {
    latency_ms: HashMap<String, u64>,
    failing_presigns: Mutex<usize>,
    failing_puts: Mutex<usize>,
    fail_downloads: bool,
    download_url: Option<String>,
    put_names: Mutex<HashMap<String, String>>,
    presigns: Mutex<Vec<PresignRequest>>,
    puts: Mutex<Vec<String>>,
    downloads: Mutex<Vec<DownloadPresignRequest>>,
    events: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays the presign for `name` by `ms` milliseconds.
    pub fn with_latency(mut self, name: &str, ms: u64) -> Self {
        self.latency_ms.insert(name.to_string(), ms);
        self
    }

    /// The first `count` presigns answer 503.
    pub fn failing_presigns(self, count: usize) -> Self {
        *self.failing_presigns.lock().unwrap() = count;
        self
    }

    /// The first `count` PUTs answer 403.
    pub fn failing_puts(self, count: usize) -> Self {
        *self.failing_puts.lock().unwrap() = count;
        self
    }

    pub fn failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// Answers every download presign with `url`.
    pub fn with_download_url(mut self, url: &str) -> Self {
        self.download_url = Some(url.to_string());
        self
    }

    pub fn presign_requests(&self) -> Vec<PresignRequest> {
        self.presigns.lock().unwrap().clone()
    }

    pub fn put_urls(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn download_requests(&self) -> Vec<DownloadPresignRequest> {
        self.downloads.lock().unwrap().clone()
    }

    /// `presign {name}` / `put {name}` in call order. Failed presigns are
    /// included.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileBackend for FakeBackend {
    async fn presign_upload(&self, req: &PresignRequest) -> Result<PresignResponse, BackendError> {
        if let Some(ms) = self.latency_ms.get(&req.original_filename) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        let name = req.original_filename.clone();
        let seq = {
            let mut presigns = self.presigns.lock().unwrap();
            presigns.push(req.clone());
            presigns.len()
        };
        self.events.lock().unwrap().push(format!("presign {name}"));

        let mut failing = self.failing_presigns.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(BackendError::Status {
                status: 503,
                body: "presign unavailable".into(),
            });
        }
        drop(failing);

        let put_url = format!("https://storage.test/put/{name}?sig={seq}");
        self.put_names
            .lock()
            .unwrap()
            .insert(put_url.clone(), name.clone());
        Ok(PresignResponse {
            put_url,
            key: format!("posts/{}/{name}", req.post_id),
            file_url: format!("https://cdn.test/{name}"),
        })
    }

    async fn put_object(
        &self,
        put_url: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<(), BackendError> {
        let name = self
            .put_names
            .lock()
            .unwrap()
            .get(put_url)
            .cloned()
            .unwrap_or_default();
        self.puts.lock().unwrap().push(put_url.to_string());
        self.events.lock().unwrap().push(format!("put {name}"));

        let mut failing = self.failing_puts.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(BackendError::Status {
                status: 403,
                body: "signature expired".into(),
            });
        }
        Ok(())
    }

    async fn presign_download(
        &self,
        req: &DownloadPresignRequest,
    ) -> Result<DownloadPresignResponse, BackendError> {
        self.downloads.lock().unwrap().push(req.clone());
        if self.fail_downloads {
            return Err(BackendError::Transport("connection reset".into()));
        }
        let url = self
            .download_url
            .clone()
            .unwrap_or_else(|| format!("https://storage.test/get/{}", req.key));
        Ok(DownloadPresignResponse { url })
    }
}

/// Link previews keyed by URL; any other URL answers 404.
#[derive(Default)]
pub struct FakePreviews {
    previews: HashMap<String, LinkPreview>,
    requested: Mutex<Vec<String>>,
}

impl FakePreviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, preview: LinkPreview) -> Self {
        self.previews.insert(url.to_string(), preview);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkPreviewSource for FakePreviews {
    async fn link_preview(&self, url: &str) -> Result<LinkPreview, BackendError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.previews
            .get(url)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                body: String::new(),
            })
    }
}

pub fn post_with_blocks(blocks: Vec<ContentBlock>) -> RecruitPost {
    RecruitPost {
        id: 42,
        board_code: BoardCode::Notice,
        title: "Spring recruitment".into(),
        author_name: Some("admin".into()),
        secret: false,
        pinned: false,
        comment_enabled: true,
        like_enabled: true,
        view_count: 0,
        created_at: None,
        updated_at: None,
        blocks,
        locked: false,
    }
}
