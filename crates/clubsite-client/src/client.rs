use std::time::Duration;

use async_trait::async_trait;
use clubsite_config::Config;
use clubsite_engine::api::{
    BackendError, DownloadPresignRequest, DownloadPresignResponse, FileBackend, LinkPreview,
    LinkPreviewSource, PostUpsertRequest, PresignRequest, PresignResponse, RecruitPost,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;
use crate::session::{Reply, Session};
use crate::token::TokenStore;

const REFRESH_PATH: &str = "/members/refresh";

#[derive(serde::Deserialize)]
struct RefreshResponse {
    token: String,
}

/// Client for the club website API.
///
/// API calls carry the bearer token and go through the refresh policy in
/// [`Session`]. Object storage PUTs go straight to the presigned URL with no
/// credentials.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let session = Session::open(TokenStore::new(&config.token_path))?;
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            session,
        )
    }

    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|source| ClientError::Url {
            url: base_url.clone(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get_post(&self, id: i64) -> Result<RecruitPost, ClientError> {
        self.request::<_, ()>(Method::GET, &format!("/recruit/posts/{id}"), &[], None)
            .await
    }

    /// Replaces the post's fields and its whole block list.
    pub async fn update_post(
        &self,
        id: i64,
        req: &PostUpsertRequest,
    ) -> Result<RecruitPost, ClientError> {
        self.request(Method::PATCH, &format!("/recruit/posts/{id}"), &[], Some(req))
            .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&url).map_err(|source| ClientError::Url { url, source })
    }

    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        log::debug!("{method} {url}");
        self.session
            .call(
                |token| {
                    let mut builder = self.http.request(method.clone(), url.clone()).query(query);
                    if let Some(token) = token {
                        builder = builder.bearer_auth(token);
                    }
                    if let Some(body) = body {
                        builder = builder.json(body);
                    }
                    async move { read_reply(builder.send().await?).await }
                },
                || self.refresh_token(),
            )
            .await
    }

    async fn refresh_token(&self) -> Result<String, ClientError> {
        let url = self.endpoint(REFRESH_PATH)?;
        let response = self.http.post(url).send().await?;
        match read_reply::<RefreshResponse>(response).await? {
            Reply::Done(body) => Ok(body.token),
            Reply::Unauthorized => Err(ClientError::Unauthorized),
        }
    }
}

async fn read_reply<T: DeserializeOwned>(response: Response) -> Result<Reply<T>, ClientError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Ok(Reply::Unauthorized);
    }
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(Reply::Done(serde_json::from_str(&text)?))
}

#[async_trait]
impl FileBackend for ApiClient {
    async fn presign_upload(&self, req: &PresignRequest) -> Result<PresignResponse, BackendError> {
        Ok(self
            .request(Method::POST, "/files/presign", &[], Some(req))
            .await?)
    }

    async fn put_object(
        &self,
        put_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .put(put_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(ClientError::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn presign_download(
        &self,
        req: &DownloadPresignRequest,
    ) -> Result<DownloadPresignResponse, BackendError> {
        Ok(self
            .request(Method::POST, "/files/download-presign", &[], Some(req))
            .await?)
    }
}

#[async_trait]
impl LinkPreviewSource for ApiClient {
    async fn link_preview(&self, url: &str) -> Result<LinkPreview, BackendError> {
        Ok(self
            .request::<_, ()>(Method::GET, "/link/preview", &[("url", url)], None)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Recorded, StubServer};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn client(base: &str) -> (ApiClient, TempDir) {
        let dir = TempDir::new().unwrap();
        let session = Session::open(TokenStore::new(dir.path().join("token"))).unwrap();
        (
            ApiClient::new(base, Duration::from_secs(5), session).unwrap(),
            dir,
        )
    }

    fn signed_in(base: &str, token: &str) -> (ApiClient, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.save(token).unwrap();
        let session = Session::open(store).unwrap();
        (
            ApiClient::new(base, Duration::from_secs(5), session).unwrap(),
            dir,
        )
    }

    const PREVIEW: &str = r#"{"url":"https://x.com","title":"X"}"#;

    #[tokio::test]
    async fn api_calls_carry_the_bearer_token() {
        let server = StubServer::start(|_| (200, PREVIEW.to_string())).await;
        let (client, _dir) = signed_in(&server.url("/api"), "tok");

        let preview = client.link_preview("https://x.com").await.unwrap();
        assert_eq!(preview.title.as_deref(), Some("X"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/link/preview?url=https%3A%2F%2Fx.com");
        assert_eq!(requests[0].header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn presign_posts_camel_case_json() {
        let server = StubServer::start(|_| {
            (
                200,
                r#"{"putUrl":"https://s/put","key":"posts/7/a.png","fileUrl":"https://cdn/a.png"}"#
                    .to_string(),
            )
        })
        .await;
        let (client, _dir) = signed_in(&server.url("/api"), "tok");

        let presigned = client
            .presign_upload(&PresignRequest {
                board_code: clubsite_engine::BoardCode::Notice,
                post_id: 7,
                content_type: "image/png".into(),
                original_filename: "a.png".into(),
            })
            .await
            .unwrap();
        assert_eq!(presigned.key, "posts/7/a.png");

        let request = &server.requests()[0];
        assert_eq!(request.line(), "POST /api/files/presign");
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "boardCode": "NOTICE",
                "postId": 7,
                "contentType": "image/png",
                "originalFilename": "a.png",
            })
        );
    }

    #[tokio::test]
    async fn storage_put_sends_no_token_and_keeps_content_type() {
        let server = StubServer::start(|_| (200, String::new())).await;
        let (client, _dir) = signed_in(&server.url("/api"), "tok");

        client
            .put_object(&server.url("/put/a.png?sig=1"), "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        let request = &server.requests()[0];
        assert_eq!(request.line(), "PUT /put/a.png?sig=1");
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.header("content-type"), Some("image/png"));
        assert_eq!(request.body, vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn rejected_put_is_a_status_error() {
        let server = StubServer::start(|_| (403, "signature expired".to_string())).await;
        let (client, _dir) = signed_in(&server.url("/api"), "tok");

        let err = client
            .put_object(&server.url("/put/a.png"), "image/png", vec![0])
            .await
            .unwrap_err();
        assert!(
            matches!(&err, BackendError::Status { status: 403, body } if body == "signature expired"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn unauthorized_call_refreshes_and_retries_once() {
        let server = StubServer::start(|req| {
            if req.path == "/api/members/refresh" {
                (200, r#"{"token":"fresh"}"#.to_string())
            } else if req.header("authorization") == Some("Bearer fresh") {
                (200, PREVIEW.to_string())
            } else {
                (401, String::new())
            }
        })
        .await;
        let (client, dir) = signed_in(&server.url("/api"), "stale");

        let preview = client.link_preview("https://x.com").await.unwrap();
        assert_eq!(preview.title.as_deref(), Some("X"));

        let requests = server.requests();
        let lines: Vec<_> = requests.iter().map(Recorded::line).collect();
        assert_eq!(
            lines,
            vec![
                "GET /api/link/preview?url=https%3A%2F%2Fx.com",
                "POST /api/members/refresh",
                "GET /api/link/preview?url=https%3A%2F%2Fx.com",
            ]
        );
        assert_eq!(requests[0].header("authorization"), Some("Bearer stale"));
        assert_eq!(requests[1].header("authorization"), None);
        assert_eq!(requests[2].header("authorization"), Some("Bearer fresh"));
        assert_eq!(client.session().token().as_deref(), Some("fresh"));
        assert_eq!(
            TokenStore::new(dir.path().join("token")).load().unwrap().as_deref(),
            Some("fresh")
        );
    }

    #[tokio::test]
    async fn second_401_after_refresh_gives_up() {
        let server = StubServer::start(|req| {
            if req.path == "/api/members/refresh" {
                (200, r#"{"token":"fresh"}"#.to_string())
            } else {
                (401, String::new())
            }
        })
        .await;
        let (client, _dir) = signed_in(&server.url("/api"), "stale");

        let err = client.get_post(3).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn non_2xx_api_reply_keeps_status_and_body() {
        let server = StubServer::start(|_| (500, "boom".to_string())).await;
        let (client, _dir) = signed_in(&server.url("/api"), "tok");

        let err = client.get_post(3).await.unwrap_err();
        assert!(
            matches!(&err, ClientError::Status { status: 500, body } if body == "boom"),
            "{err:?}"
        );
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn endpoints_keep_the_base_path() {
        let (client, _dir) = client("http://localhost:8080/api/");
        assert_eq!(
            client.endpoint("/files/presign").unwrap().as_str(),
            "http://localhost:8080/api/files/presign"
        );
        assert_eq!(
            client.endpoint("recruit/posts/3").unwrap().as_str(),
            "http://localhost:8080/api/recruit/posts/3"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let session = Session::open(TokenStore::new(dir.path().join("token"))).unwrap();
        let err = ApiClient::new("not a url", Duration::from_secs(5), session).unwrap_err();
        assert!(matches!(err, ClientError::Url { .. }));
    }

    #[test]
    fn from_config_loads_saved_token() {
        let dir = TempDir::new().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "saved").unwrap();
        let config = Config {
            api_base_url: "https://club.example/api".into(),
            token_path,
            request_timeout_secs: 10,
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.session().token().as_deref(), Some("saved"));
    }
}
