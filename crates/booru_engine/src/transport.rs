use std::time::Duration;

use booru_core::{PageKey, Post, Query, UserSummary};
use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::decode::{decode_json, decode_text};
use crate::{FailureKind, HtmlPage, TransportError};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "https://konachan.net".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 8 * 1024 * 1024,
            user_agent: concat!("booru/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Remote image board API.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Site root every endpoint and page URL is resolved against.
    fn base_url(&self) -> &Url;

    async fn fetch_posts(
        &self,
        query: &Query,
        page: PageKey,
        limit: usize,
    ) -> Result<Vec<Post>, TransportError>;

    async fn fetch_user_by_name(&self, name: &str) -> Result<Vec<UserSummary>, TransportError>;

    async fn fetch_html(&self, url: &str) -> Result<HtmlPage, TransportError>;
}

/// HTML profile page of an account.
pub fn profile_url(base: &Url, user_id: u64) -> Result<Url, TransportError> {
    join(base, &format!("user/show/{user_id}"))
}

/// Avatar image of an account.
pub fn avatar_url(base: &Url, user_id: u64) -> Result<Url, TransportError> {
    join(base, &format!("data/avatars/{user_id}.jpg"))
}

fn join(base: &Url, path: &str) -> Result<Url, TransportError> {
    base.join(path)
        .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    base_url: Url,
    client: reqwest::Client,
}

struct Body {
    bytes: BytesMut,
    content_type: Option<String>,
    final_url: String,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;
        // Relative joins replace the last segment unless the path ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    async fn get(&self, url: Url) -> Result<Body, TransportError> {
        booru_logging::booru_debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(Body {
            bytes,
            content_type,
            final_url,
        })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch_posts(
        &self,
        query: &Query,
        page: PageKey,
        limit: usize,
    ) -> Result<Vec<Post>, TransportError> {
        let mut url = join(&self.base_url, "post.json")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string())
            .append_pair("tags", &query.to_query_string());
        let body = self.get(url).await?;
        Ok(decode_json(&body.bytes)?)
    }

    async fn fetch_user_by_name(&self, name: &str) -> Result<Vec<UserSummary>, TransportError> {
        let mut url = join(&self.base_url, "user.json")?;
        url.query_pairs_mut().append_pair("name", name);
        let body = self.get(url).await?;
        Ok(decode_json(&body.bytes)?)
    }

    async fn fetch_html(&self, url: &str) -> Result<HtmlPage, TransportError> {
        let parsed = Url::parse(url)
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let body = self.get(parsed).await?;
        let html = decode_text(&body.bytes, body.content_type.as_deref())?;
        Ok(HtmlPage {
            url: body.final_url,
            html,
        })
    }
}

fn too_large(max_bytes: u64, actual: u64) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return TransportError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
