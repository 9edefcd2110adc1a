use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, StatusCode,
};
use serde_json::Value;
use tracing::debug;

use crate::{config::Config, Code, Result};

/// Outcome of probing a single code. All the ways a code can fail to yield
/// data collapse into `Absent`; the distinction only survives as a debug log
/// line inside the fetcher.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Present(Value),
    Absent,
}

/// Why a code came back absent. Never crosses the fetcher boundary.
#[derive(Debug)]
enum AbsentKind {
    Transport,
    Protocol(StatusCode),
    Format,
    Empty,
}

/// Issues one GET per code against the prerequisite endpoint, dressed up as
/// a browser XHR request. The remote service refuses plainer requests, so
/// the header set is reproduced verbatim; `Accept-Encoding` is owned by
/// reqwest's compression features, which also decompress the body for us.
pub struct Fetcher {
    client: Client,
    base_url: String,
    referer_base: String,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .default_headers(static_headers())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            referer_base: config.referer_base.clone(),
        })
    }

    /// Single attempt, no retries. Infallible by design: every failure mode
    /// is classified, logged at debug level and folded into `Absent`.
    pub async fn fetch(&self, code: Code) -> FetchResult {
        match self.try_fetch(code).await {
            Ok(value) => FetchResult::Present(value),
            Err(kind) => {
                debug!(%code, ?kind, "code absent");
                FetchResult::Absent
            }
        }
    }

    async fn try_fetch(&self, code: Code) -> core::result::Result<Value, AbsentKind> {
        let url = format!("{}/{code}", self.base_url);
        let referer = format!("{}/{code}/matriz", self.referer_base);

        let response = self
            .client
            .get(&url)
            .header(header::REFERER, referer)
            .send()
            .await
            .map_err(|_| AbsentKind::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AbsentKind::Protocol(status));
        }

        let value: Value = response.json().await.map_err(|_| AbsentKind::Format)?;
        if is_empty(&value) {
            return Err(AbsentKind::Empty);
        }
        Ok(value)
    }
}

/// The fixed header set the service expects from a browser XHR request.
/// `Referer` is per-request since it embeds the code.
fn static_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert("sec-gpc", HeaderValue::from_static("1"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// "Has any elements" is the presence criterion: empty objects, arrays and
/// strings count as nothing, and so does null. Numbers and booleans pass.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
