//! HTTP transport for the search/scrape API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::{usable_body, RemoteSource};
use crate::config::Config;
use crate::error::RemoteError;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "api-key";

/// reqwest-backed [`RemoteSource`].
#[derive(Debug, Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Builds a client for `base_url`, sending `api_key` on every request.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            let value = HeaderValue::from_str(api_key)
                .map_err(|_| RemoteError::InvalidRequest("API key is not a valid header value".to_string()))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        Self::new(
            &config.api_base,
            &config.api_key,
            Duration::from_secs(config.remote_timeout),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_body(path: &str, response: reqwest::Response) -> Result<Value, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        let body: Value = response.json().await?;
        usable_body(path, body)
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_content(&self, path: &str) -> Result<Value, RemoteError> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        Self::read_body(path, response).await
    }

    async fn post_data(&self, path: &str, params: &Value) -> Result<Value, RemoteError> {
        debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(params).send().await?;
        Self::read_body(path, response).await
    }
}
