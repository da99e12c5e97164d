//! GitHub REST client for the repositories-by-user endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, Response, StatusCode,
};
use serde_json::Value;
use tracing::debug;

use super::{UpstreamClient, UpstreamError};
use crate::models::UpstreamRepo;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ERROR_MESSAGE: &str = "GitHub API error";

/// GitHub's page size ceiling for list endpoints.
const REPOS_PER_PAGE: u32 = 100;

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API root, without trailing slash (default: https://api.github.com)
    pub api_base: String,
    /// Bearer token; `None` means anonymous rate limits
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Error building a [`GitHubClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("GitHub token is not a valid header value")]
    InvalidToken(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// GitHub API client, authenticated or anonymous.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, ClientBuildError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("repocache"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl UpstreamClient for GitHubClient {
    async fn fetch_repos(&self, username: &str) -> Result<Vec<UpstreamRepo>, UpstreamError> {
        let url = repos_url(&self.api_base, username);
        debug!(%username, %url, "fetching repositories from GitHub");

        let response = self
            .client
            .get(&url)
            .query(&[("per_page", REPOS_PER_PAGE)])
            .send()
            .await?;

        let status = response.status();
        debug!(%username, status = status.as_u16(), "GitHub responded");

        if status.is_success() {
            let body: Value = response.json().await?;
            return decode_repos(body);
        }

        Err(classify_failure(response).await)
    }
}

/// Build the repositories URL with `username` percent-escaped as a single
/// path segment.
pub fn repos_url(api_base: &str, username: &str) -> String {
    format!(
        "{}/users/{}/repos",
        api_base.trim_end_matches('/'),
        urlencoding::encode(username)
    )
}

/// A non-array body counts as "no repositories".
fn decode_repos(body: Value) -> Result<Vec<UpstreamRepo>, UpstreamError> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(UpstreamError::from),
        _ => Ok(Vec::new()),
    }
}

async fn classify_failure(response: Response) -> UpstreamError {
    match response.status() {
        StatusCode::NOT_FOUND => UpstreamError::NotFound,
        StatusCode::FORBIDDEN => UpstreamError::RateLimited {
            remaining: header_string(&response, "x-ratelimit-remaining"),
            reset: header_string(&response, "x-ratelimit-reset"),
        },
        status => {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

            UpstreamError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn header_string(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
