//! Upstream repository source
//!
//! [`UpstreamClient`] is the seam between the request handler and GitHub.
//! The server holds it as a trait object so tests can swap in a fake.

pub mod github;

use async_trait::async_trait;

use crate::models::UpstreamRepo;

pub use github::{GitHubClient, GitHubConfig};

/// Failure fetching repositories from upstream.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream answered 404.
    #[error("upstream user not found")]
    NotFound,

    /// Upstream answered 403. Header hints are passed through untouched.
    #[error("upstream rate limited or forbidden (remaining: {remaining:?}, reset: {reset:?})")]
    RateLimited {
        remaining: Option<String>,
        reset: Option<String>,
    },

    /// Any other non-2xx answer.
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    /// No usable response: connect failure, timeout, broken body.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response array did not have the repository shape.
    #[error("upstream payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of a user's repositories.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch the repositories owned by `username`, in upstream order.
    async fn fetch_repos(&self, username: &str) -> Result<Vec<UpstreamRepo>, UpstreamError>;
}
