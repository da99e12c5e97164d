//! Repository lookup: live upstream first, cache as fallback
//!
//! Fetching → Merging (non-empty upstream result, upserted into the cache)
//! Fetching → Falling Back (empty result, 403, 404: read the cache by owner)
//!
//! Upstream status errors and transport failures never fall back; stale data
//! would hide a genuine upstream problem. A storage failure while falling
//! back counts as "nothing cached".

use tracing::{info, warn};

use crate::db::{RepoStore, StoreError};
use crate::models::Repository;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Where a successful lookup's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Fresh upstream data, just written to the cache
    Upstream,
    /// Previously cached records served in place of upstream data
    Cache,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upstream => "upstream",
            Self::Cache => "cache",
        }
    }
}

/// Successful lookup
#[derive(Debug, Clone)]
pub struct RepoLookup {
    pub source: Source,
    pub repos: Vec<Repository>,
}

/// Terminal failure of a lookup, after any fallback was attempted.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("user found but has no repos")]
    NoRepos,

    #[error("upstream user not found")]
    UserNotFound,

    #[error("upstream rate limited or forbidden")]
    RateLimited {
        remaining: Option<String>,
        reset: Option<String>,
    },

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error(transparent)]
    Transport(UpstreamError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Resolve `username`'s repositories.
pub async fn lookup_repos(
    upstream: &dyn UpstreamClient,
    store: &dyn RepoStore,
    username: &str,
) -> Result<RepoLookup, LookupError> {
    match upstream.fetch_repos(username).await {
        Ok(repos) if !repos.is_empty() => {
            let stored = store.upsert_all(&repos).await?;
            info!(%username, count = stored.len(), "cached upstream repositories");
            Ok(RepoLookup {
                source: Source::Upstream,
                repos: stored,
            })
        }
        Ok(_) => cached_or(store, username, LookupError::NoRepos).await,
        Err(UpstreamError::RateLimited { remaining, reset }) => {
            warn!(%username, ?remaining, ?reset, "upstream rate limited, trying cache");
            cached_or(store, username, LookupError::RateLimited { remaining, reset }).await
        }
        Err(UpstreamError::NotFound) => {
            cached_or(store, username, LookupError::UserNotFound).await
        }
        Err(UpstreamError::Status { status, message }) => {
            warn!(%username, status, %message, "upstream error");
            Err(LookupError::Upstream { status, message })
        }
        Err(err) => Err(LookupError::Transport(err)),
    }
}

/// Cached records for `owner`, or `miss` when there are none.
async fn cached_or(
    store: &dyn RepoStore,
    owner: &str,
    miss: LookupError,
) -> Result<RepoLookup, LookupError> {
    match store.find_by_owner(owner).await {
        Ok(repos) if !repos.is_empty() => {
            info!(%owner, count = repos.len(), "serving cached repositories");
            Ok(RepoLookup {
                source: Source::Cache,
                repos,
            })
        }
        Ok(_) => Err(miss),
        Err(err) => {
            warn!(%owner, error = %err, "cache fallback failed");
            Err(miss)
        }
    }
}
