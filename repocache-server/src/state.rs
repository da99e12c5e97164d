//! Application state shared across handlers

use std::sync::Arc;

use crate::db::RepoStore;
use crate::http::rate_limit::RateLimiter;
use crate::upstream::UpstreamClient;

/// Shared application state
///
/// Every dependency is constructed by the caller and injected here; there
/// are no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    upstream: Arc<dyn UpstreamClient>,
    store: Arc<dyn RepoStore>,
    limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        store: Arc<dyn RepoStore>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                upstream,
                store,
                limiter,
            }),
        }
    }

    pub fn upstream(&self) -> &dyn UpstreamClient {
        self.inner.upstream.as_ref()
    }

    pub fn store(&self) -> &dyn RepoStore {
        self.inner.store.as_ref()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }
}
