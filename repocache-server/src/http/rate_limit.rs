//! Inbound fixed-window rate limiting per client
//!
//! Each client identity gets `max_requests` per `window`. The counter resets
//! when the window that started with the client's first request elapses.
//! Responses carry `RateLimit-Limit`, `RateLimit-Remaining` and
//! `RateLimit-Reset`; rejections add `Retry-After`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::error::ApiError;

/// Default quota: 30 requests per minute.
pub const DEFAULT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_MAX_REQUESTS: u32 = 30;

/// Bucket count above which expired windows are swept on insert.
const PRUNE_THRESHOLD: usize = 1024;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    /// Key clients by the first `X-Forwarded-For` entry. Only safe behind a
    /// proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            max_requests: DEFAULT_MAX_REQUESTS,
            trust_forwarded_for: false,
        }
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_after: Duration },
    Limited { reset_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Shared limiter; clones share the same counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `client` now.
    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Decision {
        let window = self.config.window;
        // Counters stay consistent even if a holder panicked.
        let mut buckets = self.buckets.lock().unwrap_or_else(|p| p.into_inner());

        if buckets.len() > PRUNE_THRESHOLD {
            buckets.retain(|_, w| now.duration_since(w.started) < window);
        }

        let bucket = buckets.entry(client.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(bucket.started) >= window {
            *bucket = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = window.saturating_sub(now.duration_since(bucket.started));

        if bucket.count >= self.config.max_requests {
            return Decision::Limited { reset_after };
        }

        bucket.count += 1;
        Decision::Allowed {
            remaining: self.config.max_requests - bucket.count,
            reset_after,
        }
    }

    /// Identity used to bucket `request`.
    pub fn client_key(&self, request: &Request) -> String {
        if self.config.trust_forwarded_for {
            if let Some(forwarded) = request
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return forwarded.to_owned();
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
    }
}

/// Middleware rejecting requests over quota before the handler runs.
pub async fn rate_limit(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let client = limiter.client_key(&request);
    let limit = limiter.config().max_requests;

    match limiter.check(&client) {
        Decision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            set_quota_headers(response.headers_mut(), limit, remaining, reset_after);
            response
        }
        Decision::Limited { reset_after } => {
            warn!(%client, "inbound rate limit exceeded");
            let mut response = ApiError::TooManyRequests.into_response();
            let headers = response.headers_mut();
            set_quota_headers(headers, limit, 0, reset_after);
            headers.insert("retry-after", HeaderValue::from(ceil_secs(reset_after)));
            response
        }
    }
}

fn set_quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    headers.insert("ratelimit-limit", HeaderValue::from(limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(ceil_secs(reset_after)));
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
