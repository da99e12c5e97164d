//! repocache-server: GitHub repository listings with a PostgreSQL fallback cache
//!
//! Serves `GET /users/{username}/repos`. Fresh upstream results are written
//! through to the cache; when GitHub has nothing, refuses, or does not know
//! the user, the cached copy is served instead.

pub mod db;
pub mod http;
pub mod models;
pub mod service;
pub mod state;
pub mod upstream;

pub use db::{MemoryRepoStore, PgRepoStore, RepoStore, StoreError};
pub use http::{build_router, run_server, RateLimitConfig, RateLimiter, ServerConfig, ServerError};
pub use models::Repository;
pub use state::AppState;
pub use upstream::{GitHubClient, GitHubConfig, UpstreamClient, UpstreamError};
