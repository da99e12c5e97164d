//! HTTP server layer
//!
//! Axum server with:
//! - CORS (any origin)
//! - Request tracing
//! - Inbound rate limiting
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use server::{build_router, run_server, ServerConfig, ServerError};
