//! Liveness check, not rate limited

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Cache backend in use (`postgres` or `memory`)
    pub cache: &'static str,
}

/// GET /health
///
/// Answers without touching GitHub or the database.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache: state.store().backend(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
