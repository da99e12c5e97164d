//! Repository listing endpoint

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::service;
use crate::state::AppState;

/// Response header naming where the records came from (`upstream` or `cache`).
pub const SOURCE_HEADER: &str = "x-repocache-source";

/// GET /users/{username}/repos
async fn list_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let lookup = service::lookup_repos(state.upstream(), state.store(), &username).await?;

    Ok((
        [(SOURCE_HEADER, lookup.source.as_str())],
        Json(lookup.repos),
    )
        .into_response())
}

/// Repository routes
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{username}/repos", get(list_repos))
}
