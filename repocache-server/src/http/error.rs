//! API error types with IntoResponse
//!
//! Every failure becomes a JSON body with either a `message` or an `error`
//! field. Internal causes are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::service::LookupError;

const NO_REPOS_MESSAGE: &str = "User found but has no repos";
const USER_NOT_FOUND_MESSAGE: &str = "GitHub user not found";
const RATE_LIMITED_MESSAGE: &str = "GitHub rate limited or forbidden";
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch repos";
const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests, please try again later.";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Upstream knows the user, nothing upstream or cached (404)
    NoRepos,

    /// Upstream 404 and nothing cached (404)
    UserNotFound,

    /// Upstream 403 and nothing cached (403)
    RateLimited {
        remaining: Option<String>,
        reset: Option<String>,
    },

    /// Upstream status passed through as-is
    Upstream { status: u16, message: String },

    /// Inbound quota exhausted (429)
    TooManyRequests,

    /// Internal error (500, logged)
    Internal { message: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitedBody<'a> {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_remaining: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_reset: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::NoRepos => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": NO_REPOS_MESSAGE })),
            )
                .into_response(),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": USER_NOT_FOUND_MESSAGE })),
            )
                .into_response(),
            Self::RateLimited { remaining, reset } => (
                StatusCode::FORBIDDEN,
                Json(RateLimitedBody {
                    message: RATE_LIMITED_MESSAGE,
                    rate_remaining: remaining.as_deref(),
                    rate_reset: reset.as_deref(),
                }),
            )
                .into_response(),
            Self::Upstream { status, message } => {
                // Unrepresentable codes degrade to 502.
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(json!({ "message": message }))).into_response()
            }
            Self::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": TOO_MANY_REQUESTS_MESSAGE })),
            )
                .into_response(),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": FETCH_FAILED_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NoRepos => Self::NoRepos,
            LookupError::UserNotFound => Self::UserNotFound,
            LookupError::RateLimited { remaining, reset } => Self::RateLimited { remaining, reset },
            LookupError::Upstream { status, message } => Self::Upstream { status, message },
            other @ (LookupError::Transport(_) | LookupError::Storage(_)) => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn user_not_found_is_404_with_message() {
        let response = ApiError::UserNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "GitHub user not found" })
        );
    }

    #[tokio::test]
    async fn no_repos_is_404() {
        let response = ApiError::NoRepos.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["message"],
            "User found but has no repos"
        );
    }

    #[tokio::test]
    async fn rate_limited_is_403_with_hints() {
        let response = ApiError::RateLimited {
            remaining: Some("0".into()),
            reset: Some("1700000000".into()),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "GitHub rate limited or forbidden",
                "rateRemaining": "0",
                "rateReset": "1700000000"
            })
        );
    }

    #[tokio::test]
    async fn rate_limited_omits_missing_hints() {
        let response = ApiError::RateLimited {
            remaining: None,
            reset: None,
        }
        .into_response();
        assert_eq!(
            body_json(response).await,
            json!({ "message": "GitHub rate limited or forbidden" })
        );
    }

    #[tokio::test]
    async fn upstream_status_passes_through() {
        let response = ApiError::Upstream {
            status: 451,
            message: "Repository access blocked".into(),
        }
        .into_response();
        assert_eq!(response.status().as_u16(), 451);
        assert_eq!(
            body_json(response).await["message"],
            "Repository access blocked"
        );
    }

    #[tokio::test]
    async fn invalid_upstream_status_becomes_502() {
        let response = ApiError::Upstream {
            status: 1000,
            message: "?".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn internal_error_hides_cause() {
        let response = ApiError::Internal {
            message: "connection refused on 10.0.0.5".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Failed to fetch repos" })
        );
    }

    #[tokio::test]
    async fn too_many_requests_is_429() {
        let response = ApiError::TooManyRequests.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await["error"],
            "Too many requests, please try again later."
        );
    }
}
