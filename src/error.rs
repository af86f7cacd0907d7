use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

// Everything a request can be rejected for. Validation, key mismatch and
// rate limiting all surface as 403 with the reason as a plain-text body;
// a storage fault becomes a 500 and kills only the current request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    KeyMismatch(&'static str),

    #[error("Rate limit reached. Please try again later.")]
    RateLimited,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Database(e) => {
                error!("storage fault: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error\n".to_string(),
                )
                    .into_response()
            }
            rejected => (StatusCode::FORBIDDEN, format!("{rejected}\n")).into_response(),
        }
    }
}
