//! HTTP error mapping for admin handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type returned by admin handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Admin API errors
///
/// Wraps the shared error type so repository code can use `?` freely and
/// the HTTP status is chosen in one place.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Common(#[from] hazard_common::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Common(hazard_common::Error::Database(e))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use hazard_common::Error;

        match self {
            ApiError::Common(Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Common(Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazard_common::Error;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(Error::not_found("Hazard category", "FL - HIG")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(Error::InvalidInput("bad token".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
