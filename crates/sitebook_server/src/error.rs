//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sitebook_core::ServiceError;
use std::fmt::{Display, Formatter};

/// Failure returned by any handler.
///
/// Wraps the core `ServiceError` taxonomy so every route shares one
/// status mapping and one `{ "error": ... }` body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(ServiceError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(ServiceError::Validation(message.into()))
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self(ServiceError::Storage(detail.into()))
    }

    /// - Validation: 400 Bad Request
    /// - NotFound: 404 Not Found
    /// - Conflict: 409 Conflict
    /// - Storage: 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ServiceError::Storage(detail) = &self.0 {
            log::error!("event=http_request module=server status=error detail={detail}");
        }
        (status, Json(json!({ "error": self.0.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sitebook_core::ServiceError;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            ApiError::bad_request("`date` is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ServiceError::NotFound("Bill entry not found".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ServiceError::Conflict("`Cement` already exists".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::internal("disk I/O error").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn storage_detail_is_not_exposed() {
        let response = ApiError::internal("no such table: bill_entries").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal storage error");
    }
}
