use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::friends::RepositoryError;
use crate::scraper::ScrapeError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// A payload broke a business rule; rendered as a 400 with its own label.
    Validation(String),
    NotFound(String),
    GatewayTimeout(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation Error",
            _ => self.status().canonical_reason().unwrap_or("Error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let label = self.label();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::GatewayTimeout(msg)
            | ApiError::Internal(msg) => msg,
        };
        (
            status,
            Json(serde_json::json!({ "error": label, "message": message })),
        )
            .into_response()
    }
}

impl From<ScrapeError> for ApiError {
    fn from(value: ScrapeError) -> Self {
        match value {
            ScrapeError::Http(err) if err.is_timeout() => {
                error!(error = %err, "upstream request timed out");
                ApiError::GatewayTimeout("Upstream page did not respond in time".into())
            }
            ScrapeError::Http(err) => {
                error!(error = %err, "upstream request failed");
                ApiError::Internal("Failed to fetch upstream page".into())
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateId(_) => ApiError::Validation("ID already exists.".into()),
            RepositoryError::NotFound(id) => {
                ApiError::NotFound(format!("Friend with ID {id} not found"))
            }
            RepositoryError::Io(_) | RepositoryError::Json(_) | RepositoryError::Task(_) => {
                error!(error = %value, "friend storage failure");
                ApiError::Internal("Friend storage is unavailable".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::DuplicateId(3).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Validation(ref msg) if msg == "ID already exists."));
        let err: ApiError = RepositoryError::NotFound(3).into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Friend with ID 3 not found"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::GatewayTimeout("slow".into()).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = ApiError::Validation("Invalid email format.".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(body["message"], "Invalid email format.");
    }

    #[tokio::test]
    async fn test_bad_request_body() {
        let body = body_json(ApiError::BadRequest("Missing required fields".into()).into_response()).await;
        assert_eq!(body["error"], "Bad Request");
    }
}
