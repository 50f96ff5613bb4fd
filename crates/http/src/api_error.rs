//! Typed API error for HTTP handlers.
//!
//! Converts domain errors into HTTP responses with a `{"error": "..."}` body.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medassist_core::ValidationError;
use medassist_core::reporting::{ReportContext, report_error};
use medassist_service::ServiceError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// `Internal` reports the real error server-side and returns a static
/// message to the client.
#[derive(Debug)]
pub enum ApiError {
    /// 400, message is returned verbatim.
    BadRequest(String),
    /// 404 for unknown paths.
    NotFound,
    /// 405 for any method a route does not serve.
    MethodNotAllowed,
    /// 500, details reported but not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            Self::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE.to_owned())
            },
            Self::Internal(err) => {
                report_error(&*err, &ReportContext::new("http"));
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Malformed query strings get the JSON error body like every other 400.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(e) => e.into(),
            ServiceError::Storage(e) => Self::Internal(e.into()),
        }
    }
}
