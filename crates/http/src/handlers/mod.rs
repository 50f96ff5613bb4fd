#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod price_reports;
pub mod strategies;

use axum::http::StatusCode;

use crate::api_error::ApiError;

/// CORS preflight. Headers come from the route's response layers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
