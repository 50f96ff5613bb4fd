use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use medassist_core::{PriceReportSubmission, SubmitResponse, ValidationError};

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::PriceReportQuery;
use crate::response_types::PriceReportsResponse;

const FORWARDED_FOR: &str = "x-forwarded-for";

pub async fn get_price_reports(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PriceReportQuery>, QueryRejection>,
) -> Result<Json<PriceReportsResponse>, ApiError> {
    let Query(query) = query?;
    let response = match query.pair() {
        Some((medication_id, source)) => PriceReportsResponse::Summary(
            state.price_report_service.report_summary(medication_id, source).await?,
        ),
        None => PriceReportsResponse::Catalog(state.price_report_service.all_stats().await?),
    };
    Ok(Json(response))
}

/// The body is parsed by hand so a malformed payload gets the same JSON
/// error shape as a validation failure.
pub async fn submit_price_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let submission: PriceReportSubmission = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "malformed price report body");
        ValidationError::MalformedBody
    })?;
    let forwarded_for = headers.get(FORWARDED_FOR).and_then(|v| v.to_str().ok());
    state.price_report_service.submit(submission, forwarded_for).await?;
    Ok((StatusCode::CREATED, Json(SubmitResponse::submitted())))
}
