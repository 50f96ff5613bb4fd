use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::StrategyQuery;
use crate::response_types::StrategyResponse;

pub async fn get_medication_strategy(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StrategyQuery>, QueryRejection>,
) -> Result<Json<StrategyResponse>, ApiError> {
    let Query(query) = query?;
    let response = match query.identifier() {
        Some(identifier) => {
            StrategyResponse::Lookup(state.strategy_service.lookup(identifier).await?)
        },
        None => StrategyResponse::Catalog(state.strategy_service.get_catalog().await?),
    };
    Ok(Json(response))
}
