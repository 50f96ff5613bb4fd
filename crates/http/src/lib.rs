//! HTTP API server for medassist.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]

pub mod api_error;
mod handlers;
mod query_types;
mod response_types;

use std::sync::Arc;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::HeaderValue;
use axum::routing::{MethodRouter, get};
use axum::{Json, Router};
use medassist_service::{PriceReportService, StrategyService};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use response_types::VersionResponse;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub strategy_service: Arc<StrategyService>,
    pub price_report_service: Arc<PriceReportService>,
    /// Storage backend name reported by `/api/version`
    pub backend: &'static str,
}

type StateRouter = MethodRouter<Arc<AppState>>;

/// Fixed CORS headers. Any origin may call the public endpoints.
fn with_cors(route: StateRouter, methods: &'static str) -> StateRouter {
    let route: StateRouter = route.layer(SetResponseHeaderLayer::if_not_present(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    ));
    let route: StateRouter = route.layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    ));
    let route: StateRouter = route.layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    ));
    route.layer(SetResponseHeaderLayer::overriding(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    ))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let strategy_route = get(handlers::strategies::get_medication_strategy)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed);
    let price_route = get(handlers::price_reports::get_price_reports)
        .post(handlers::price_reports::submit_price_report)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed);

    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/medication-strategy", with_cors(strategy_route, "GET, OPTIONS"))
        .route("/price-reports", with_cors(price_route, "GET, POST, OPTIONS"))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION"), backend: state.backend })
}
