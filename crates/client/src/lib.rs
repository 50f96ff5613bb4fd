//! API clients for medassist
//!
//! Wrap the strategy and price report endpoints. Failures never reach the
//! caller: lookups degrade to empty shapes and price reports fall back to a
//! local JSON store.

mod api;
mod cache;
pub mod error;
mod local_store;
mod price_reports;
mod strategy;

#[cfg(test)]
mod strategy_tests;

pub use api::{ApiClient, api_url_from_env};
pub use cache::TtlCache;
pub use error::ClientError;
pub use local_store::{LocalReport, LocalReportStore, default_store_path};
pub use price_reports::{PriceReportClient, PriceReportDraft, SubmitOutcome};
pub use strategy::StrategyClient;
