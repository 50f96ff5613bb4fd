//! Response types (Serialize)

use medassist_core::{PriceReportSummary, PriceStatsCatalog, StrategyCatalog, StrategyLookup};
use serde::Serialize;

/// `GET /medication-strategy` returns one of two shapes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StrategyResponse {
    Catalog(StrategyCatalog),
    Lookup(StrategyLookup),
}

/// `GET /price-reports` returns one of two shapes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PriceReportsResponse {
    Summary(PriceReportSummary),
    Catalog(PriceStatsCatalog),
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub backend: &'static str,
}
