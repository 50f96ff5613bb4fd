use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medassist_core::{AggregatedPriceStats, NewPriceReport, PriceReport};

use crate::error::StorageError;

/// Append-only price report log.
#[async_trait]
pub trait PriceReportStore: Send + Sync {
    /// Newest reports first, at most `limit`.
    async fn recent_reports(
        &self,
        medication_id: &str,
        source: &str,
        limit: usize,
    ) -> Result<Vec<PriceReport>, StorageError>;

    /// Per-(medication, source) statistics over all reports. Reports created
    /// after `recent_since` count towards `recent_reports`.
    async fn aggregate_stats(
        &self,
        recent_since: DateTime<Utc>,
    ) -> Result<Vec<AggregatedPriceStats>, StorageError>;

    /// Append one report. `created_at` is assigned by the backend.
    async fn insert_report(&self, report: &NewPriceReport) -> Result<(), StorageError>;
}
