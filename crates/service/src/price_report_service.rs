use std::sync::Arc;

use chrono::Duration;
use medassist_core::{
    Clock, PRICE_REPORT_HISTORY_LIMIT, PriceReportSubmission, PriceReportSummary,
    PriceStatsCatalog, RECENT_REPORT_WINDOW_DAYS, SystemClock, client_fingerprint,
    compute_price_stats,
};
use medassist_storage::StorageBackend;
use medassist_storage::traits::PriceReportStore;

use crate::ServiceError;

pub struct PriceReportService {
    storage: Arc<StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl PriceReportService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(storage: Arc<StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Newest reports for one pair plus stats computed over them.
    pub async fn report_summary(
        &self,
        medication_id: &str,
        source: &str,
    ) -> Result<PriceReportSummary, ServiceError> {
        let reports = self
            .storage
            .recent_reports(medication_id, source, PRICE_REPORT_HISTORY_LIMIT)
            .await?;
        let stats =
            compute_price_stats(reports.iter().map(|r| (r.price, r.created_at)), self.clock.now());
        Ok(PriceReportSummary { stats, reports })
    }

    /// Aggregates for every pair that has at least one report.
    pub async fn all_stats(&self) -> Result<PriceStatsCatalog, ServiceError> {
        let since = self.clock.now() - Duration::days(RECENT_REPORT_WINDOW_DAYS);
        let stats = self.storage.aggregate_stats(since).await?;
        Ok(PriceStatsCatalog { stats })
    }

    /// Validate and append a submission. `forwarded_for` is the raw
    /// `X-Forwarded-For` header, if any.
    pub async fn submit(
        &self,
        submission: PriceReportSubmission,
        forwarded_for: Option<&str>,
    ) -> Result<(), ServiceError> {
        let report = submission.validate(client_fingerprint(forwarded_for))?;
        self.storage.insert_report(&report).await?;
        tracing::info!(
            medication_id = %report.medication_id,
            source = %report.source,
            "price report stored"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use medassist_core::{ManualClock, ValidationError};
    use medassist_storage::MemoryStorage;

    use super::*;

    fn service() -> (PriceReportService, MemoryStorage, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()));
        let storage = MemoryStorage::with_clock(clock.clone());
        let backend = Arc::new(StorageBackend::Memory(storage.clone()));
        (PriceReportService::with_clock(backend, clock.clone()), storage, clock)
    }

    fn submission(price: serde_json::Value) -> PriceReportSubmission {
        serde_json::from_value(serde_json::json!({
            "medicationId": "tacrolimus",
            "source": "costco",
            "price": price,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_summary_empty_pair() {
        let (svc, _, _) = service();
        let summary = svc.report_summary("tacrolimus", "costco").await.unwrap();
        assert_eq!(summary, PriceReportSummary::default());
    }

    #[tokio::test]
    async fn test_submit_then_summary() {
        let (svc, storage, clock) = service();
        for price in [10, 20, 30] {
            svc.submit(submission(serde_json::json!(price)), Some("203.0.113.9, 10.0.0.1"))
                .await
                .unwrap();
            clock.advance(Duration::hours(1));
        }

        let summary = svc.report_summary("tacrolimus", "costco").await.unwrap();
        let stats = summary.stats.unwrap();
        assert_eq!((stats.min.as_str(), stats.max.as_str(), stats.avg.as_str()), ("10.00", "30.00", "20.00"));
        assert_eq!((stats.count, stats.total), (3, 3));
        assert_eq!(summary.reports[0].price, 30.0);

        let hashes = storage.stored_ip_hashes();
        assert_eq!(hashes.len(), 3);
        assert!(hashes.iter().all(|h| h.as_deref().is_some_and(|h| h.len() == 16)));
    }

    #[tokio::test]
    async fn test_summary_counts_recent_window() {
        let (svc, _, clock) = service();
        svc.submit(submission(serde_json::json!(5)), None).await.unwrap();
        clock.advance(Duration::days(100));
        svc.submit(submission(serde_json::json!(15)), None).await.unwrap();

        let stats = svc.report_summary("tacrolimus", "costco").await.unwrap().stats.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total, 2);

        let all = svc.all_stats().await.unwrap();
        assert_eq!(all.stats.len(), 1);
        assert_eq!(all.stats[0].recent_reports, 1);
        assert_eq!(all.stats[0].total_reports, 2);
    }

    #[tokio::test]
    async fn test_submit_rejects_without_writing() {
        let (svc, storage, _) = service();
        for (price, expected) in [
            (serde_json::json!(0), ValidationError::MissingFields),
            (serde_json::json!(-5), ValidationError::InvalidPrice),
            (serde_json::json!(100_001), ValidationError::InvalidPrice),
            (serde_json::json!("abc"), ValidationError::InvalidPrice),
        ] {
            let err = svc.submit(submission(price), None).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(ref e) if *e == expected), "{err}");
        }
        assert_eq!(storage.report_count(), 0);
    }
}
