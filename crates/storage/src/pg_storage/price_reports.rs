//! PriceReportStore implementation for PgStorage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medassist_core::{AggregatedPriceStats, NewPriceReport, PriceReport};
use sqlx::Row;

use super::{PgStorage, usize_to_i64};
use crate::error::StorageError;
use crate::traits::PriceReportStore;

#[async_trait]
impl PriceReportStore for PgStorage {
    async fn recent_reports(
        &self,
        medication_id: &str,
        source: &str,
        limit: usize,
    ) -> Result<Vec<PriceReport>, StorageError> {
        let rows = sqlx::query(
            "SELECT price::float8 AS price, location, report_date, created_at
             FROM price_reports
             WHERE medication_id = $1 AND source = $2
             ORDER BY created_at DESC
             LIMIT $3",
        )
        .bind(medication_id)
        .bind(source)
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PriceReport, StorageError> {
                Ok(PriceReport {
                    price: row.try_get("price")?,
                    location: row.try_get("location")?,
                    report_date: row.try_get("report_date")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn aggregate_stats(
        &self,
        recent_since: DateTime<Utc>,
    ) -> Result<Vec<AggregatedPriceStats>, StorageError> {
        let rows = sqlx::query(
            "SELECT
                medication_id,
                source,
                MIN(price)::float8 AS min_price,
                MAX(price)::float8 AS max_price,
                ROUND(AVG(price), 2)::float8 AS avg_price,
                COUNT(*) AS total_reports,
                COUNT(*) FILTER (WHERE created_at > $1) AS recent_reports
             FROM price_reports
             GROUP BY medication_id, source
             ORDER BY medication_id, source",
        )
        .bind(recent_since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<AggregatedPriceStats, StorageError> {
                Ok(AggregatedPriceStats {
                    medication_id: row.try_get("medication_id")?,
                    source: row.try_get("source")?,
                    min_price: row.try_get("min_price")?,
                    max_price: row.try_get("max_price")?,
                    avg_price: row.try_get("avg_price")?,
                    total_reports: row.try_get("total_reports")?,
                    recent_reports: row.try_get("recent_reports")?,
                })
            })
            .collect()
    }

    async fn insert_report(&self, report: &NewPriceReport) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO price_reports (medication_id, source, price, location, report_date, ip_hash)
             VALUES ($1, $2, $3::numeric, $4, $5, $6)",
        )
        .bind(&report.medication_id)
        .bind(&report.source)
        .bind(report.price)
        .bind(report.location.as_deref())
        .bind(report.report_date)
        .bind(report.ip_hash.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
