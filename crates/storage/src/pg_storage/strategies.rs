//! StrategyStore implementation for PgStorage.

use async_trait::async_trait;
use medassist_core::{
    LookupColumn, MedicationStrategy, PharmacyAvailability, PharmacyFlag, SavingsOption,
    StrategySummary,
};
use sqlx::Row;

use super::{
    PgStorage, SAVINGS_COLUMNS, STRATEGY_COLUMNS, SUMMARY_COLUMNS, row_to_availability,
    row_to_savings_option, row_to_strategy, row_to_summary,
};
use crate::error::StorageError;
use crate::traits::StrategyStore;

#[async_trait]
impl StrategyStore for PgStorage {
    async fn list_active_strategies(&self) -> Result<Vec<StrategySummary>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM medication_strategies
             WHERE is_active = TRUE
             ORDER BY brand_name"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_summary).collect()
    }

    async fn list_pharmacy_flags(&self) -> Result<Vec<PharmacyFlag>, StorageError> {
        let rows = sqlx::query(
            "SELECT medication_id, pharmacy, is_available
             FROM pharmacy_availability",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> Result<PharmacyFlag, StorageError> {
                Ok(PharmacyFlag {
                    medication_id: row.try_get("medication_id")?,
                    pharmacy: row.try_get("pharmacy")?,
                    is_available: row.try_get("is_available")?,
                })
            })
            .collect()
    }

    async fn find_medication_id(
        &self,
        column: LookupColumn,
        normalized: &str,
    ) -> Result<Option<String>, StorageError> {
        // Column name comes from a closed enum, never from the request.
        // NFKC then trim then lowercase, the same folding as
        // `normalize_medication_key`. NORMALIZE needs PostgreSQL 13+ on a UTF8 database.
        let col = column.column_name();
        let id: Option<String> = sqlx::query_scalar(&format!(
            "SELECT medication_id
             FROM medication_strategies
             WHERE is_active = TRUE AND LOWER(TRIM(NORMALIZE({col}, NFKC))) = $1
             ORDER BY medication_id
             LIMIT 1"
        ))
        .bind(normalized)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_active_strategy(
        &self,
        medication_id: &str,
    ) -> Result<Option<MedicationStrategy>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {STRATEGY_COLUMNS}
             FROM medication_strategies
             WHERE medication_id = $1 AND is_active = TRUE"
        ))
        .bind(medication_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_strategy).transpose()
    }

    async fn get_savings_options(
        &self,
        medication_id: &str,
    ) -> Result<Vec<SavingsOption>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SAVINGS_COLUMNS}
             FROM savings_options
             WHERE medication_id = $1 AND is_active = TRUE
             ORDER BY priority DESC, id"
        ))
        .bind(medication_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_savings_option).collect()
    }

    async fn get_pharmacy_availability(
        &self,
        medication_id: &str,
    ) -> Result<Vec<PharmacyAvailability>, StorageError> {
        let rows = sqlx::query(
            "SELECT pharmacy, is_available, price_cents, price_note, url
             FROM pharmacy_availability
             WHERE medication_id = $1",
        )
        .bind(medication_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_availability).collect()
    }
}
