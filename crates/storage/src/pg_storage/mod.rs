//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

mod price_reports;
mod strategies;

use std::time::Duration;

use medassist_core::{
    MedicationStrategy, PharmacyAvailability, SavingsOption, StrategySummary,
    PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS,
    env_parse_with_default,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::error::StorageError;

use super::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect and apply migrations.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let storage = Self::connect(database_url).await?;
        run_pg_migrations(&storage.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!("PgStorage initialized");
        Ok(storage)
    }

    /// Connect without touching the schema.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let max_connections =
            env_parse_with_default("MEDASSIST_PG_MAX_CONNECTIONS", PG_POOL_MAX_CONNECTIONS);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Decode a JSONB string array; a malformed value decodes as empty.
pub(crate) fn parse_json_list(val: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(val.clone()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "corrupt JSON list in DB, treating as empty");
        Vec::new()
    })
}

/// Convert `usize` to `i64` for SQL LIMIT binds.
pub(crate) fn usize_to_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}

pub(crate) fn row_to_summary(row: &PgRow) -> Result<StrategySummary, StorageError> {
    Ok(StrategySummary {
        medication_id: row.try_get("medication_id")?,
        generic_name: row.try_get("generic_name")?,
        brand_name: row.try_get("brand_name")?,
        category: row.try_get("category")?,
        condition: row.try_get("condition")?,
        retail_price_low: row.try_get("retail_price_low")?,
        retail_price_high: row.try_get("retail_price_high")?,
    })
}

pub(crate) fn row_to_strategy(row: &PgRow) -> Result<MedicationStrategy, StorageError> {
    let common_mistakes: serde_json::Value = row.try_get("common_mistakes")?;
    Ok(MedicationStrategy {
        medication_id: row.try_get("medication_id")?,
        generic_name: row.try_get("generic_name")?,
        brand_name: row.try_get("brand_name")?,
        category: row.try_get("category")?,
        condition: row.try_get("condition")?,
        retail_price_low: row.try_get("retail_price_low")?,
        retail_price_high: row.try_get("retail_price_high")?,
        retail_price_note: row.try_get("retail_price_note")?,
        common_mistakes: parse_json_list(&common_mistakes),
        savings_options: Vec::new(),
    })
}

pub(crate) fn row_to_savings_option(row: &PgRow) -> Result<SavingsOption, StorageError> {
    let steps: serde_json::Value = row.try_get("steps")?;
    let documents: serde_json::Value = row.try_get("documents_needed")?;
    Ok(SavingsOption {
        id: row.try_get("id")?,
        option_type: row.try_get("option_type")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        estimated_cost_cents: row.try_get("estimated_cost_cents")?,
        estimated_cost_note: row.try_get("estimated_cost_note")?,
        eligibility_criteria: row.try_get("eligibility_criteria")?,
        steps: parse_json_list(&steps),
        documents_needed: parse_json_list(&documents),
        url: row.try_get("url")?,
        phone: row.try_get("phone")?,
        insurance_types: row.try_get("insurance_types")?,
    })
}

pub(crate) fn row_to_availability(row: &PgRow) -> Result<PharmacyAvailability, StorageError> {
    Ok(PharmacyAvailability {
        pharmacy: row.try_get("pharmacy")?,
        is_available: row.try_get("is_available")?,
        price_cents: row.try_get("price_cents")?,
        price_note: row.try_get("price_note")?,
        url: row.try_get("url")?,
    })
}

pub(crate) const SUMMARY_COLUMNS: &str = "medication_id, generic_name, brand_name, category,
     condition, retail_price_low, retail_price_high";

pub(crate) const STRATEGY_COLUMNS: &str = "medication_id, generic_name, brand_name, category,
     condition, retail_price_low, retail_price_high, retail_price_note, common_mistakes";

pub(crate) const SAVINGS_COLUMNS: &str = "id, option_type, name, description,
     estimated_cost_cents, estimated_cost_note, eligibility_criteria, steps,
     documents_needed, url, phone, insurance_types";
