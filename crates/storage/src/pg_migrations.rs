//! PostgreSQL schema migrations for medassist storage.
//!
//! Every statement is idempotent so the migration can run on each start.

use sqlx::PgPool;

use crate::error::StorageError;

/// Run all PostgreSQL migrations.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS medication_strategies (
            medication_id TEXT PRIMARY KEY,
            generic_name TEXT NOT NULL,
            brand_name TEXT,
            category TEXT,
            condition TEXT,
            retail_price_low INTEGER,
            retail_price_high INTEGER,
            retail_price_note TEXT,
            common_mistakes JSONB NOT NULL DEFAULT '[]',
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_strategies_generic_lower
         ON medication_strategies (LOWER(generic_name))",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_strategies_brand_lower
         ON medication_strategies (LOWER(brand_name))",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS savings_options (
            id BIGSERIAL PRIMARY KEY,
            medication_id TEXT NOT NULL REFERENCES medication_strategies (medication_id),
            option_type TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            estimated_cost_cents INTEGER,
            estimated_cost_note TEXT,
            eligibility_criteria TEXT,
            steps JSONB NOT NULL DEFAULT '[]',
            documents_needed JSONB NOT NULL DEFAULT '[]',
            url TEXT,
            phone TEXT,
            insurance_types TEXT[] NOT NULL DEFAULT '{}',
            priority INTEGER NOT NULL DEFAULT 0,
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_savings_med_priority
         ON savings_options (medication_id, priority DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pharmacy_availability (
            medication_id TEXT NOT NULL REFERENCES medication_strategies (medication_id),
            pharmacy TEXT NOT NULL,
            is_available BOOLEAN NOT NULL DEFAULT FALSE,
            price_cents INTEGER,
            price_note TEXT,
            url TEXT,
            UNIQUE (medication_id, pharmacy)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS price_reports (
            id BIGSERIAL PRIMARY KEY,
            medication_id TEXT NOT NULL,
            source TEXT NOT NULL,
            price NUMERIC(10, 2) NOT NULL CHECK (price > 0 AND price <= 100000),
            location TEXT,
            report_date DATE,
            ip_hash TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_price_reports_pair
         ON price_reports (medication_id, source, created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::debug!("PostgreSQL migrations applied");
    Ok(())
}
