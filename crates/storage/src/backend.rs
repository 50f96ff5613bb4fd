//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medassist_core::{
    AggregatedPriceStats, LookupColumn, MedicationStrategy, NewPriceReport, PharmacyAvailability,
    PharmacyFlag, PriceReport, SavingsOption, StrategySummary,
};

use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::pg_storage::PgStorage;
use crate::traits::{PriceReportStore, StrategyStore};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Memory(s) => <MemoryStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Postgres(s) => <PgStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Memory(MemoryStorage),
    Postgres(PgStorage),
}

impl StorageBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(PgStorage::new(database_url).await?))
    }

    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryStorage::new())
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

// ── StrategyStore ────────────────────────────────────────────────

#[async_trait]
impl StrategyStore for StorageBackend {
    async fn list_active_strategies(&self) -> Result<Vec<StrategySummary>, StorageError> {
        dispatch!(self, StrategyStore, list_active_strategies())
    }

    async fn list_pharmacy_flags(&self) -> Result<Vec<PharmacyFlag>, StorageError> {
        dispatch!(self, StrategyStore, list_pharmacy_flags())
    }

    async fn find_medication_id(
        &self,
        column: LookupColumn,
        normalized: &str,
    ) -> Result<Option<String>, StorageError> {
        dispatch!(self, StrategyStore, find_medication_id(column, normalized))
    }

    async fn get_active_strategy(
        &self,
        medication_id: &str,
    ) -> Result<Option<MedicationStrategy>, StorageError> {
        dispatch!(self, StrategyStore, get_active_strategy(medication_id))
    }

    async fn get_savings_options(
        &self,
        medication_id: &str,
    ) -> Result<Vec<SavingsOption>, StorageError> {
        dispatch!(self, StrategyStore, get_savings_options(medication_id))
    }

    async fn get_pharmacy_availability(
        &self,
        medication_id: &str,
    ) -> Result<Vec<PharmacyAvailability>, StorageError> {
        dispatch!(self, StrategyStore, get_pharmacy_availability(medication_id))
    }
}

// ── PriceReportStore ─────────────────────────────────────────────

#[async_trait]
impl PriceReportStore for StorageBackend {
    async fn recent_reports(
        &self,
        medication_id: &str,
        source: &str,
        limit: usize,
    ) -> Result<Vec<PriceReport>, StorageError> {
        dispatch!(self, PriceReportStore, recent_reports(medication_id, source, limit))
    }

    async fn aggregate_stats(
        &self,
        recent_since: DateTime<Utc>,
    ) -> Result<Vec<AggregatedPriceStats>, StorageError> {
        dispatch!(self, PriceReportStore, aggregate_stats(recent_since))
    }

    async fn insert_report(&self, report: &NewPriceReport) -> Result<(), StorageError> {
        dispatch!(self, PriceReportStore, insert_report(report))
    }
}
