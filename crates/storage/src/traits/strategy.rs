use async_trait::async_trait;
use medassist_core::{
    LookupColumn, MedicationStrategy, PharmacyAvailability, PharmacyFlag, SavingsOption,
    StrategySummary,
};

use crate::error::StorageError;

/// Read-only access to medication strategies.
#[async_trait]
pub trait StrategyStore: Send + Sync {
    /// All active strategies, ordered by brand name.
    async fn list_active_strategies(&self) -> Result<Vec<StrategySummary>, StorageError>;

    /// Every availability flag across all medications.
    async fn list_pharmacy_flags(&self) -> Result<Vec<PharmacyFlag>, StorageError>;

    /// Find the `medication_id` of an active strategy whose `column`
    /// folds to `normalized` under `normalize_medication_key`. Stored values
    /// are folded too, so every backend matches the same names.
    async fn find_medication_id(
        &self,
        column: LookupColumn,
        normalized: &str,
    ) -> Result<Option<String>, StorageError>;

    /// Active strategy row, with `savings_options` left empty.
    async fn get_active_strategy(
        &self,
        medication_id: &str,
    ) -> Result<Option<MedicationStrategy>, StorageError>;

    /// Active savings options, highest priority first.
    async fn get_savings_options(
        &self,
        medication_id: &str,
    ) -> Result<Vec<SavingsOption>, StorageError>;

    /// All availability rows for one medication.
    async fn get_pharmacy_availability(
        &self,
        medication_id: &str,
    ) -> Result<Vec<PharmacyAvailability>, StorageError>;
}
