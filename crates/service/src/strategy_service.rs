use std::sync::Arc;

use medassist_core::{
    LookupColumn, StrategyCatalog, StrategyLookup, availability_by_medication,
    normalize_medication_key, pharmacy_map,
};
use medassist_storage::StorageBackend;
use medassist_storage::traits::StrategyStore;

use crate::ServiceError;

pub struct StrategyService {
    storage: Arc<StorageBackend>,
}

impl StrategyService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    /// Every active strategy plus the availability flag matrix.
    pub async fn get_catalog(&self) -> Result<StrategyCatalog, ServiceError> {
        let strategies = self.storage.list_active_strategies().await?;
        let flags = self.storage.list_pharmacy_flags().await?;
        Ok(StrategyCatalog { strategies, pharmacy_availability: availability_by_medication(flags) })
    }

    /// Resolve `identifier` against id, then generic name, then brand name.
    ///
    /// First column with a hit wins. No hit yields [`StrategyLookup::empty`].
    pub async fn lookup(&self, identifier: &str) -> Result<StrategyLookup, ServiceError> {
        let Some(medication_id) = self.resolve_medication_id(identifier).await? else {
            tracing::debug!(identifier, "no strategy matched");
            return Ok(StrategyLookup::empty());
        };

        let Some(mut strategy) = self.storage.get_active_strategy(&medication_id).await? else {
            return Ok(StrategyLookup::empty());
        };
        strategy.savings_options = self.storage.get_savings_options(&medication_id).await?;
        let pharmacies = self.storage.get_pharmacy_availability(&medication_id).await?;

        Ok(StrategyLookup { strategy: Some(strategy), pharmacies: pharmacy_map(pharmacies) })
    }

    async fn resolve_medication_id(&self, identifier: &str) -> Result<Option<String>, ServiceError> {
        let key = normalize_medication_key(identifier);
        if key.is_empty() {
            return Ok(None);
        }
        for column in LookupColumn::RESOLUTION_ORDER {
            if let Some(id) = self.storage.find_medication_id(column, &key).await? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}
