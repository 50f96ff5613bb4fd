use std::sync::Arc;

use chrono::Duration;
use medassist_core::reporting::{ReportContext, report_warning};
use medassist_core::{
    Clock, PharmacyEntry, STRATEGY_CACHE_TTL_SECS, StrategyCatalog, StrategyLookup, SystemClock,
};

use crate::api::ApiClient;
use crate::cache::TtlCache;

const STRATEGY_PATH: &str = "/medication-strategy";

/// Client for `GET /medication-strategy`.
///
/// Single lookups are cached per identifier for five minutes. Only
/// successful responses enter the cache.
#[derive(Debug)]
pub struct StrategyClient {
    api: ApiClient,
    cache: TtlCache<String, StrategyLookup>,
}

impl StrategyClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(api: ApiClient, clock: Arc<dyn Clock>) -> Self {
        Self { api, cache: TtlCache::new(Duration::seconds(STRATEGY_CACHE_TTL_SECS), clock) }
    }

    /// Strategy and pharmacies for one medication. Failures yield
    /// [`StrategyLookup::empty`].
    pub async fn fetch_medication_strategy(&self, medication_id: &str) -> StrategyLookup {
        if let Some(hit) = self.cache.get(&medication_id.to_owned()) {
            return hit;
        }

        match self
            .api
            .get_json::<StrategyLookup>(STRATEGY_PATH, &[("medicationId", medication_id)])
            .await
        {
            Ok(lookup) => {
                self.cache.set(medication_id.to_owned(), lookup.clone());
                lookup
            },
            Err(e) => {
                report_warning(
                    "could not fetch medication strategy",
                    &ReportContext::new("strategy-client")
                        .with("medication_id", medication_id)
                        .with("error", e.to_string()),
                );
                StrategyLookup::empty()
            },
        }
    }

    /// Every active strategy plus the availability matrix. Not cached.
    pub async fn fetch_all_medication_strategies(&self) -> StrategyCatalog {
        match self.api.get_json::<StrategyCatalog>(STRATEGY_PATH, &[]).await {
            Ok(catalog) => catalog,
            Err(e) => {
                report_warning(
                    "could not fetch medication strategies",
                    &ReportContext::new("strategy-client").with("error", e.to_string()),
                );
                StrategyCatalog::default()
            },
        }
    }

    /// `None` when the pharmacy has no row for this medication.
    pub async fn check_pharmacy_availability(
        &self,
        medication_id: &str,
        pharmacy: &str,
    ) -> Option<PharmacyEntry> {
        self.fetch_medication_strategy(medication_id).await.pharmacies.remove(pharmacy)
    }

    /// Drop every cached lookup.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
