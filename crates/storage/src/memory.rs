//! In-memory storage backend.
//!
//! Mirrors the PostgreSQL tables closely enough for tests and for running
//! the server without a database. Data can be seeded from a JSON fixture.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medassist_core::{
    AggregatedPriceStats, Clock, LookupColumn, MedicationStrategy, NewPriceReport,
    PharmacyAvailability, PharmacyFlag, PriceReport, SavingsOption, StrategySummary,
    SystemClock, normalize_medication_key,
};
use serde::Deserialize;

use crate::error::StorageError;
use crate::traits::{PriceReportStore, StrategyStore};

const fn default_true() -> bool {
    true
}

/// A `medication_strategies` row.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyRecord {
    pub medication_id: String,
    pub generic_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub retail_price_low: Option<i32>,
    pub retail_price_high: Option<i32>,
    pub retail_price_note: Option<String>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl StrategyRecord {
    fn column(&self, column: LookupColumn) -> Option<&str> {
        match column {
            LookupColumn::MedicationId => Some(&self.medication_id),
            LookupColumn::GenericName => Some(&self.generic_name),
            LookupColumn::BrandName => self.brand_name.as_deref(),
        }
    }

    fn summary(&self) -> StrategySummary {
        StrategySummary {
            medication_id: self.medication_id.clone(),
            generic_name: self.generic_name.clone(),
            brand_name: self.brand_name.clone(),
            category: self.category.clone(),
            condition: self.condition.clone(),
            retail_price_low: self.retail_price_low,
            retail_price_high: self.retail_price_high,
        }
    }

    fn strategy(&self) -> MedicationStrategy {
        MedicationStrategy {
            medication_id: self.medication_id.clone(),
            generic_name: self.generic_name.clone(),
            brand_name: self.brand_name.clone(),
            category: self.category.clone(),
            condition: self.condition.clone(),
            retail_price_low: self.retail_price_low,
            retail_price_high: self.retail_price_high,
            retail_price_note: self.retail_price_note.clone(),
            common_mistakes: self.common_mistakes.clone(),
            savings_options: Vec::new(),
        }
    }
}

/// A `savings_options` row.
#[derive(Debug, Clone, Deserialize)]
pub struct SavingsOptionRecord {
    pub medication_id: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub option: SavingsOption,
}

/// A `pharmacy_availability` row.
#[derive(Debug, Clone, Deserialize)]
pub struct PharmacyRecord {
    pub medication_id: String,
    #[serde(flatten)]
    pub availability: PharmacyAvailability,
}

/// Fixture file layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub strategies: Vec<StrategyRecord>,
    #[serde(default)]
    pub savings_options: Vec<SavingsOptionRecord>,
    #[serde(default)]
    pub pharmacy_availability: Vec<PharmacyRecord>,
}

#[derive(Debug, Clone)]
struct StoredReport {
    report: NewPriceReport,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    strategies: Vec<StrategyRecord>,
    savings_options: Vec<SavingsOptionRecord>,
    pharmacies: Vec<PharmacyRecord>,
    reports: Vec<StoredReport>,
}

#[derive(Clone, Debug)]
pub struct MemoryStorage {
    state: Arc<RwLock<MemoryState>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// `created_at` of inserted reports comes from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { state: Arc::new(RwLock::new(MemoryState::default())), clock }
    }

    /// Load a JSON fixture file (see [`MemorySeed`]).
    pub fn from_fixture_file(path: &Path) -> Result<Self, StorageError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StorageError::Fixture(format!("{}: {e}", path.display())))?;
        let seed: MemorySeed = serde_json::from_str(&raw)?;
        let storage = Self::new();
        storage.load_seed(seed);
        Ok(storage)
    }

    pub fn load_seed(&self, seed: MemorySeed) {
        for s in seed.strategies {
            self.insert_strategy(s);
        }
        for o in seed.savings_options {
            self.insert_savings_option(o);
        }
        for p in seed.pharmacy_availability {
            self.insert_pharmacy(p);
        }
    }

    /// Insert or replace by `medication_id`.
    pub fn insert_strategy(&self, record: StrategyRecord) {
        let mut state = self.write();
        state.strategies.retain(|s| s.medication_id != record.medication_id);
        state.strategies.push(record);
    }

    pub fn insert_savings_option(&self, record: SavingsOptionRecord) {
        self.write().savings_options.push(record);
    }

    /// Insert or replace by `(medication_id, pharmacy)`.
    pub fn insert_pharmacy(&self, record: PharmacyRecord) {
        let mut state = self.write();
        state.pharmacies.retain(|p| {
            p.medication_id != record.medication_id
                || p.availability.pharmacy != record.availability.pharmacy
        });
        state.pharmacies.push(record);
    }

    /// Append a report with an explicit creation time.
    pub fn insert_report_at(&self, report: NewPriceReport, created_at: DateTime<Utc>) {
        self.write().reports.push(StoredReport { report, created_at });
    }

    /// Number of stored reports across all pairs.
    pub fn report_count(&self) -> usize {
        self.read().reports.len()
    }

    /// Fingerprints stored with each report, oldest first.
    pub fn stored_ip_hashes(&self) -> Vec<Option<String>> {
        self.read().reports.iter().map(|r| r.report.ip_hash.clone()).collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StrategyStore for MemoryStorage {
    async fn list_active_strategies(&self) -> Result<Vec<StrategySummary>, StorageError> {
        let state = self.read();
        let mut active: Vec<&StrategyRecord> =
            state.strategies.iter().filter(|s| s.is_active).collect();
        // PostgreSQL sorts NULL brand names last.
        active.sort_by(|a, b| {
            (a.brand_name.is_none(), &a.brand_name).cmp(&(b.brand_name.is_none(), &b.brand_name))
        });
        Ok(active.into_iter().map(StrategyRecord::summary).collect())
    }

    async fn list_pharmacy_flags(&self) -> Result<Vec<PharmacyFlag>, StorageError> {
        Ok(self
            .read()
            .pharmacies
            .iter()
            .map(|p| PharmacyFlag {
                medication_id: p.medication_id.clone(),
                pharmacy: p.availability.pharmacy.clone(),
                is_available: p.availability.is_available,
            })
            .collect())
    }

    async fn find_medication_id(
        &self,
        column: LookupColumn,
        normalized: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self
            .read()
            .strategies
            .iter()
            .filter(|s| s.is_active)
            .filter(|s| s.column(column).is_some_and(|v| normalize_medication_key(v) == normalized))
            .map(|s| s.medication_id.clone())
            .min())
    }

    async fn get_active_strategy(
        &self,
        medication_id: &str,
    ) -> Result<Option<MedicationStrategy>, StorageError> {
        Ok(self
            .read()
            .strategies
            .iter()
            .find(|s| s.is_active && s.medication_id == medication_id)
            .map(StrategyRecord::strategy))
    }

    async fn get_savings_options(
        &self,
        medication_id: &str,
    ) -> Result<Vec<SavingsOption>, StorageError> {
        let state = self.read();
        let mut rows: Vec<&SavingsOptionRecord> = state
            .savings_options
            .iter()
            .filter(|o| o.is_active && o.medication_id == medication_id)
            .collect();
        rows.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.option.id.cmp(&b.option.id)));
        Ok(rows.into_iter().map(|o| o.option.clone()).collect())
    }

    async fn get_pharmacy_availability(
        &self,
        medication_id: &str,
    ) -> Result<Vec<PharmacyAvailability>, StorageError> {
        Ok(self
            .read()
            .pharmacies
            .iter()
            .filter(|p| p.medication_id == medication_id)
            .map(|p| p.availability.clone())
            .collect())
    }
}

#[async_trait]
impl PriceReportStore for MemoryStorage {
    async fn recent_reports(
        &self,
        medication_id: &str,
        source: &str,
        limit: usize,
    ) -> Result<Vec<PriceReport>, StorageError> {
        let state = self.read();
        let mut matching: Vec<&StoredReport> = state
            .reports
            .iter()
            .filter(|r| r.report.medication_id == medication_id && r.report.source == source)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching
            .into_iter()
            .take(limit)
            .map(|r| PriceReport {
                price: r.report.price,
                location: r.report.location.clone(),
                report_date: r.report.report_date,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn aggregate_stats(
        &self,
        recent_since: DateTime<Utc>,
    ) -> Result<Vec<AggregatedPriceStats>, StorageError> {
        let state = self.read();
        let mut groups: BTreeMap<(&str, &str), Vec<&StoredReport>> = BTreeMap::new();
        for r in &state.reports {
            groups
                .entry((r.report.medication_id.as_str(), r.report.source.as_str()))
                .or_default()
                .push(r);
        }

        Ok(groups
            .into_iter()
            .map(|((medication_id, source), reports)| {
                let prices = reports.iter().map(|r| r.report.price);
                let min_price = prices.clone().fold(f64::INFINITY, f64::min);
                let max_price = prices.clone().fold(f64::NEG_INFINITY, f64::max);
                #[allow(clippy::cast_precision_loss, reason = "report counts are small")]
                let avg = prices.sum::<f64>() / reports.len() as f64;
                let recent = reports.iter().filter(|r| r.created_at > recent_since).count();
                AggregatedPriceStats {
                    medication_id: medication_id.to_owned(),
                    source: source.to_owned(),
                    min_price,
                    max_price,
                    avg_price: (avg * 100.0).round() / 100.0,
                    total_reports: i64::try_from(reports.len()).unwrap_or(i64::MAX),
                    recent_reports: i64::try_from(recent).unwrap_or(i64::MAX),
                }
            })
            .collect())
    }

    async fn insert_report(&self, report: &NewPriceReport) -> Result<(), StorageError> {
        let created_at = self.clock.now();
        self.insert_report_at(report.clone(), created_at);
        Ok(())
    }
}
