//! Offline price report store.
//!
//! A single JSON file mapping `"{medicationId}_{source}"` to the newest
//! reports for that pair, oldest first and capped per key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use medassist_core::{
    Clock, PRICE_REPORT_HISTORY_LIMIT, PriceStats, SystemClock, check_price, compute_price_stats,
    env_string, stats_key,
};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

const STORE_FILE_NAME: &str = "price_reports.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalReport {
    pub price: f64,
    pub location: Option<String>,
    pub date: Option<String>,
    pub timestamp: DateTime<Utc>,
}

type StoreMap = BTreeMap<String, Vec<LocalReport>>;

/// `MEDASSIST_LOCAL_STORE`, else `<data_local_dir>/medassist/price_reports.json`.
#[must_use]
pub fn default_store_path() -> PathBuf {
    if let Some(path) = env_string("MEDASSIST_LOCAL_STORE") {
        return PathBuf::from(path);
    }
    dirs::data_local_dir()
        .map(|d| d.join("medassist").join(STORE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME))
}

#[derive(Debug)]
pub struct LocalReportStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    /// Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl LocalReportStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self { path: path.into(), clock, write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole mapping. A missing or unreadable file reads as empty.
    pub fn load(&self) -> StoreMap {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                tracing::error!(error = %e, "could not read local price reports");
                StoreMap::new()
            },
        }
    }

    /// Append one report, dropping the oldest entries beyond the cap.
    ///
    /// The price is rounded to cents and must pass the server's bounds.
    pub fn save_report(
        &self,
        medication_id: &str,
        source: &str,
        price: f64,
        location: Option<&str>,
        date: Option<&str>,
    ) -> Result<(), ClientError> {
        let price = check_price(price)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.try_load()?;
        let entries = map.entry(stats_key(medication_id, source)).or_default();
        entries.push(LocalReport {
            price,
            location: location.map(ToOwned::to_owned),
            date: date.map(ToOwned::to_owned),
            timestamp: self.clock.now(),
        });
        if entries.len() > PRICE_REPORT_HISTORY_LIMIT {
            let excess = entries.len() - PRICE_REPORT_HISTORY_LIMIT;
            entries.drain(..excess);
        }
        self.persist(&map)
    }

    pub fn stats(&self, medication_id: &str, source: &str) -> Option<PriceStats> {
        let map = self.load();
        let entries = map.get(&stats_key(medication_id, source))?;
        self.stats_for(entries)
    }

    /// Stats for every stored key, in the same shape as the server's.
    pub fn all_stats(&self) -> BTreeMap<String, PriceStats> {
        self.load()
            .iter()
            .filter_map(|(key, entries)| Some((key.clone(), self.stats_for(entries)?)))
            .collect()
    }

    fn stats_for(&self, entries: &[LocalReport]) -> Option<PriceStats> {
        compute_price_stats(entries.iter().map(|r| (r.price, r.timestamp)), self.clock.now())
    }

    fn try_load(&self) -> Result<StoreMap, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(StoreMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreMap::new()),
            Err(source) => Err(ClientError::LocalStoreIo { path: self.path.clone(), source }),
        }
    }

    fn persist(&self, map: &StoreMap) -> Result<(), ClientError> {
        let io_err =
            |source: std::io::Error| ClientError::LocalStoreIo { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(map)?).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}
