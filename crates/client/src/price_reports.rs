use std::collections::BTreeMap;

use medassist_core::reporting::{ReportContext, report_warning};
use medassist_core::{
    PriceReportSummary, PriceStats, PriceStatsCatalog, SubmitResponse, check_price,
};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::local_store::LocalReportStore;

const PRICE_REPORTS_PATH: &str = "/price-reports";
const COMPONENT: &str = "price-report-client";

/// Body of `POST /price-reports`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceReportDraft {
    pub medication_id: String,
    pub source: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The server was unreachable and the report went to the local store.
    #[serde(default)]
    pub stored_locally: bool,
}

impl SubmitOutcome {
    fn accepted(stored_locally: bool) -> Self {
        Self { success: true, error: None, stored_locally }
    }

    fn failed(error: String) -> Self {
        Self { success: false, error: Some(error), stored_locally: false }
    }
}

/// Client for `/price-reports` with a local fallback store.
#[derive(Debug)]
pub struct PriceReportClient {
    api: ApiClient,
    store: LocalReportStore,
}

impl PriceReportClient {
    #[must_use]
    pub const fn new(api: ApiClient, store: LocalReportStore) -> Self {
        Self { api, store }
    }

    #[must_use]
    pub const fn local_store(&self) -> &LocalReportStore {
        &self.store
    }

    /// Server stats for one pair, or locally computed ones when the server
    /// cannot be reached.
    pub async fn fetch_price_stats(&self, medication_id: &str, source: &str) -> Option<PriceStats> {
        let query = [("medicationId", medication_id), ("source", source)];
        match self.api.get_json::<PriceReportSummary>(PRICE_REPORTS_PATH, &query).await {
            Ok(summary) => summary.stats,
            Err(e) => {
                warn_fallback("price stats unavailable, using local store", &e);
                self.store.stats(medication_id, source)
            },
        }
    }

    /// Submit a report. Transport failures and 5xx replies store it
    /// locally; a rejection by the server is returned as a failed outcome.
    /// A price the server would reject is never stored locally.
    pub async fn submit_price_report(&self, draft: &PriceReportDraft) -> SubmitOutcome {
        let err = match self.api.post_json::<_, SubmitResponse>(PRICE_REPORTS_PATH, draft).await {
            Ok(_) => return SubmitOutcome::accepted(false),
            Err(e) => e,
        };

        if !err.is_fallback_eligible() {
            let message = match err {
                ClientError::HttpStatus { message, .. } => message,
                other => other.to_string(),
            };
            return SubmitOutcome::failed(message);
        }

        let price = match check_price(draft.price) {
            Ok(price) => price,
            Err(e) => return SubmitOutcome::failed(e.to_string()),
        };

        warn_fallback("price report submission failed, saving locally", &err);
        match self.store.save_report(
            &draft.medication_id,
            &draft.source,
            price,
            draft.location.as_deref(),
            draft.date.as_deref(),
        ) {
            Ok(()) => SubmitOutcome::accepted(true),
            Err(e) => {
                tracing::error!(error = %e, "could not save local price report");
                SubmitOutcome::failed(e.to_string())
            },
        }
    }

    /// Stats for every pair keyed `"{medicationId}_{source}"`.
    pub async fn fetch_all_price_stats(&self) -> BTreeMap<String, PriceStats> {
        match self.api.get_json::<PriceStatsCatalog>(PRICE_REPORTS_PATH, &[]).await {
            Ok(catalog) => catalog.stats.iter().map(|s| (s.key(), s.to_price_stats())).collect(),
            Err(e) => {
                warn_fallback("price stats unavailable, using local store", &e);
                self.store.all_stats()
            },
        }
    }
}

fn warn_fallback(message: &str, err: &ClientError) {
    report_warning(message, &ReportContext::new(COMPONENT).with("error", err.to_string()));
}
