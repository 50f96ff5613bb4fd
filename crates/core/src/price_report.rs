//! Crowd-sourced price reports.
//!
//! Reports are append-only observations of what a patient paid for a
//! medication at a given source (pharmacy or program).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{IP_HASH_LEN, MAX_REPORTED_PRICE, MAX_REPORT_FIELD_LEN};
use crate::error::ValidationError;

/// A stored report as returned by the detail query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceReport {
    pub price: f64,
    pub location: Option<String>,
    pub report_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A validated report ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceReport {
    pub medication_id: String,
    pub source: String,
    pub price: f64,
    pub location: Option<String>,
    pub report_date: Option<NaiveDate>,
    /// Truncated digest of the submitter address. Written, never read back.
    pub ip_hash: Option<String>,
}

/// Raw POST body. Every field is optional so validation can report
/// precisely what is wrong instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReportSubmission {
    #[serde(default, deserialize_with = "string_or_number")]
    pub medication_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub source: Option<String>,
    /// JSON number or numeric string
    pub price: Option<serde_json::Value>,
    pub location: Option<String>,
    pub date: Option<String>,
}

impl PriceReportSubmission {
    /// Check required fields and bounds, producing an insertable report.
    pub fn validate(self, ip_hash: Option<String>) -> Result<NewPriceReport, ValidationError> {
        let medication_id = non_blank(self.medication_id);
        let source = non_blank(self.source);
        let price = self.price.filter(is_present);
        let (Some(medication_id), Some(source), Some(price)) = (medication_id, source, price)
        else {
            return Err(ValidationError::MissingFields);
        };

        let price = parse_price(&price)?;
        check_len("medicationId", &medication_id)?;
        check_len("source", &source)?;

        let location = non_blank(self.location);
        if let Some(loc) = &location {
            check_len("location", loc)?;
        }

        let report_date = match non_blank(self.date) {
            Some(d) => Some(
                NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate)?,
            ),
            None => None,
        };

        Ok(NewPriceReport { medication_id, source, price, location, report_date, ip_hash })
    }
}

/// Identifiers may arrive as JSON numbers. Any other non-string value,
/// and the number zero, reads as absent.
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(de)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) if n.as_f64().is_some_and(|f| f != 0.0) => {
            Some(n.to_string())
        },
        _ => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// `null`, `false`, `0` and `""` count as "not provided".
fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => false,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn parse_price(value: &serde_json::Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.map_or(Err(ValidationError::InvalidPrice), check_price)
}

/// Round to whole cents and check the result is in `(0, MAX_REPORTED_PRICE]`.
///
/// Stored prices have two decimals, so a value that rounds to zero is
/// rejected here rather than by the database.
pub fn check_price(price: f64) -> Result<f64, ValidationError> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidPrice);
    }
    let cents = (price * 100.0).round() / 100.0;
    if cents > 0.0 && cents <= MAX_REPORTED_PRICE {
        Ok(cents)
    } else {
        Err(ValidationError::InvalidPrice)
    }
}

fn check_len(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_REPORT_FIELD_LEN {
        return Err(ValidationError::FieldTooLong(field));
    }
    Ok(())
}

/// Privacy-preserving fingerprint of the first `X-Forwarded-For` hop.
///
/// Only stored with the report; no code path reads it or throttles on it.
#[must_use]
pub fn client_fingerprint(forwarded_for: Option<&str>) -> Option<String> {
    let first = forwarded_for?.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    let digest = Sha256::digest(first.as_bytes());
    let mut hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex.truncate(IP_HASH_LEN);
    Some(hex)
}

/// Summary statistics for one (medication, source) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceStats {
    /// Two-decimal string
    pub min: String,
    /// Two-decimal string
    pub max: String,
    /// Two-decimal string
    pub avg: String,
    /// Reports inside the recent window
    pub count: usize,
    pub total: usize,
}

/// Per-pair statistics computed by the database for the bulk listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedPriceStats {
    pub medication_id: String,
    pub source: String,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub total_reports: i64,
    pub recent_reports: i64,
}

impl AggregatedPriceStats {
    #[must_use]
    pub fn key(&self) -> String {
        stats_key(&self.medication_id, &self.source)
    }

    #[must_use]
    pub fn to_price_stats(&self) -> PriceStats {
        PriceStats {
            min: format!("{:.2}", self.min_price),
            max: format!("{:.2}", self.max_price),
            avg: format!("{:.2}", self.avg_price),
            count: usize::try_from(self.recent_reports).unwrap_or(0),
            total: usize::try_from(self.total_reports).unwrap_or(0),
        }
    }
}

/// Map key shared by the bulk stats map and the local fallback store.
#[must_use]
pub fn stats_key(medication_id: &str, source: &str) -> String {
    format!("{medication_id}_{source}")
}

/// Response of `GET /price-reports?medicationId=&source=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceReportSummary {
    pub stats: Option<PriceStats>,
    #[serde(default)]
    pub reports: Vec<PriceReport>,
}

/// Response of `GET /price-reports` without a pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceStatsCatalog {
    #[serde(default)]
    pub stats: Vec<AggregatedPriceStats>,
}

/// Response of a successful `POST /price-reports`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    #[must_use]
    pub fn submitted() -> Self {
        Self { success: true, message: "Price report submitted".to_owned() }
    }
}
