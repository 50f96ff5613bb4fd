//! Medication strategy types
//!
//! A strategy describes how a patient can lower the cost of one medication:
//! its savings options (PAPs, copay foundations, discount cards) and which
//! pharmacies carry it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Insurance coverage a savings option can be restricted to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Commercial,
    Medicare,
    Medicaid,
    TricareVa,
    /// Indian Health Service / Tribal
    Ihs,
    Uninsured,
    Other,
}

impl InsuranceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commercial => "commercial",
            Self::Medicare => "medicare",
            Self::Medicaid => "medicaid",
            Self::TricareVa => "tricare_va",
            Self::Ihs => "ihs",
            Self::Uninsured => "uninsured",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for InsuranceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "commercial" => Ok(Self::Commercial),
            "medicare" => Ok(Self::Medicare),
            "medicaid" => Ok(Self::Medicaid),
            "tricare_va" | "tricare" | "va" => Ok(Self::TricareVa),
            "ihs" => Ok(Self::Ihs),
            "uninsured" => Ok(Self::Uninsured),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown insurance type: {other}")),
        }
    }
}

/// Columns a medication identifier is matched against, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupColumn {
    MedicationId,
    GenericName,
    BrandName,
}

impl LookupColumn {
    pub const RESOLUTION_ORDER: [Self; 3] = [Self::MedicationId, Self::GenericName, Self::BrandName];

    pub fn column_name(&self) -> &'static str {
        match self {
            Self::MedicationId => "medication_id",
            Self::GenericName => "generic_name",
            Self::BrandName => "brand_name",
        }
    }
}

/// Canonical form of a medication identifier: NFKC, trimmed, lowercased.
#[must_use]
pub fn normalize_medication_key(raw: &str) -> String {
    raw.nfkc().collect::<String>().trim().to_lowercase()
}

/// One way to pay less for a medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsOption {
    pub id: i64,
    pub option_type: String,
    pub name: String,
    pub description: Option<String>,
    pub estimated_cost_cents: Option<i32>,
    pub estimated_cost_note: Option<String>,
    pub eligibility_criteria: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub documents_needed: Vec<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
    /// Empty means the option is open to every insurance type.
    #[serde(default)]
    pub insurance_types: Vec<String>,
}

impl SavingsOption {
    pub fn applies_to(&self, insurance: InsuranceType) -> bool {
        self.insurance_types.is_empty()
            || self.insurance_types.iter().any(|t| t.trim().eq_ignore_ascii_case(insurance.as_str()))
    }
}

/// Full strategy for a single medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationStrategy {
    pub medication_id: String,
    pub generic_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    /// Cents
    pub retail_price_low: Option<i32>,
    /// Cents
    pub retail_price_high: Option<i32>,
    pub retail_price_note: Option<String>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    /// Active options only, highest priority first
    #[serde(rename = "savingsOptions", default)]
    pub savings_options: Vec<SavingsOption>,
}

/// Catalog row for the bulk listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategySummary {
    pub medication_id: String,
    pub generic_name: String,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub retail_price_low: Option<i32>,
    pub retail_price_high: Option<i32>,
}

/// A `pharmacy_availability` row for one medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PharmacyAvailability {
    pub pharmacy: String,
    pub is_available: bool,
    pub price_cents: Option<i32>,
    pub price_note: Option<String>,
    pub url: Option<String>,
}

/// Availability flag row used by the bulk listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PharmacyFlag {
    pub medication_id: String,
    pub pharmacy: String,
    pub is_available: bool,
}

/// Value side of the `pharmacies` map in a strategy lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyEntry {
    pub available: bool,
    pub price_cents: Option<i32>,
    pub price_note: Option<String>,
    pub url: Option<String>,
}

impl From<PharmacyAvailability> for PharmacyEntry {
    fn from(row: PharmacyAvailability) -> Self {
        Self {
            available: row.is_available,
            price_cents: row.price_cents,
            price_note: row.price_note,
            url: row.url,
        }
    }
}

/// Response of a single-medication lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StrategyLookup {
    pub strategy: Option<MedicationStrategy>,
    #[serde(default)]
    pub pharmacies: BTreeMap<String, PharmacyEntry>,
}

impl StrategyLookup {
    /// Shape returned when nothing matched (or the lookup failed client-side).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Response of the bulk listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StrategyCatalog {
    #[serde(default)]
    pub strategies: Vec<StrategySummary>,
    #[serde(rename = "pharmacyAvailability", default)]
    pub pharmacy_availability: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Key availability rows by pharmacy name. A later row for the same
/// pharmacy replaces an earlier one.
pub fn pharmacy_map(
    rows: impl IntoIterator<Item = PharmacyAvailability>,
) -> BTreeMap<String, PharmacyEntry> {
    rows.into_iter().map(|row| (row.pharmacy.clone(), PharmacyEntry::from(row))).collect()
}

/// Group availability flags into `medication_id -> pharmacy -> available`.
pub fn availability_by_medication(
    rows: impl IntoIterator<Item = PharmacyFlag>,
) -> BTreeMap<String, BTreeMap<String, bool>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.medication_id).or_default().insert(row.pharmacy, row.is_available);
    }
    grouped
}

/// Options applicable to `insurance`. `None` passes everything through.
pub fn filter_savings_options_by_insurance(
    options: &[SavingsOption],
    insurance: Option<InsuranceType>,
) -> Vec<SavingsOption> {
    match insurance {
        None => options.to_vec(),
        Some(kind) => options.iter().filter(|o| o.applies_to(kind)).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: i64, types: &[&str]) -> SavingsOption {
        SavingsOption {
            id,
            option_type: "pap".to_owned(),
            name: format!("Option {id}"),
            description: None,
            estimated_cost_cents: Some(0),
            estimated_cost_note: None,
            eligibility_criteria: None,
            steps: vec![],
            documents_needed: vec![],
            url: None,
            phone: None,
            insurance_types: types.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn availability(pharmacy: &str, available: bool, cents: Option<i32>) -> PharmacyAvailability {
        PharmacyAvailability {
            pharmacy: pharmacy.to_owned(),
            is_available: available,
            price_cents: cents,
            price_note: None,
            url: None,
        }
    }

    #[test]
    fn test_filter_medicare_keeps_unrestricted_and_matching() {
        let options = vec![
            option(1, &[]),
            option(2, &["medicare"]),
            option(3, &["commercial"]),
            option(4, &["commercial", "Medicare"]),
        ];
        let filtered = filter_savings_options_by_insurance(&options, Some(InsuranceType::Medicare));
        let ids: Vec<i64> = filtered.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(filtered.iter().all(|o| o.insurance_types.is_empty()
            || o.insurance_types.iter().any(|t| t.eq_ignore_ascii_case("medicare"))));
    }

    #[test]
    fn test_filter_without_type_passes_through() {
        let options = vec![option(1, &["medicaid"]), option(2, &["commercial"])];
        assert_eq!(filter_savings_options_by_insurance(&options, None), options);
    }

    #[test]
    fn test_insurance_type_parse() {
        assert_eq!("Medicare".parse::<InsuranceType>(), Ok(InsuranceType::Medicare));
        assert_eq!("tricare_va".parse::<InsuranceType>(), Ok(InsuranceType::TricareVa));
        assert!("platinum".parse::<InsuranceType>().is_err());
    }

    #[test]
    fn test_normalize_medication_key() {
        assert_eq!(normalize_medication_key("  TacroLIMUS "), "tacrolimus");
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_medication_key("Ｐｒｏｇｒａｆ"), "prograf");
        assert_eq!(normalize_medication_key("   "), "");
    }

    #[test]
    fn test_pharmacy_map_one_entry_per_pharmacy() {
        let rows = vec![
            availability("costco", true, Some(1200)),
            availability("walgreens", false, None),
            availability("costco", false, Some(1500)),
        ];
        let map = pharmacy_map(rows);
        assert_eq!(map.len(), 2);
        assert_eq!(map["costco"].price_cents, Some(1500));
        assert!(!map["costco"].available);
    }

    #[test]
    fn test_availability_by_medication_groups() {
        let rows = vec![
            PharmacyFlag { medication_id: "a".into(), pharmacy: "cvs".into(), is_available: true },
            PharmacyFlag { medication_id: "a".into(), pharmacy: "costco".into(), is_available: false },
            PharmacyFlag { medication_id: "b".into(), pharmacy: "cvs".into(), is_available: true },
        ];
        let grouped = availability_by_medication(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["a"].len(), 2);
        assert_eq!(grouped["a"]["costco"], false);
        assert_eq!(grouped["b"]["cvs"], true);
    }

    #[test]
    fn test_lookup_serializes_wire_names() {
        let mut pharmacies = BTreeMap::new();
        pharmacies.insert("cvs".to_owned(), PharmacyEntry::from(availability("cvs", true, Some(900))));
        let lookup = StrategyLookup {
            strategy: Some(MedicationStrategy {
                medication_id: "tacrolimus".into(),
                generic_name: "Tacrolimus".into(),
                brand_name: Some("Prograf".into()),
                category: None,
                condition: None,
                retail_price_low: Some(20000),
                retail_price_high: Some(60000),
                retail_price_note: None,
                common_mistakes: vec!["Skipping refills".into()],
                savings_options: vec![option(1, &[])],
            }),
            pharmacies,
        };
        let json = serde_json::to_value(&lookup).unwrap();
        assert_eq!(json["strategy"]["savingsOptions"][0]["id"], 1);
        assert_eq!(json["pharmacies"]["cvs"]["priceCents"], 900);
        assert_eq!(json["pharmacies"]["cvs"]["available"], true);

        let empty = serde_json::to_value(StrategyLookup::empty()).unwrap();
        assert_eq!(empty, serde_json::json!({"strategy": null, "pharmacies": {}}));
    }

    #[test]
    fn test_catalog_serializes_wire_names() {
        let json = serde_json::to_value(StrategyCatalog::default()).unwrap();
        assert_eq!(json, serde_json::json!({"strategies": [], "pharmacyAvailability": {}}));
    }
}
