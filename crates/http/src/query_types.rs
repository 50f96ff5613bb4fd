//! Request/query types (Deserialize)

use serde::Deserialize;

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyQuery {
    pub medication_id: Option<String>,
}

impl StrategyQuery {
    /// A blank identifier is treated as absent.
    pub fn identifier(&self) -> Option<&str> {
        non_blank(self.medication_id.as_ref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReportQuery {
    pub medication_id: Option<String>,
    pub source: Option<String>,
}

impl PriceReportQuery {
    /// Both halves must be present to select the detail view.
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((non_blank(self.medication_id.as_ref())?, non_blank(self.source.as_ref())?))
    }
}
