use serde::{Deserialize, Serialize};

use super::{CostSummary, Recommendation};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Body of `GET /api/analyze-azure`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub data_source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub cost_summary: CostSummary,
    pub total_savings: f64,
    pub vm_recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisQueryParams {
    pub time_period: Option<String>,
    pub resource_group: Option<String>,
}

impl AnalysisQueryParams {
    /// Resource group filter, `None` for "all" or when absent.
    pub fn resource_group_filter(&self) -> Option<&str> {
        self.resource_group
            .as_deref()
            .map(str::trim)
            .filter(|rg| !rg.is_empty() && !rg.eq_ignore_ascii_case("all"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_filter() {
        let params = |rg: Option<&str>| AnalysisQueryParams {
            time_period: None,
            resource_group: rg.map(String::from),
        };
        assert_eq!(params(None).resource_group_filter(), None);
        assert_eq!(params(Some("all")).resource_group_filter(), None);
        assert_eq!(params(Some("ALL")).resource_group_filter(), None);
        assert_eq!(params(Some("")).resource_group_filter(), None);
        assert_eq!(params(Some("production")).resource_group_filter(), Some("production"));
    }

    #[test]
    fn test_data_source_wire_format() {
        assert_eq!(serde_json::to_value(DataSource::Live).unwrap(), "live");
        assert_eq!(serde_json::to_value(DataSource::Fallback).unwrap(), "fallback");
        assert_eq!(DataSource::Fallback.to_string(), "fallback");
    }
}
