use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One metered line item from the billing API.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub service_category: String,
    pub cost: Decimal,
    pub usage_date: NaiveDate,
    pub resource_group: Option<String>,
}

impl UsageRecord {
    pub fn new(service_category: impl Into<String>, cost: Decimal, usage_date: NaiveDate) -> Self {
        Self {
            service_category: service_category.into(),
            cost,
            usage_date,
            resource_group: None,
        }
    }

    pub fn in_resource_group(&self, group: &str) -> bool {
        self.resource_group
            .as_deref()
            .is_some_and(|rg| rg.eq_ignore_ascii_case(group))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_cost: f64,
    pub cost_trend_percent: f64,
    pub cost_by_category: CostByCategory,
    pub daily_costs: Vec<DailyCost>,
    pub cost_by_service: Vec<ServiceCost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CostByCategory {
    pub compute: f64,
    pub storage: f64,
    pub network: f64,
    pub other: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCost {
    pub service_name: String,
    pub cost: f64,
}
