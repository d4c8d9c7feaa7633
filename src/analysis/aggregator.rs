/// Usage aggregation: turns raw billing line items into the dashboard's
/// cost summary (totals, category split, service distribution, daily series
/// and trend).
///
/// Money is accumulated as `Decimal` and rounded to cents only when the
/// summary is built.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::to_money;
use crate::models::{CostByCategory, CostSummary, DailyCost, ServiceCost, UsageRecord};

const VENDOR_PREFIX: &str = "Microsoft.";
const MAX_SERVICE_ENTRIES: usize = 6;
const OTHER_SERVICES: &str = "Other Services";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostCategory {
    Compute,
    Storage,
    Network,
    Other,
}

impl CostCategory {
    /// Keyword match on the consumed-service string; first match wins.
    pub fn classify(service_category: &str) -> Self {
        if service_category.contains("Compute") {
            Self::Compute
        } else if service_category.contains("Storage") {
            Self::Storage
        } else if service_category.contains("Network") {
            Self::Network
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Default)]
struct CategoryTotals {
    compute: Decimal,
    storage: Decimal,
    network: Decimal,
    other: Decimal,
}

impl CategoryTotals {
    fn add(&mut self, category: CostCategory, cost: Decimal) {
        match category {
            CostCategory::Compute => self.compute += cost,
            CostCategory::Storage => self.storage += cost,
            CostCategory::Network => self.network += cost,
            CostCategory::Other => self.other += cost,
        }
    }

    fn rounded(&self) -> CostByCategory {
        CostByCategory {
            compute: to_money(self.compute),
            storage: to_money(self.storage),
            network: to_money(self.network),
            other: to_money(self.other),
        }
    }
}

/// Display name for a consumed service, without the vendor namespace.
pub fn display_service_name(service_category: &str) -> &str {
    service_category
        .strip_prefix(VENDOR_PREFIX)
        .unwrap_or(service_category)
}

pub fn aggregate(records: &[UsageRecord], window_start: NaiveDate, window_end: NaiveDate) -> CostSummary {
    let mut total = Decimal::ZERO;
    let mut categories = CategoryTotals::default();
    let mut by_service: HashMap<&str, Decimal> = HashMap::new();
    let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();

    let in_window = records
        .iter()
        .filter(|r| r.usage_date >= window_start && r.usage_date <= window_end);

    for record in in_window {
        total += record.cost;
        categories.add(CostCategory::classify(&record.service_category), record.cost);
        *by_service
            .entry(display_service_name(&record.service_category))
            .or_default() += record.cost;
        *by_day.entry(record.usage_date).or_default() += record.cost;
    }

    let daily: Vec<(NaiveDate, Decimal)> = window_start
        .iter_days()
        .take_while(|day| *day <= window_end)
        .map(|day| (day, by_day.get(&day).copied().unwrap_or_default()))
        .collect();

    let daily_values: Vec<Decimal> = daily.iter().map(|(_, cost)| *cost).collect();
    let trend = trend_percent(&daily_values);

    CostSummary {
        total_cost: to_money(total),
        cost_trend_percent: to_money(trend),
        cost_by_category: categories.rounded(),
        daily_costs: daily
            .into_iter()
            .map(|(date, cost)| DailyCost {
                date,
                cost: to_money(cost),
            })
            .collect(),
        cost_by_service: service_distribution(by_service),
    }
}

/// Sorted by cost descending; beyond six services the top five are kept and
/// the rest folded into a single "Other Services" entry.
fn service_distribution(by_service: HashMap<&str, Decimal>) -> Vec<ServiceCost> {
    let mut services: Vec<(&str, Decimal)> = by_service.into_iter().collect();
    services.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });

    if services.len() > MAX_SERVICE_ENTRIES {
        let folded: Decimal = services
            .split_off(MAX_SERVICE_ENTRIES - 1)
            .iter()
            .map(|(_, cost)| *cost)
            .sum();
        services.push((OTHER_SERVICES, folded));
    }

    services
        .into_iter()
        .map(|(name, cost)| ServiceCost {
            service_name: name.to_string(),
            cost: to_money(cost),
        })
        .collect()
}

/// Percentage change between the first `floor(n/2)` days and the rest.
/// Zero when the first half sums to zero.
pub fn trend_percent(daily: &[Decimal]) -> Decimal {
    let (first, second) = daily.split_at(daily.len() / 2);
    let first_sum: Decimal = first.iter().sum();
    let second_sum: Decimal = second.iter().sum();

    if first_sum.is_zero() {
        return Decimal::ZERO;
    }

    (second_sum - first_sum)
        .checked_div(first_sum)
        .map(|ratio| ratio * Decimal::new(100, 0))
        .unwrap_or_default()
}
