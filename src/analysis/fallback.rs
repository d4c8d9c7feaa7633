use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::models::{CostByCategory, CostSummary, DailyCost, Recommendation, ServiceCost};

const SYNTHETIC_DAYS: i64 = 30;

/// Stand-in summary served when live usage data cannot be fetched. Totals
/// are fixed; the daily series covers today and the 30 days before it with
/// random values in [300, 400).
pub fn synthetic_cost_summary<R: Rng>(today: NaiveDate, rng: &mut R) -> CostSummary {
    let daily_costs = (0..=SYNTHETIC_DAYS)
        .rev()
        .map(|days_ago| DailyCost {
            date: today - Duration::days(days_ago),
            cost: rng.gen_range(30_000..40_000) as f64 / 100.0,
        })
        .collect();

    CostSummary {
        total_cost: 12487.32,
        cost_trend_percent: 8.3,
        cost_by_category: CostByCategory {
            compute: 8245.65,
            storage: 2354.32,
            network: 1245.67,
            other: 641.68,
        },
        daily_costs,
        cost_by_service: vec![
            service("Virtual Machines", 8245.65),
            service("Storage", 2354.32),
            service("Networking", 1245.67),
            service("Other", 641.68),
        ],
    }
}

pub fn synthetic_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            resource_name: "vm-prod-app01".into(),
            resource_type: "Virtual Machine".into(),
            resource_group: String::new(),
            current_configuration: "Standard_D4s_v3".into(),
            recommended_configuration: "Standard_D2s_v3".into(),
            current_monthly_cost: 245.30,
            potential_savings: 122.65,
            reason: "Average CPU: 5.2%, Memory: 28.3% - Underutilized".into(),
        },
        Recommendation {
            resource_name: "vm-prod-db01".into(),
            resource_type: "Virtual Machine".into(),
            resource_group: String::new(),
            current_configuration: "Standard_E8s_v3".into(),
            recommended_configuration: "Standard_E4s_v3".into(),
            current_monthly_cost: 520.45,
            potential_savings: 260.22,
            reason: "Average CPU: 12.4%, Memory: 45.2% - Underutilized".into(),
        },
        Recommendation {
            resource_name: "premium-disk-01".into(),
            resource_type: "Managed Disk".into(),
            resource_group: String::new(),
            current_configuration: "Premium SSD".into(),
            recommended_configuration: "Standard SSD".into(),
            current_monthly_cost: 97.82,
            potential_savings: 68.47,
            reason: "Low IOPS utilization: 4.2% - Overprovisioned".into(),
        },
    ]
}

fn service(name: &str, cost: f64) -> ServiceCost {
    ServiceCost {
        service_name: name.into(),
        cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_synthetic_daily_series() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let summary = synthetic_cost_summary(today, &mut rng);

        assert_eq!(summary.daily_costs.len(), 31);
        assert_eq!(summary.daily_costs[0].date, NaiveDate::from_ymd_opt(2024, 5, 16).unwrap());
        assert_eq!(summary.daily_costs[30].date, today);
        assert!(summary
            .daily_costs
            .iter()
            .all(|d| d.cost >= 300.0 && d.cost < 400.0));
    }

    #[test]
    fn test_synthetic_daily_costs_stay_below_upper_bound() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        for seed in 0..200 {
            let summary = synthetic_cost_summary(today, &mut StdRng::seed_from_u64(seed));
            assert!(summary.daily_costs.iter().all(|d| d.cost >= 300.0 && d.cost < 400.0));
        }
    }

    #[test]
    fn test_synthetic_categories_match_total() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let summary = synthetic_cost_summary(today, &mut StdRng::seed_from_u64(1));
        let c = &summary.cost_by_category;
        assert!((c.compute + c.storage + c.network + c.other - summary.total_cost).abs() < 0.01);
    }

    #[test]
    fn test_synthetic_recommendations_respect_savings_bound() {
        let recs = synthetic_recommendations();
        assert_eq!(recs.len(), 3);
        assert!(recs
            .iter()
            .all(|r| r.potential_savings >= 0.0 && r.potential_savings < r.current_monthly_cost));
    }
}
