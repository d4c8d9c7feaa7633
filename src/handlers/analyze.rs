use axum::{extract::{Query, State}, Json};
use chrono::{Duration, NaiveDate, Utc};

use crate::analysis::{self, fallback, to_money};
use crate::azure::AzureError;
use crate::config::AnalysisConfig;
use crate::db::HistoryRepo;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::{
    AnalysisQueryParams, AnalysisResponse, DataSource, Recommendation, UsageRecord, VmDescriptor,
};

pub async fn analyze_azure(
    State(state): State<AppState>,
    Query(params): Query<AnalysisQueryParams>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let subscription_id = state
        .config
        .azure
        .subscription()
        .ok_or_else(|| AppError::misconfigured("Subscription ID is required"))?
        .to_string();

    let days = parse_time_period(params.time_period.as_deref(), &state.config.analysis)?;
    let end = Utc::now().date_naive();
    let start = end - Duration::days(days);
    let resource_group = params.resource_group_filter();

    tracing::info!(
        time_period = days,
        resource_group = resource_group.unwrap_or("all"),
        "Processing Azure cost analysis request"
    );

    let (usage, vms) = tokio::join!(
        state.billing.usage_records(&subscription_id, start, end),
        state.billing.virtual_machines(&subscription_id),
    );

    let response = build_analysis(usage, vms, start, end, resource_group);
    tracing::info!(data_source = %response.data_source, "Serving Azure cost analysis");

    if response.data_source == DataSource::Live {
        if let Err(e) = HistoryRepo::store(&response.cost_summary, &response.vm_recommendations).await {
            tracing::warn!(error = %e, "Failed to store historical data");
        }
    }

    Ok(Json(response))
}

/// Days to look back; the window is `[today - days, today]`.
pub fn parse_time_period(raw: Option<&str>, config: &AnalysisConfig) -> Result<i64, AppError> {
    let days = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => config.default_time_period_days,
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(format!("timePeriod must be a whole number of days, got '{value}'")))?,
    };

    if days < 1 || days > config.max_time_period_days {
        return Err(AppError::bad_request(format!(
            "timePeriod must be between 1 and {} days",
            config.max_time_period_days
        )));
    }
    Ok(days)
}

/// Combines the two upstream fetches into a response. Usage failure replaces
/// the whole body with synthetic data; VM failure only the recommendations.
pub fn build_analysis(
    usage: Result<Vec<UsageRecord>, AzureError>,
    vms: Result<Vec<VmDescriptor>, AzureError>,
    start: NaiveDate,
    end: NaiveDate,
    resource_group: Option<&str>,
) -> AnalysisResponse {
    let records = match usage {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, kind = e.kind(), "Usage data unavailable, serving synthetic data");
            let recommendations = fallback::synthetic_recommendations();
            return AnalysisResponse {
                data_source: DataSource::Fallback,
                fallback_reason: Some(format!("usage data unavailable: {e}")),
                cost_summary: fallback::synthetic_cost_summary(end, &mut rand::thread_rng()),
                total_savings: total_savings(&recommendations),
                vm_recommendations: recommendations,
            };
        }
    };

    let records: Vec<UsageRecord> = match resource_group {
        Some(rg) => records.into_iter().filter(|r| r.in_resource_group(rg)).collect(),
        None => records,
    };
    let cost_summary = analysis::aggregate(&records, start, end);

    let (recommendations, fallback_reason) = match vms {
        Ok(vms) => {
            let vms: Vec<VmDescriptor> = match resource_group {
                Some(rg) => vms
                    .into_iter()
                    .filter(|vm| vm.resource_group.eq_ignore_ascii_case(rg))
                    .collect(),
                None => vms,
            };
            (analysis::derive_recommendations(&vms), None)
        }
        Err(e) => {
            tracing::warn!(error = %e, kind = e.kind(), "VM data unavailable, serving synthetic recommendations");
            (
                fallback::synthetic_recommendations(),
                Some(format!("virtual machine data unavailable: {e}")),
            )
        }
    };

    tracing::info!(
        records = records.len(),
        recommendations = recommendations.len(),
        total_cost = cost_summary.total_cost,
        "Analysis complete"
    );

    AnalysisResponse {
        data_source: if fallback_reason.is_some() { DataSource::Fallback } else { DataSource::Live },
        fallback_reason,
        cost_summary,
        total_savings: total_savings(&recommendations),
        vm_recommendations: recommendations,
    }
}

fn total_savings(recommendations: &[Recommendation]) -> f64 {
    to_money(analysis::calculate_total_savings(recommendations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn usage(service: &str, cents: i64, d: u32, rg: &str) -> UsageRecord {
        UsageRecord {
            resource_group: Some(rg.into()),
            ..UsageRecord::new(service, Decimal::new(cents, 2), day(d))
        }
    }

    fn vm(name: &str, size: &str, rg: &str) -> VmDescriptor {
        VmDescriptor {
            name: name.into(),
            size_label: size.into(),
            resource_group: rg.into(),
        }
    }

    #[test]
    fn test_parse_time_period() {
        let config = AnalysisConfig::default();
        assert_eq!(parse_time_period(None, &config).unwrap(), 30);
        assert_eq!(parse_time_period(Some(""), &config).unwrap(), 30);
        assert_eq!(parse_time_period(Some("7"), &config).unwrap(), 7);
        assert!(parse_time_period(Some("0"), &config).is_err());
        assert!(parse_time_period(Some("-3"), &config).is_err());
        assert!(parse_time_period(Some("366"), &config).is_err());
        assert!(parse_time_period(Some("custom"), &config).is_err());
    }

    #[test]
    fn test_live_analysis() {
        let records = vec![
            usage("Microsoft.Compute", 1000, 1, "prod"),
            usage("Microsoft.Storage", 500, 2, "prod"),
        ];
        let vms = vec![vm("app01", "Standard_D4s_v3", "prod"), vm("web", "Standard_F2s_v2", "prod")];

        let response = build_analysis(Ok(records), Ok(vms), day(1), day(3), None);

        assert_eq!(response.data_source, DataSource::Live);
        assert!(response.fallback_reason.is_none());
        assert_eq!(response.cost_summary.total_cost, 15.0);
        assert_eq!(response.cost_summary.daily_costs.len(), 3);
        assert_eq!(response.vm_recommendations.len(), 1);
        assert_eq!(response.total_savings, 122.65);
    }

    #[test]
    fn test_resource_group_filter_applies_to_both_inputs() {
        let records = vec![
            usage("Microsoft.Compute", 1000, 1, "prod"),
            usage("Microsoft.Compute", 9900, 1, "dev"),
        ];
        let vms = vec![vm("app01", "Standard_D4s_v3", "Prod"), vm("dev01", "Standard_E8s_v3", "dev")];

        let response = build_analysis(Ok(records), Ok(vms), day(1), day(1), Some("prod"));

        assert_eq!(response.cost_summary.total_cost, 10.0);
        assert_eq!(response.vm_recommendations.len(), 1);
        assert_eq!(response.vm_recommendations[0].resource_name, "app01");
    }

    #[test]
    fn test_usage_failure_serves_synthetic_body() {
        let response = build_analysis(
            Err(AzureError::Status { status: 429, body: "throttled".into() }),
            Ok(vec![vm("app01", "Standard_D4s_v3", "prod")]),
            day(1),
            day(31),
            None,
        );

        assert_eq!(response.data_source, DataSource::Fallback);
        assert!(response.fallback_reason.unwrap().contains("usage data unavailable"));
        assert_eq!(response.cost_summary.total_cost, 12487.32);
        assert_eq!(response.cost_summary.daily_costs.len(), 31);
        assert_eq!(response.vm_recommendations.len(), 3);
        assert_eq!(response.total_savings, 451.34);
    }

    #[test]
    fn test_vm_failure_keeps_live_costs() {
        let response = build_analysis(
            Ok(vec![usage("Microsoft.Compute", 1000, 1, "prod")]),
            Err(AzureError::malformed("virtual machine x has no vmSize")),
            day(1),
            day(2),
            None,
        );

        assert_eq!(response.data_source, DataSource::Fallback);
        assert!(response.fallback_reason.unwrap().contains("virtual machine data unavailable"));
        assert_eq!(response.cost_summary.total_cost, 10.0);
        assert_eq!(response.vm_recommendations, fallback::synthetic_recommendations());
    }
}
