use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{AzureCredential, AzureError};
use crate::config::AzureConfig;
use crate::models::{resource_group_from_id, UsageRecord, VmDescriptor};

const CONSUMPTION_API_VERSION: &str = "2023-03-01";
const COMPUTE_API_VERSION: &str = "2024-03-01";
const COST_MANAGEMENT_API_VERSION: &str = "2023-03-01";

/// A page of an ARM list operation.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageDetail {
    #[serde(default)]
    pub id: Option<String>,
    pub properties: UsageProperties,
}

/// Accepts the modern (`costInBillingCurrency`), legacy (`cost`) and
/// pre-2019 (`pretaxCost`/`usageStart`) usage detail shapes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageProperties {
    pub consumed_service: Option<String>,
    pub cost_in_billing_currency: Option<f64>,
    pub cost: Option<f64>,
    pub pretax_cost: Option<f64>,
    pub usage_start: Option<String>,
    pub date: Option<String>,
    pub resource_group: Option<String>,
    pub instance_id: Option<String>,
    pub resource_id: Option<String>,
}

impl TryFrom<UsageDetail> for UsageRecord {
    type Error = AzureError;

    fn try_from(detail: UsageDetail) -> Result<Self, Self::Error> {
        let props = detail.properties;
        let raw_date = props
            .usage_start
            .as_deref()
            .or(props.date.as_deref())
            .ok_or_else(|| {
                AzureError::malformed(format!(
                    "usage detail {} has no usage date",
                    detail.id.as_deref().unwrap_or("<unknown>")
                ))
            })?;
        let usage_date = parse_usage_date(raw_date)?;

        let amount = props
            .cost_in_billing_currency
            .or(props.cost)
            .or(props.pretax_cost)
            .unwrap_or_else(|| {
                tracing::warn!(
                    id = detail.id.as_deref().unwrap_or("<unknown>"),
                    "Usage detail has no cost field, counting 0"
                );
                0.0
            });
        let cost = Decimal::from_f64(amount)
            .ok_or_else(|| AzureError::malformed(format!("cost {amount} is not representable")))?;

        let resource_group = props
            .resource_group
            .filter(|rg| !rg.is_empty())
            .or_else(|| {
                props
                    .instance_id
                    .as_deref()
                    .or(props.resource_id.as_deref())
                    .map(resource_group_from_id)
                    .filter(|rg| !rg.is_empty())
            });

        let service = props.consumed_service.unwrap_or_else(|| "Other".into());
        Ok(UsageRecord {
            resource_group,
            ..UsageRecord::new(service, cost, usage_date)
        })
    }
}

/// `YYYY-MM-DD` prefix of a date or timestamp string.
fn parse_usage_date(raw: &str) -> Result<NaiveDate, AzureError> {
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| AzureError::malformed(format!("invalid usage date '{raw}'")))
}

#[derive(Debug, Deserialize)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: Option<VmProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmProperties {
    pub hardware_profile: Option<HardwareProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: Option<String>,
}

impl TryFrom<VirtualMachine> for VmDescriptor {
    type Error = AzureError;

    fn try_from(vm: VirtualMachine) -> Result<Self, Self::Error> {
        let size = vm
            .properties
            .and_then(|p| p.hardware_profile)
            .and_then(|h| h.vm_size)
            .ok_or_else(|| AzureError::malformed(format!("virtual machine {} has no vmSize", vm.name)))?;

        Ok(VmDescriptor::from_resource_id(&vm.id, vm.name, size))
    }
}

/// Columns and rows of a Cost Management query.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CostQueryResult {
    #[serde(default)]
    pub columns: Vec<serde_json::Value>,
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CostQueryResponse {
    #[serde(default)]
    properties: CostQueryResult,
}

/// REST client for the Azure Resource Manager billing and compute APIs.
#[derive(Debug)]
pub struct AzureClient {
    http: reqwest::Client,
    credential: AzureCredential,
    management_url: String,
}

impl AzureClient {
    pub fn new(config: &AzureConfig) -> Result<Self, AzureError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            credential: AzureCredential::from_config(config),
            management_url: config.management_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn credential_kind(&self) -> &'static str {
        self.credential.kind()
    }

    fn usage_details_url(&self, subscription_id: &str, start: NaiveDate, end: NaiveDate) -> String {
        let filter = format!(
            "properties/usageStart ge '{start}' and properties/usageEnd le '{end}'"
        );
        let base = format!(
            "{}/subscriptions/{subscription_id}/providers/Microsoft.Consumption/usageDetails",
            self.management_url
        );
        match reqwest::Url::parse_with_params(
            &base,
            &[("api-version", CONSUMPTION_API_VERSION), ("$filter", filter.as_str())],
        ) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{base}?api-version={CONSUMPTION_API_VERSION}"),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, AzureError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(status, body = %body, "Azure management API error");
        Err(AzureError::Status { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AzureError> {
        let token = self.credential.token(&self.http).await?;
        let resp = self.http.get(url).bearer_auth(token).send().await?;
        Self::check(resp)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AzureError::malformed(e.to_string()))
    }

    /// Follows `nextLink` until the listing is exhausted.
    async fn get_all_pages<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, AzureError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        let mut pages = 0usize;

        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            pages += 1;
            items.extend(page.value);
            next = page.next_link.filter(|link| !link.is_empty());
        }

        tracing::debug!(pages, items = items.len(), "Drained paged listing");
        Ok(items)
    }

    pub async fn list_usage_details(
        &self,
        subscription_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UsageRecord>, AzureError> {
        let url = self.usage_details_url(subscription_id, start, end);
        let details: Vec<UsageDetail> = self.get_all_pages(url).await?;
        details.into_iter().map(UsageRecord::try_from).collect()
    }

    pub async fn list_virtual_machines(&self, subscription_id: &str) -> Result<Vec<VmDescriptor>, AzureError> {
        let url = format!(
            "{}/subscriptions/{subscription_id}/providers/Microsoft.Compute/virtualMachines?api-version={COMPUTE_API_VERSION}",
            self.management_url
        );
        let vms: Vec<VirtualMachine> = self.get_all_pages(url).await?;
        vms.into_iter().map(VmDescriptor::try_from).collect()
    }

    /// Total actual cost over the window as a Cost Management query.
    pub async fn query_total_cost(
        &self,
        subscription_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CostQueryResult, AzureError> {
        let url = format!(
            "{}/subscriptions/{subscription_id}/providers/Microsoft.CostManagement/query?api-version={COST_MANAGEMENT_API_VERSION}",
            self.management_url
        );
        let token = self.credential.token(&self.http).await?;
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&cost_query_body(start, end))
            .send()
            .await?;

        let body: CostQueryResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| AzureError::malformed(e.to_string()))?;
        Ok(body.properties)
    }
}

fn cost_query_body(start: NaiveDate, end: NaiveDate) -> serde_json::Value {
    serde_json::json!({
        "type": "ActualCost",
        "timeframe": "Custom",
        "timePeriod": {
            "from": start.to_string(),
            "to": end.to_string(),
        },
        "dataset": {
            "granularity": "None",
            "aggregation": {
                "totalCost": { "name": "PreTaxCost", "function": "Sum" }
            }
        }
    })
}
