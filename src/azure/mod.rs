pub mod client;
pub mod credential;
pub mod error;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::{AzureClient, CostQueryResult};
pub use credential::AzureCredential;
pub use error::AzureError;

use crate::models::{UsageRecord, VmDescriptor};

/// Upstream source of billing and compute data. Handlers only see this trait;
/// `AzureClient` is the production implementation.
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Every usage record for the window, all pages drained.
    async fn usage_records(
        &self,
        subscription_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UsageRecord>, AzureError>;

    async fn virtual_machines(&self, subscription_id: &str) -> Result<Vec<VmDescriptor>, AzureError>;

    async fn total_cost(
        &self,
        subscription_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CostQueryResult, AzureError>;

    fn credential_kind(&self) -> &'static str;
}

#[async_trait]
impl BillingSource for AzureClient {
    async fn usage_records(
        &self,
        subscription_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UsageRecord>, AzureError> {
        self.list_usage_details(subscription_id, start, end).await
    }

    async fn virtual_machines(&self, subscription_id: &str) -> Result<Vec<VmDescriptor>, AzureError> {
        self.list_virtual_machines(subscription_id).await
    }

    async fn total_cost(
        &self,
        subscription_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CostQueryResult, AzureError> {
        self.query_total_cost(subscription_id, start, end).await
    }

    fn credential_kind(&self) -> &'static str {
        AzureClient::credential_kind(self)
    }
}
