/// Troubleshooting endpoints. They report configuration and connectivity
/// state and always answer 200.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::Method,
    Json,
};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::azure::{AzureClient, AzureCredential, AzureError};
use crate::handlers::AppState;

const NOT_ATTEMPTED: &str = "Not attempted";
const SUCCESS: &str = "Success";
const FAILED: &str = "Failed";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn error_body(e: &AzureError) -> serde_json::Value {
    json!({
        "message": e.to_string(),
        "name": e.kind(),
        "statusCode": e.status_code(),
    })
}

pub async fn hello_test(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    tracing::info!("Hello test function triggered");
    let name = query.get("name").map(String::as_str).unwrap_or("World");

    Json(json!({
        "message": format!("Hello, {name}! This is a test function for SAVEGURU."),
        "timestamp": Utc::now().to_rfc3339(),
        "query": query,
        "env": {
            "hasSubscriptionId": yes_no(state.config.azure.subscription().is_some()),
        }
    }))
}

pub async fn test_simple(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    tracing::info!("Simple test function triggered");

    Json(json!({
        "message": "This is a simple test function",
        "environmentVariables": {
            "hasAzureSubscriptionId": yes_no(state.config.azure.subscription().is_some()),
        },
        "requestInfo": {
            "method": method.as_str(),
            "query": query,
            "timestamp": Utc::now().to_rfc3339(),
        }
    }))
}

/// Builds a credential and client from configuration without calling Azure.
pub async fn test_azure_sdk(State(state): State<AppState>) -> Json<serde_json::Value> {
    tracing::info!("Azure SDK test function triggered");
    let azure = &state.config.azure;

    let credential = AzureCredential::from_config(azure);
    let (client_creation, error) = match AzureClient::new(azure) {
        Ok(_) => (SUCCESS, None),
        Err(e) => {
            tracing::warn!(error = %e, "Azure client construction failed");
            (FAILED, Some(error_body(&e)))
        }
    };

    let sdk_initialization = if error.is_none() { SUCCESS } else { FAILED };

    Json(json!({
        "subscriptionId": format!("Using: {}", yes_no(azure.subscription().is_some())),
        "credentialCreation": SUCCESS,
        "credentialKind": credential.kind(),
        "clientCreation": client_creation,
        "sdkInitialization": sdk_initialization,
        "error": error,
    }))
}

/// Runs a 30-day Cost Management query and reports each step.
pub async fn test_azure_api_call(State(state): State<AppState>) -> Json<serde_json::Value> {
    tracing::info!("Azure API call test function triggered");

    let subscription = state.config.azure.subscription().map(str::to_string);
    let mut steps = json!({
        "credential": state.billing.credential_kind(),
        "queryPreparation": NOT_ATTEMPTED,
        "apiCall": NOT_ATTEMPTED,
    });
    let mut error = serde_json::Value::Null;
    let mut data = serde_json::Value::Null;

    match subscription.as_deref() {
        None => {
            steps["queryPreparation"] = json!(FAILED);
            error = json!({ "message": "Subscription ID is required", "name": "ConfigurationError" });
        }
        Some(subscription_id) => {
            let end = Utc::now().date_naive();
            let start = end - Duration::days(30);
            steps["queryPreparation"] = json!(SUCCESS);

            match state.billing.total_cost(subscription_id, start, end).await {
                Ok(result) => {
                    steps["apiCall"] = json!(SUCCESS);
                    data = json!({ "columns": result.columns, "rows": result.rows });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cost Management test query failed");
                    steps["apiCall"] = json!(FAILED);
                    error = error_body(&e);
                }
            }
        }
    }

    let availability = if subscription.is_some() { "Available" } else { "Missing" };

    Json(json!({
        "steps": steps,
        "subscriptionId": availability,
        "error": error,
        "data": data,
    }))
}
