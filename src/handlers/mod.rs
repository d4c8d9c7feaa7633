pub mod analyze;
pub mod diagnostics;
pub mod health;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::azure::BillingSource;
use crate::config::AppConfig;

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub billing: Arc<dyn BillingSource>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/analyze-azure", get(analyze::analyze_azure))
        // Diagnostics
        .route("/api/hello-test", get(diagnostics::hello_test))
        .route("/api/test-simple", get(diagnostics::test_simple))
        .route("/api/test-azure-sdk", get(diagnostics::test_azure_sdk))
        .route("/api/test-azure-api-call", get(diagnostics::test_azure_api_call))
}
