//! Health and metrics HTTP routes

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use super::state::LookupState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a backup source is currently open
    pub backup: bool,
    /// Whether a primary source is currently open
    pub primary: bool,
    /// Published suggestion-index size
    pub suggest_index_size: u64,
}

/// Create the health and metrics routes
pub fn health_routes(state: Arc<LookupState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<LookupState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backup: state.backup().is_some(),
        primary: state.primary.is_some(),
        suggest_index_size: state.metrics.suggest_index_size(),
    })
}

async fn metrics_handler(State(state): State<Arc<LookupState>>) -> Json<Value> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            backup: false,
            primary: false,
            suggest_index_size: 42,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["suggest_index_size"], 42);
    }
}
