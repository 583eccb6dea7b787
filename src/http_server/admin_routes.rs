//! Administrative HTTP routes
//!
//! `/reload` reopens the backup file wholesale and rebuilds the
//! suggestion index without a process restart. The backup file may have
//! been replaced on disk since boot; the previous index keeps serving
//! until the new one is swapped in.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use super::errors::{ApiError, ApiResult};
use super::state::LookupState;

/// Reload response
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: String,
    pub suggest_index_size: usize,
}

/// Create the admin routes
pub fn admin_routes(state: Arc<LookupState>) -> Router {
    Router::new()
        .route("/reload", post(reload_handler))
        .with_state(state)
}

async fn reload_handler(
    State(state): State<Arc<LookupState>>,
) -> ApiResult<Json<ReloadResponse>> {
    // The rebuild reads the whole backup file; keep it off the runtime
    // workers.
    let worker = state.clone();
    let size = tokio::task::spawn_blocking(move || worker.reload())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ReloadResponse {
        status: "reloaded".to_string(),
        suggest_index_size: size,
    }))
}
