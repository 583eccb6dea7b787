//! Lookup and suggestion HTTP routes
//!
//! Thin glue over the core: `/ndc/{code}` runs the assisted resolver,
//! `/suggest` serves the in-memory index. Neither endpoint ever surfaces
//! a core failure as a server error; degraded sources only make answers
//! slower or emptier.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::assist::{FallbackLookup, Resolution};
use crate::ndc::candidate_keys;
use crate::record::DrugRecord;
use crate::source::PrimarySource;
use crate::suggest::SuggestItem;

use super::errors::{ApiError, ApiResult};
use super::state::LookupState;

/// Create the lookup routes
pub fn lookup_routes(state: Arc<LookupState>) -> Router {
    Router::new()
        .route("/ndc/:code", get(lookup_handler))
        .route("/suggest", get(suggest_handler))
        .with_state(state)
}

/// Assisted lookup of a raw drug-code string
async fn lookup_handler(
    State(state): State<Arc<LookupState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<DrugRecord>> {
    if candidate_keys(&code).is_empty() {
        return Err(ApiError::InvalidCode(code));
    }

    let backup = state.backup();
    let fallback = backup.as_deref().map(|b| b as &dyn FallbackLookup);
    let primary = state.primary.clone();

    let resolution = state
        .resolver
        .resolve_raw(&code, &move |key| primary_lookup(primary.clone(), key), fallback)
        .await;

    match resolution {
        Resolution::Primary(record) => {
            state.metrics.record_primary_hit();
            Ok(Json(record))
        }
        Resolution::Backup(record) => {
            state.metrics.record_backup_hit();
            Ok(Json(record))
        }
        Resolution::LatePrimary(record) => {
            state.metrics.record_late_primary_hit();
            Ok(Json(record))
        }
        Resolution::NotFound => {
            state.metrics.record_miss();
            Err(ApiError::NotFound)
        }
    }
}

async fn primary_lookup(
    primary: Option<Arc<PrimarySource>>,
    key: crate::ndc::LookupKey,
) -> crate::source::SourceResult<Option<DrugRecord>> {
    match primary {
        Some(source) => source.get(&key).await,
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SuggestResponse {
    items: Vec<SuggestItem>,
}

/// Autocomplete over the in-memory index
async fn suggest_handler(
    State(state): State<Arc<LookupState>>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestResponse> {
    // Below-threshold queries never touch the index.
    if !state.config.suggest_gate(&params.q) {
        return Json(SuggestResponse { items: Vec::new() });
    }

    let limit = params.limit.unwrap_or(state.config.suggest_result_limit);
    state.metrics.record_suggest_query();
    let items = state.index.query(&params.q, limit);
    Json(SuggestResponse { items })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_params_deserialize() {
        let params: SuggestParams = serde_json::from_str(r#"{"q": "foo"}"#).unwrap();
        assert_eq!(params.q, "foo");
        assert!(params.limit.is_none());
    }

    #[test]
    fn test_suggest_response_shape() {
        let json = serde_json::to_value(SuggestResponse { items: Vec::new() }).unwrap();
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
