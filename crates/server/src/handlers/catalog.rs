//! Catalog endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use osbridge_core::Catalog;

/// GET /v2/catalog
pub async fn get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.broker.catalog().clone())
}
