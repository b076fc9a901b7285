//! Service binding endpoints.

use crate::error::ApiResult;
use crate::handlers::common::read_json;
use crate::osb::{BindRequest, BindResponse, EmptyResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;

/// PUT /v2/service_instances/{instance_id}/service_bindings/{binding_id}
#[tracing::instrument(skip(state, req))]
pub async fn bind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    req: Request,
) -> ApiResult<(StatusCode, Json<BindResponse>)> {
    let body: BindRequest = read_json(req).await?;
    let credentials = state.broker.bind(&instance_id, &binding_id, &body).await?;
    Ok((StatusCode::CREATED, Json(BindResponse { credentials })))
}

/// DELETE /v2/service_instances/{instance_id}/service_bindings/{binding_id}
#[tracing::instrument(skip(state))]
pub async fn unbind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
) -> ApiResult<Json<EmptyResponse>> {
    state.broker.unbind(&instance_id, &binding_id).await?;
    Ok(Json(EmptyResponse {}))
}
