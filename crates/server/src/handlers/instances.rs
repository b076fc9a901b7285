//! Service instance endpoints.

use crate::broker::OperationOutcome;
use crate::error::ApiResult;
use crate::handlers::common::read_json;
use crate::osb::{AsyncQuery, EmptyResponse, ProvisionRequest, UpdateRequest};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;

/// 202 for accepted operations, `done` otherwise.
fn status_for(outcome: OperationOutcome, done: StatusCode) -> StatusCode {
    if outcome.is_async {
        StatusCode::ACCEPTED
    } else {
        done
    }
}

/// PUT /v2/service_instances/{instance_id}
#[tracing::instrument(skip(state, query, req))]
pub async fn provision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Query(query): Query<AsyncQuery>,
    req: Request,
) -> ApiResult<(StatusCode, Json<EmptyResponse>)> {
    let body: ProvisionRequest = read_json(req).await?;
    let outcome = state
        .broker
        .provision(&instance_id, &body, query.accepts_incomplete)
        .await?;
    Ok((status_for(outcome, StatusCode::CREATED), Json(EmptyResponse {})))
}

/// DELETE /v2/service_instances/{instance_id}
#[tracing::instrument(skip(state, query))]
pub async fn deprovision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Query(query): Query<AsyncQuery>,
) -> ApiResult<(StatusCode, Json<EmptyResponse>)> {
    let outcome = state
        .broker
        .deprovision(&instance_id, query.accepts_incomplete)
        .await?;
    Ok((status_for(outcome, StatusCode::OK), Json(EmptyResponse {})))
}

/// PATCH /v2/service_instances/{instance_id}
#[tracing::instrument(skip(state, query, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Query(query): Query<AsyncQuery>,
    req: Request,
) -> ApiResult<(StatusCode, Json<EmptyResponse>)> {
    let body: UpdateRequest = read_json(req).await?;
    let outcome = state
        .broker
        .update(&instance_id, &body, query.accepts_incomplete)
        .await?;
    Ok((status_for(outcome, StatusCode::OK), Json(EmptyResponse {})))
}

/// GET /v2/service_instances/{instance_id}/last_operation
pub async fn last_operation(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> ApiResult<Json<EmptyResponse>> {
    state.broker.last_operation(&instance_id).await?;
    Ok(Json(EmptyResponse {}))
}
