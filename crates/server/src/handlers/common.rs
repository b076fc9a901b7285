//! Shared handler helpers.

use crate::error::{ApiError, ApiResult};
use axum::extract::Request;
use serde::de::DeserializeOwned;

/// Maximum accepted request body size (64 KiB).
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Read and parse a JSON request body.
pub async fn read_json<T: DeserializeOwned>(req: Request) -> ApiResult<T> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}
