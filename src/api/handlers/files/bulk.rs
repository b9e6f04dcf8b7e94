use super::types::{BatchDeleteRequest, BatchResponse, BatchTransferRequest};
use crate::api::error::AppError;
use crate::services::file_ops::{self, BatchOutcome};
use axum::{Json, extract::State, http::StatusCode};

fn batch_response(operation: &str, outcome: BatchOutcome) -> (StatusCode, Json<BatchResponse>) {
    let status = if outcome.all_succeeded() {
        StatusCode::OK
    } else {
        StatusCode::PARTIAL_CONTENT
    };
    let body = BatchResponse {
        success: outcome.all_succeeded(),
        message: format!(
            "batch {} complete: {} succeeded, {} failed",
            operation, outcome.processed, outcome.failed
        ),
        processed: outcome.processed,
        failed: outcome.failed,
        failed_items: outcome.failed_items,
    };
    (status, Json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/batch/delete",
    request_body = BatchDeleteRequest,
    responses(
        (status = 200, description = "All items deleted", body = BatchResponse),
        (status = 206, description = "Some items failed", body = BatchResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "batch"
)]
pub async fn batch_delete(
    State(state): State<crate::AppState>,
    Json(req): Json<BatchDeleteRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::BadRequest("no items provided".to_string()));
    }

    let outcome = file_ops::batch_delete(state.storage.as_ref(), &req.items).await;
    Ok(batch_response("delete", outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/batch/move",
    request_body = BatchTransferRequest,
    responses(
        (status = 200, description = "All items moved", body = BatchResponse),
        (status = 206, description = "Some items failed", body = BatchResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "batch"
)]
pub async fn batch_move(
    State(state): State<crate::AppState>,
    Json(req): Json<BatchTransferRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::BadRequest("no items provided".to_string()));
    }

    let outcome = file_ops::batch_move(state.storage.as_ref(), &req.items, &req.destination).await;
    Ok(batch_response("move", outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/batch/copy",
    request_body = BatchTransferRequest,
    responses(
        (status = 200, description = "All items copied", body = BatchResponse),
        (status = 206, description = "Some items failed", body = BatchResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "batch"
)]
pub async fn batch_copy(
    State(state): State<crate::AppState>,
    Json(req): Json<BatchTransferRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    if req.items.is_empty() {
        return Err(AppError::BadRequest("no items provided".to_string()));
    }

    let outcome = file_ops::batch_copy(state.storage.as_ref(), &req.items, &req.destination).await;
    Ok(batch_response("copy", outcome))
}
