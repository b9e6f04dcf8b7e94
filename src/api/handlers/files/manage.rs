use super::types::{
    CreateFolderRequest, CreateFolderResponse, MoveRequest, MoveResponse, RenameRequest,
    RenameResponse,
};
use crate::api::error::AppError;
use crate::api::handlers::MessageResponse;
use crate::services::file_ops;
use axum::{
    Json,
    extract::{Path, State},
};

#[utoipa::path(
    delete,
    path = "/api/v1/files/{key}",
    params(
        ("key" = String, Path, description = "Object key to delete")
    ),
    responses(
        (status = 200, description = "Object deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let key = key.trim_start_matches('/');
    if key.is_empty() {
        return Err(AppError::BadRequest("file key must not be empty".to_string()));
    }

    state.storage.delete_object(key).await?;

    tracing::info!("🗑️  Deleted {}", key);

    Ok(Json(MessageResponse::ok("file deleted")))
}

#[utoipa::path(
    post,
    path = "/api/v1/folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder created", body = CreateFolderResponse),
        (status = 400, description = "Invalid folder path"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn create_folder(
    State(state): State<crate::AppState>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<CreateFolderResponse>, AppError> {
    if req.folder_path.trim_matches('/').is_empty() {
        return Err(AppError::BadRequest(
            "folder path must not be empty".to_string(),
        ));
    }

    let folder = file_ops::create_folder(state.storage.as_ref(), &req.folder_path).await?;

    Ok(Json(CreateFolderResponse {
        success: true,
        message: "folder created".to_string(),
        folder,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/files/move",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Object moved", body = MoveResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn move_file(
    State(state): State<crate::AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    file_ops::move_object(state.storage.as_ref(), &req.source, &req.destination).await?;

    Ok(Json(MoveResponse {
        success: true,
        message: "file moved".to_string(),
        source: req.source,
        destination: req.destination,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/files/copy",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Object copied", body = MoveResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn copy_file(
    State(state): State<crate::AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    state
        .storage
        .copy_object(&req.source, &req.destination)
        .await?;

    Ok(Json(MoveResponse {
        success: true,
        message: "file copied".to_string(),
        source: req.source,
        destination: req.destination,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/files/rename",
    request_body = RenameRequest,
    responses(
        (status = 200, description = "Object renamed", body = RenameResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn rename_file(
    State(state): State<crate::AppState>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<RenameResponse>, AppError> {
    file_ops::move_object(state.storage.as_ref(), &req.old_key, &req.new_key).await?;

    Ok(Json(RenameResponse {
        success: true,
        message: "file renamed".to_string(),
        old_key: req.old_key,
        new_key: req.new_key,
    }))
}
