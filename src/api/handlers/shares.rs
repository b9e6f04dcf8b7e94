use crate::api::error::AppError;
use crate::api::handlers::MessageResponse;
use crate::api::handlers::files::stream_response;
use crate::services::file_ops::file_name;
use crate::services::share_registry::ShareRecord;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    pub file_key: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub allow_download: bool,
}

#[derive(Deserialize)]
pub struct ShareAccessQuery {
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub success: bool,
    pub message: String,
    pub share_info: ShareRecord,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedFileView {
    pub name: String,
    pub size: i64,
    pub allow_download: bool,
    pub download_url: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareAccessStats {
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareAccessResponse {
    pub success: bool,
    pub message: String,
    pub file_info: SharedFileView,
    pub share_info: ShareAccessStats,
}

#[derive(Serialize, ToSchema)]
pub struct ShareListResponse {
    pub success: bool,
    pub message: String,
    pub shares: Vec<ShareRecord>,
    pub total: usize,
}

#[utoipa::path(
    post,
    path = "/api/v1/share/create",
    request_body = CreateShareRequest,
    responses(
        (status = 200, description = "Share created", body = ShareResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Shared object does not exist")
    ),
    security(("jwt" = [])),
    tag = "share"
)]
pub async fn create_share(
    State(state): State<crate::AppState>,
    Json(req): Json<CreateShareRequest>,
) -> Result<Json<ShareResponse>, AppError> {
    if req.file_key.is_empty() {
        return Err(AppError::BadRequest("file key must not be empty".to_string()));
    }

    // Only existing objects can be shared.
    let entry = state
        .storage
        .stat_object(&req.file_key)
        .await
        .map_err(|_| AppError::NotFound("file does not exist".to_string()))?;

    let record = state.shares.create(
        req.file_key.clone(),
        file_name(&req.file_key).to_string(),
        entry.size,
        req.expires_at,
        req.password,
        req.allow_download,
    );

    tracing::info!("🔗 Created share {} for {}", record.share_id, req.file_key);

    Ok(Json(ShareResponse {
        success: true,
        message: "share created".to_string(),
        share_info: record,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/share/{share_id}",
    params(
        ("share_id" = String, Path, description = "Share identifier"),
        ("password" = Option<String>, Query, description = "Share password, if one is set")
    ),
    responses(
        (status = 200, description = "Share metadata", body = ShareAccessResponse),
        (status = 401, description = "Wrong share password"),
        (status = 404, description = "Share does not exist"),
        (status = 410, description = "Share has expired")
    ),
    tag = "share"
)]
pub async fn access_share(
    State(state): State<crate::AppState>,
    Path(share_id): Path<String>,
    Query(query): Query<ShareAccessQuery>,
) -> Result<Json<ShareAccessResponse>, AppError> {
    let record = state.shares.access(&share_id, query.password.as_deref())?;

    Ok(Json(ShareAccessResponse {
        success: true,
        message: "share accessed".to_string(),
        file_info: SharedFileView {
            name: record.file_name,
            size: record.file_size,
            allow_download: record.allow_download,
            download_url: format!("/api/v1/share/{share_id}/download"),
        },
        share_info: ShareAccessStats {
            access_count: record.access_count,
            created_at: record.created_at,
            expires_at: record.expires_at,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/share/{share_id}/download",
    params(
        ("share_id" = String, Path, description = "Share identifier"),
        ("password" = Option<String>, Query, description = "Share password, if one is set")
    ),
    responses(
        (status = 200, description = "Shared object byte stream"),
        (status = 401, description = "Wrong share password"),
        (status = 403, description = "Downloads disabled for this share"),
        (status = 404, description = "Share does not exist"),
        (status = 410, description = "Share has expired")
    ),
    tag = "share"
)]
pub async fn download_shared_file(
    State(state): State<crate::AppState>,
    Path(share_id): Path<String>,
    Query(query): Query<ShareAccessQuery>,
) -> Result<Response, AppError> {
    let record = state
        .shares
        .authorize_download(&share_id, query.password.as_deref())?;

    let stream = state.storage.get_object(&record.file_key).await?;

    stream_response(stream, &record.file_name)
}

#[utoipa::path(
    delete,
    path = "/api/v1/share/{share_id}",
    params(
        ("share_id" = String, Path, description = "Share identifier")
    ),
    responses(
        (status = 200, description = "Share deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Share does not exist")
    ),
    security(("jwt" = [])),
    tag = "share"
)]
pub async fn delete_share(
    State(state): State<crate::AppState>,
    Path(share_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.shares.delete(&share_id)?;

    tracing::info!("🔗 Deleted share {}", share_id);

    Ok(Json(MessageResponse::ok("share deleted")))
}

#[utoipa::path(
    get,
    path = "/api/v1/share/",
    responses(
        (status = 200, description = "All active shares", body = ShareListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "share"
)]
pub async fn list_shares(
    State(state): State<crate::AppState>,
) -> Result<Json<ShareListResponse>, AppError> {
    let shares = state.shares.list();

    Ok(Json(ShareListResponse {
        success: true,
        message: "active shares".to_string(),
        total: shares.len(),
        shares,
    }))
}
