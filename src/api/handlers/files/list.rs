use super::types::{ListQuery, ListResponse};
use crate::api::error::AppError;
use crate::services::file_ops::{FileInfo, file_name, is_folder_marker};
use axum::{Json, extract::Query, extract::State};

#[utoipa::path(
    get,
    path = "/api/v1/files",
    params(
        ("prefix" = Option<String>, Query, description = "Folder prefix to list under")
    ),
    responses(
        (status = 200, description = "Files and folders under the prefix", body = ListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let listing = state.storage.list_objects(&query.prefix, Some("/")).await?;

    let files: Vec<FileInfo> = listing
        .objects
        .into_iter()
        .filter(|entry| !is_folder_marker(entry))
        .map(FileInfo::from)
        .collect();

    let folders: Vec<String> = listing
        .common_prefixes
        .iter()
        .map(|p| file_name(p.trim_end_matches('/')).to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let total = files.len() + folders.len();

    Ok(Json(ListResponse {
        success: true,
        message: "listing complete".to_string(),
        files,
        folders,
        total,
    }))
}
