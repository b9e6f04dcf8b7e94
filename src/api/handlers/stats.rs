use crate::api::error::AppError;
use crate::services::file_ops::{self, StorageStats};
use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub message: String,
    pub stats: StorageStats,
}

#[utoipa::path(
    get,
    path = "/api/v1/stats/storage",
    responses(
        (status = 200, description = "Aggregate storage usage", body = StatsResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "stats"
)]
pub async fn storage_stats(
    State(state): State<crate::AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = file_ops::storage_stats(state.storage.as_ref()).await?;

    Ok(Json(StatsResponse {
        success: true,
        message: "storage stats".to_string(),
        stats,
    }))
}
