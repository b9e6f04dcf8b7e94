use crate::services::file_ops::FileInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub key: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Serialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<FileInfo>,
    pub folders: Vec<String>,
    pub total: usize,
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "x-tos-process")]
    pub process: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub folder_path: String,
}

#[derive(Serialize, ToSchema)]
pub struct CreateFolderResponse {
    pub success: bool,
    pub message: String,
    pub folder: String,
}

#[derive(Deserialize, ToSchema)]
pub struct MoveRequest {
    pub source: String,
    pub destination: String,
}

#[derive(Serialize, ToSchema)]
pub struct MoveResponse {
    pub success: bool,
    pub message: String,
    pub source: String,
    pub destination: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub old_key: String,
    pub new_key: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    pub success: bool,
    pub message: String,
    pub old_key: String,
    pub new_key: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BatchDeleteRequest {
    pub items: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BatchTransferRequest {
    pub items: Vec<String>,
    pub destination: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub processed: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_items: Vec<String>,
}
