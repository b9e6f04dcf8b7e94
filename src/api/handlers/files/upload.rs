use super::types::UploadResponse;
use crate::api::error::AppError;
use crate::services::file_ops::content_type_from_key;
use axum::{Json, extract::Multipart, extract::State};

fn build_object_key(folder: &str, filename: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        filename.to_string()
    } else {
        format!("{folder}/{filename}")
    }
}

fn resolve_content_type(declared: Option<String>, data: &[u8], filename: &str) -> String {
    if let Some(ct) = declared.filter(|ct| !ct.is_empty()) {
        return ct;
    }
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }
    content_type_from_key(filename).to_string()
}

#[utoipa::path(
    post,
    path = "/api/v1/upload",
    request_body(content = Object, description = "Multipart form: `file` plus optional `folder`", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "Missing file field"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut folder = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let declared = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                file = Some((filename, declared, data));
            }
            "folder" => {
                folder = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    let (filename, declared, data) =
        file.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;

    let key = build_object_key(&folder, &filename);
    let content_type = resolve_content_type(declared, &data, &filename);
    let size = data.len();

    state.storage.put_object(&key, data, &content_type).await?;

    tracing::info!("📤 Uploaded {} ({} bytes, {})", key, size, content_type);

    let url = format!(
        "{}/{}/{}",
        state.config.tos_endpoint.trim_end_matches('/'),
        state.config.bucket_name,
        key
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "file uploaded".to_string(),
        key,
        url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_object_key() {
        assert_eq!(build_object_key("", "a.txt"), "a.txt");
        assert_eq!(build_object_key("/", "a.txt"), "a.txt");
        assert_eq!(build_object_key("docs", "a.txt"), "docs/a.txt");
        assert_eq!(build_object_key("docs/", "a.txt"), "docs/a.txt");
        assert_eq!(build_object_key("/docs/sub/", "a.txt"), "docs/sub/a.txt");
    }

    #[test]
    fn test_resolve_content_type_prefers_declared() {
        let ct = resolve_content_type(Some("text/markdown".to_string()), b"# hi", "a.md");
        assert_eq!(ct, "text/markdown");
    }

    #[test]
    fn test_resolve_content_type_sniffs_bytes() {
        // PNG magic bytes, no declared type, misleading extension
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
        let ct = resolve_content_type(None, &png, "mystery.bin");
        assert_eq!(ct, "image/png");
    }

    #[test]
    fn test_resolve_content_type_falls_back_to_extension() {
        let ct = resolve_content_type(None, b"plain words", "notes.txt");
        assert_eq!(ct, "text/plain");
    }
}
