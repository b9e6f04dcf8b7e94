use super::types::DownloadQuery;
use crate::api::error::AppError;
use crate::services::file_ops::file_name;
use crate::services::storage::ObjectStream;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Build an attachment Content-Disposition with an ASCII fallback name plus
/// the RFC 5987 UTF-8 form.
pub(crate) fn attachment_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };
    let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC).to_string();

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

/// Turn an object read into a streaming HTTP response. Once this response
/// starts flowing, a backend failure can only truncate the connection.
pub(crate) fn stream_response(stream: ObjectStream, filename: &str) -> Result<Response, AppError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, stream.content_type)
        .header(header::CONTENT_DISPOSITION, attachment_disposition(filename));

    if stream.content_length > 0 {
        builder = builder.header(header::CONTENT_LENGTH, stream.content_length);
    }

    builder
        .body(Body::from_stream(stream.body))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/download/{key}",
    params(
        ("key" = String, Path, description = "Object key"),
        ("x-tos-process" = Option<String>, Query, description = "Remote transform, e.g. image/resize,w_128")
    ),
    responses(
        (status = 200, description = "Object byte stream"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Object not found")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<crate::AppState>,
    Path(key): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let key = key.trim_start_matches('/');
    if key.is_empty() {
        return Err(AppError::BadRequest("file key must not be empty".to_string()));
    }

    if let Some(process) = query.process.filter(|p| !p.is_empty()) {
        tracing::debug!("🖼️  Transform request for {}: {}", key, process);
        let stream = state.storage.get_object_processed(key, &process).await?;
        return stream_response(stream, file_name(key));
    }

    let stream = state
        .storage
        .get_object(key)
        .await
        .map_err(|e| AppError::NotFound(format!("object not found: {e}")))?;

    stream_response(stream, file_name(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_disposition_plain_ascii() {
        assert_eq!(
            attachment_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report%2Epdf"
        );
    }

    #[test]
    fn test_attachment_disposition_strips_quotes() {
        let d = attachment_disposition("a\"b.txt");
        assert!(d.contains("filename=\"ab.txt\""));
    }

    #[test]
    fn test_attachment_disposition_non_ascii_fallback() {
        let d = attachment_disposition("文件.pdf");
        assert!(d.contains("filename=\".pdf\""));
        assert!(d.contains("filename*=UTF-8''"));
    }
}
