use crate::api::error::AppError;
use crate::services::file_ops::{self, FileInfo, SearchQuery};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(default)]
    pub folder: String,
    pub types: Option<String>,
    #[serde(rename = "minSize")]
    pub min_size: Option<i64>,
    #[serde(rename = "maxSize")]
    pub max_size: Option<i64>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct FilterParams {
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub size: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub folder: String,
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<FileInfo>,
    pub total: usize,
    pub query: String,
}

#[derive(Serialize, ToSchema)]
pub struct RecentResponse {
    pub success: bool,
    pub message: String,
    pub files: Vec<FileInfo>,
    pub total: usize,
}

fn parse_date(input: &Option<String>) -> Option<NaiveDate> {
    input
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(
        ("q" = Option<String>, Query, description = "Substring to match against object keys"),
        ("folder" = Option<String>, Query, description = "Restrict to a folder prefix"),
        ("types" = Option<String>, Query, description = "Comma-separated content-type filters"),
        ("minSize" = Option<i64>, Query, description = "Minimum object size in bytes"),
        ("maxSize" = Option<i64>, Query, description = "Maximum object size in bytes"),
        ("startDate" = Option<String>, Query, description = "Earliest modification date (YYYY-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Latest modification date (YYYY-MM-DD)"),
        ("limit" = Option<usize>, Query, description = "Maximum number of results")
    ),
    responses(
        (status = 200, description = "Matching files", body = SearchResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "search"
)]
pub async fn search_files(
    State(state): State<crate::AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = SearchQuery {
        query: params.q.clone(),
        folder: params.folder,
        file_types: params
            .types
            .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        min_size: params.min_size.unwrap_or(0),
        max_size: params.max_size.unwrap_or(0),
        start_date: parse_date(&params.start_date),
        end_date: parse_date(&params.end_date),
        limit: params.limit.unwrap_or(0),
    };

    let results = file_ops::search_objects(state.storage.as_ref(), &query).await?;

    Ok(Json(SearchResponse {
        success: true,
        message: "search complete".to_string(),
        total: results.len(),
        results,
        query: params.q.unwrap_or_default(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/files/recent",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum number of files (default 20)")
    ),
    responses(
        (status = 200, description = "Most recently modified files", body = RecentResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "search"
)]
pub async fn recent_files(
    State(state): State<crate::AppState>,
    Query(params): Query<RecentParams>,
) -> Result<Json<RecentResponse>, AppError> {
    let limit = params.limit.filter(|l| *l > 0).unwrap_or(20);

    let files = file_ops::recent_objects(state.storage.as_ref(), limit).await?;

    Ok(Json(RecentResponse {
        success: true,
        message: "recent files".to_string(),
        total: files.len(),
        files,
    }))
}

fn filter_to_search(params: FilterParams) -> SearchQuery {
    let mut query = SearchQuery {
        folder: params.folder,
        limit: 100,
        ..Default::default()
    };

    match params.file_type.as_deref() {
        Some("image") => query.file_types = vec!["image".to_string()],
        Some("video") => query.file_types = vec!["video".to_string()],
        Some("audio") => query.file_types = vec!["audio".to_string()],
        Some("document") => {
            query.file_types = vec![
                "application/pdf".to_string(),
                "text".to_string(),
                "application/msword".to_string(),
            ]
        }
        _ => {}
    }

    match params.size.as_deref() {
        Some("small") => query.max_size = 10 * 1024 * 1024,
        Some("medium") => {
            query.min_size = 10 * 1024 * 1024;
            query.max_size = 100 * 1024 * 1024;
        }
        Some("large") => query.min_size = 100 * 1024 * 1024,
        _ => {}
    }

    let today = Utc::now().date_naive();
    query.start_date = match params.time.as_deref() {
        Some("today") => Some(today),
        Some("week") => Some(today - Duration::days(7)),
        Some("month") => Some(today - Duration::days(30)),
        Some("year") => Some(today - Duration::days(365)),
        _ => None,
    };

    query
}

#[utoipa::path(
    get,
    path = "/api/v1/files/filter",
    params(
        ("type" = Option<String>, Query, description = "Preset: image, video, document, audio"),
        ("size" = Option<String>, Query, description = "Preset: small, medium, large"),
        ("time" = Option<String>, Query, description = "Preset: today, week, month, year"),
        ("folder" = Option<String>, Query, description = "Restrict to a folder prefix")
    ),
    responses(
        (status = 200, description = "Matching files", body = SearchResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "search"
)]
pub async fn filter_files(
    State(state): State<crate::AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = filter_to_search(params);

    let results = file_ops::search_objects(state.storage.as_ref(), &query).await?;

    Ok(Json(SearchResponse {
        success: true,
        message: "filter complete".to_string(),
        total: results.len(),
        results,
        query: String::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(&Some("2026-08-05".to_string())),
            NaiveDate::from_ymd_opt(2026, 8, 5)
        );
        assert_eq!(parse_date(&Some("yesterday".to_string())), None);
        assert_eq!(parse_date(&None), None);
    }

    #[test]
    fn test_filter_presets() {
        let q = filter_to_search(FilterParams {
            file_type: Some("image".to_string()),
            size: Some("medium".to_string()),
            time: Some("week".to_string()),
            folder: "photos/".to_string(),
        });
        assert_eq!(q.file_types, vec!["image".to_string()]);
        assert_eq!(q.min_size, 10 * 1024 * 1024);
        assert_eq!(q.max_size, 100 * 1024 * 1024);
        assert!(q.start_date.is_some());
        assert_eq!(q.folder, "photos/");
    }
}
