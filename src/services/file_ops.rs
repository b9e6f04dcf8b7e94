use crate::services::storage::{ObjectEntry, ObjectStorage};
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

pub const FOLDER_CONTENT_TYPE: &str = "application/x-directory";

/// Advertised bucket capacity. The storage service does not expose a quota,
/// so the stats endpoint reports a fixed 100 GiB total.
pub const TOTAL_CAPACITY_BYTES: i64 = 100 * 1024 * 1024 * 1024;

/// Last path segment of an object key.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Folders are simulated with zero-byte marker objects whose key ends in "/".
pub fn is_folder_marker(entry: &ObjectEntry) -> bool {
    entry.key.ends_with('/') && entry.size == 0
}

pub fn content_type_from_key(key: &str) -> &'static str {
    let ext = key
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub key: String,
    pub name: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: String,
    pub is_folder: bool,
    pub etag: String,
}

impl From<ObjectEntry> for FileInfo {
    fn from(entry: ObjectEntry) -> Self {
        let name = file_name(&entry.key).to_string();
        let content_type = content_type_from_key(&entry.key).to_string();
        FileInfo {
            name,
            size: entry.size,
            last_modified: entry.last_modified,
            content_type,
            is_folder: false,
            etag: entry.etag,
            key: entry.key,
        }
    }
}

/// Normalize a folder path to a trailing-slash marker key and create it.
pub async fn create_folder(storage: &dyn ObjectStorage, folder_path: &str) -> Result<String> {
    let mut key = folder_path.trim_matches('/').to_string();
    key.push('/');
    storage.put_object(&key, Vec::new(), FOLDER_CONTENT_TYPE).await?;
    Ok(key)
}

/// Copy then delete. If the source delete fails the copied object is removed
/// again on a best-effort basis so a half-finished move does not leave two
/// live copies behind.
pub async fn move_object(storage: &dyn ObjectStorage, source: &str, dest: &str) -> Result<()> {
    storage.copy_object(source, dest).await?;

    if let Err(e) = storage.delete_object(source).await {
        let _ = storage.delete_object(dest).await;
        return Err(e);
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub processed: usize,
    pub failed: usize,
    pub failed_items: Vec<String>,
}

impl BatchOutcome {
    pub fn record(&mut self, item: &str, result: Result<()>) {
        match result {
            Ok(()) => self.processed += 1,
            Err(_) => {
                self.failed += 1;
                self.failed_items.push(item.to_string());
            }
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

pub async fn batch_delete(storage: &dyn ObjectStorage, items: &[String]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for key in items {
        outcome.record(key, storage.delete_object(key).await);
    }
    outcome
}

fn destination_key(destination: &str, source_key: &str) -> String {
    format!(
        "{}/{}",
        destination.trim_end_matches('/'),
        file_name(source_key)
    )
}

pub async fn batch_move(
    storage: &dyn ObjectStorage,
    items: &[String],
    destination: &str,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for key in items {
        let dest = destination_key(destination, key);
        outcome.record(key, move_object(storage, key, &dest).await);
    }
    outcome
}

pub async fn batch_copy(
    storage: &dyn ObjectStorage,
    items: &[String],
    destination: &str,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for key in items {
        let dest = destination_key(destination, key);
        outcome.record(key, storage.copy_object(key, &dest).await);
    }
    outcome
}

#[derive(Debug, Default, Clone)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub folder: String,
    pub file_types: Vec<String>,
    pub min_size: i64,
    pub max_size: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 || self.limit > 1000 {
            100
        } else {
            self.limit
        }
    }
}

pub fn matches_search(entry: &ObjectEntry, q: &SearchQuery) -> bool {
    if let Some(ref query) = q.query {
        if !entry.key.to_lowercase().contains(&query.to_lowercase()) {
            return false;
        }
    }

    if q.min_size > 0 && entry.size < q.min_size {
        return false;
    }
    if q.max_size > 0 && entry.size > q.max_size {
        return false;
    }

    if let Some(start) = q.start_date {
        let cutoff = start.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        match (entry.last_modified, cutoff) {
            (Some(modified), Some(cutoff)) if modified < cutoff => return false,
            _ => {}
        }
    }
    if let Some(end) = q.end_date {
        let cutoff = end
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc() + Duration::hours(24));
        match (entry.last_modified, cutoff) {
            (Some(modified), Some(cutoff)) if modified > cutoff => return false,
            _ => {}
        }
    }

    if !q.file_types.is_empty() {
        let content_type = content_type_from_key(&entry.key);
        if !q.file_types.iter().any(|ft| content_type.contains(ft)) {
            return false;
        }
    }

    true
}

pub async fn search_objects(
    storage: &dyn ObjectStorage,
    q: &SearchQuery,
) -> Result<Vec<FileInfo>> {
    let listing = storage.list_objects(&q.folder, None).await?;
    let limit = q.effective_limit();

    let results = listing
        .objects
        .into_iter()
        .filter(|entry| !is_folder_marker(entry))
        .filter(|entry| matches_search(entry, q))
        .take(limit)
        .map(FileInfo::from)
        .collect();

    Ok(results)
}

/// Newest-first listing, used by the recent-files endpoint.
pub async fn recent_objects(storage: &dyn ObjectStorage, limit: usize) -> Result<Vec<FileInfo>> {
    let listing = storage.list_objects("", None).await?;

    let mut files: Vec<FileInfo> = listing
        .objects
        .into_iter()
        .filter(|entry| !is_folder_marker(entry))
        .map(FileInfo::from)
        .collect();

    files.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    files.truncate(limit);

    Ok(files)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_space: i64,
    pub used_space: i64,
    pub free_space: i64,
    pub file_count: i64,
    pub folder_count: i64,
    pub file_type_stats: HashMap<String, i64>,
}

pub fn aggregate_stats(objects: &[ObjectEntry]) -> StorageStats {
    let mut used_space = 0;
    let mut file_count = 0;
    let mut folder_count = 0;
    let mut file_type_stats: HashMap<String, i64> = HashMap::new();

    for entry in objects {
        if is_folder_marker(entry) {
            folder_count += 1;
            continue;
        }
        file_count += 1;
        used_space += entry.size;
        *file_type_stats
            .entry(content_type_from_key(&entry.key).to_string())
            .or_insert(0) += 1;
    }

    StorageStats {
        total_space: TOTAL_CAPACITY_BYTES,
        used_space,
        free_space: TOTAL_CAPACITY_BYTES - used_space,
        file_count,
        folder_count,
        file_type_stats,
    }
}

pub async fn storage_stats(storage: &dyn ObjectStorage) -> Result<StorageStats> {
    let listing = storage.list_objects("", None).await?;
    Ok(aggregate_stats(&listing.objects))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, size: i64) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            size,
            last_modified: Some(Utc::now()),
            etag: "etag".to_string(),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("docs/report.pdf"), "report.pdf");
        assert_eq!(file_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn test_content_type_from_key() {
        assert_eq!(content_type_from_key("a/b/photo.JPG"), "image/jpeg");
        assert_eq!(content_type_from_key("movie.mp4"), "video/mp4");
        assert_eq!(content_type_from_key("noext"), "application/octet-stream");
    }

    #[test]
    fn test_folder_marker_detection() {
        assert!(is_folder_marker(&entry("docs/", 0)));
        assert!(!is_folder_marker(&entry("docs/report.pdf", 10)));
        assert!(!is_folder_marker(&entry("weird/", 5)));
    }

    #[test]
    fn test_matches_search_query_and_size() {
        let e = entry("docs/Report.pdf", 2048);

        let mut q = SearchQuery {
            query: Some("report".to_string()),
            ..Default::default()
        };
        assert!(matches_search(&e, &q));

        q.query = Some("missing".to_string());
        assert!(!matches_search(&e, &q));

        q.query = None;
        q.min_size = 4096;
        assert!(!matches_search(&e, &q));

        q.min_size = 0;
        q.max_size = 1024;
        assert!(!matches_search(&e, &q));
    }

    #[test]
    fn test_matches_search_file_types() {
        let e = entry("photos/cat.png", 100);
        let q = SearchQuery {
            file_types: vec!["image".to_string()],
            ..Default::default()
        };
        assert!(matches_search(&e, &q));

        let q = SearchQuery {
            file_types: vec!["video".to_string()],
            ..Default::default()
        };
        assert!(!matches_search(&e, &q));
    }

    #[test]
    fn test_aggregate_stats() {
        let objects = vec![
            entry("docs/", 0),
            entry("docs/a.pdf", 100),
            entry("docs/b.pdf", 200),
            entry("photos/cat.png", 50),
        ];
        let stats = aggregate_stats(&objects);
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.folder_count, 1);
        assert_eq!(stats.used_space, 350);
        assert_eq!(stats.free_space, TOTAL_CAPACITY_BYTES - 350);
        assert_eq!(stats.file_type_stats["application/pdf"], 2);
        assert_eq!(stats.file_type_stats["image/png"], 1);
    }

    #[test]
    fn test_destination_key() {
        assert_eq!(
            destination_key("archive/", "docs/report.pdf"),
            "archive/report.pdf"
        );
        assert_eq!(destination_key("archive", "report.pdf"), "archive/report.pdf");
    }
}
