use crate::api::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use utoipa::ToSchema;

/// A share link over one stored object. Records live only as long as the
/// process; a restart drops every outstanding link.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub share_id: String,
    pub file_key: String,
    pub file_name: String,
    pub file_size: i64,
    pub share_url: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub allow_download: bool,
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
}

/// In-memory share-link registry. All mutations and the mutation-adjacent
/// reads (existence check, expiry check, counter increment) happen under one
/// reader/writer lock, so concurrent accesses to the same share never lose an
/// increment and never race an expiry eviction.
#[derive(Default)]
pub struct ShareRegistry {
    shares: RwLock<HashMap<String, ShareRecord>>,
}

fn generate_share_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl ShareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ShareRecord>> {
        self.shares.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ShareRecord>> {
        self.shares.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a share over an object the caller has already confirmed to
    /// exist. The 128-bit random identifier is not checked for collisions.
    pub fn create(
        &self,
        file_key: String,
        file_name: String,
        file_size: i64,
        expires_at: DateTime<Utc>,
        password: Option<String>,
        allow_download: bool,
    ) -> ShareRecord {
        let share_id = generate_share_id();
        let record = ShareRecord {
            share_url: format!("/api/v1/share/{share_id}"),
            share_id: share_id.clone(),
            file_key,
            file_name,
            file_size,
            expires_at,
            password: password.filter(|p| !p.is_empty()),
            allow_download,
            access_count: 0,
            created_at: Utc::now(),
        };

        self.write().insert(share_id, record.clone());
        record
    }

    /// Gate a share access and bump its counter, all under the write lock.
    /// Expired records are evicted on first touch.
    fn gate_and_touch(
        &self,
        share_id: &str,
        password: Option<&str>,
        require_download: bool,
    ) -> Result<ShareRecord, AppError> {
        let mut shares = self.write();

        let expired = match shares.get(share_id) {
            None => {
                return Err(AppError::NotFound(
                    "share does not exist or has expired".to_string(),
                ));
            }
            Some(record) => Utc::now() > record.expires_at,
        };

        if expired {
            shares.remove(share_id);
            return Err(AppError::Gone("share has expired".to_string()));
        }

        let record = shares.get_mut(share_id).ok_or_else(|| {
            AppError::NotFound("share does not exist or has expired".to_string())
        })?;

        if let Some(expected) = record.password.as_deref() {
            if password != Some(expected) {
                return Err(AppError::Unauthorized("wrong share password".to_string()));
            }
        }

        if require_download && !record.allow_download {
            return Err(AppError::Forbidden(
                "downloads are disabled for this share".to_string(),
            ));
        }

        record.access_count += 1;
        Ok(record.clone())
    }

    pub fn access(&self, share_id: &str, password: Option<&str>) -> Result<ShareRecord, AppError> {
        self.gate_and_touch(share_id, password, false)
    }

    pub fn authorize_download(
        &self,
        share_id: &str,
        password: Option<&str>,
    ) -> Result<ShareRecord, AppError> {
        self.gate_and_touch(share_id, password, true)
    }

    pub fn delete(&self, share_id: &str) -> Result<(), AppError> {
        match self.write().remove(share_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("share does not exist".to_string())),
        }
    }

    /// All still-active shares. Expired records are skipped but left in place;
    /// they are evicted the next time somebody touches them directly.
    pub fn list(&self) -> Vec<ShareRecord> {
        let now = Utc::now();
        self.read()
            .values()
            .filter(|record| record.expires_at > now)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn registry_with_share(
        expires_at: DateTime<Utc>,
        password: Option<&str>,
        allow_download: bool,
    ) -> (ShareRegistry, String) {
        let registry = ShareRegistry::new();
        let record = registry.create(
            "docs/report.pdf".to_string(),
            "report.pdf".to_string(),
            2048,
            expires_at,
            password.map(str::to_string),
            allow_download,
        );
        (registry, record.share_id)
    }

    #[test]
    fn test_create_populates_record() {
        let registry = ShareRegistry::new();
        let record = registry.create(
            "docs/report.pdf".to_string(),
            "report.pdf".to_string(),
            2048,
            Utc::now() + Duration::hours(1),
            None,
            true,
        );

        assert_eq!(record.share_id.len(), 32);
        assert!(record.share_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(record.share_url, format!("/api/v1/share/{}", record.share_id));
        assert_eq!(record.access_count, 0);
    }

    #[test]
    fn test_access_increments_counter() {
        let (registry, id) = registry_with_share(Utc::now() + Duration::hours(1), None, true);

        let first = registry.access(&id, None).unwrap();
        assert_eq!(first.access_count, 1);
        let second = registry.access(&id, None).unwrap();
        assert_eq!(second.access_count, 2);
    }

    #[test]
    fn test_access_unknown_share_is_not_found() {
        let registry = ShareRegistry::new();
        assert!(matches!(
            registry.access("deadbeef", None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_expired_share_is_gone_and_evicted() {
        let (registry, id) = registry_with_share(Utc::now() - Duration::seconds(1), None, true);

        assert!(matches!(registry.access(&id, None), Err(AppError::Gone(_))));
        // Evicted on first touch; a second access reports NotFound.
        assert!(matches!(
            registry.access(&id, None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_password_gate() {
        let (registry, id) =
            registry_with_share(Utc::now() + Duration::hours(1), Some("hunter2"), true);

        assert!(matches!(
            registry.access(&id, None),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            registry.access(&id, Some("wrong")),
            Err(AppError::Unauthorized(_))
        ));
        let record = registry.access(&id, Some("hunter2")).unwrap();
        assert_eq!(record.access_count, 1);
    }

    #[test]
    fn test_empty_password_is_no_gate() {
        let registry = ShareRegistry::new();
        let record = registry.create(
            "a.txt".to_string(),
            "a.txt".to_string(),
            1,
            Utc::now() + Duration::hours(1),
            Some(String::new()),
            true,
        );
        assert!(registry.access(&record.share_id, None).is_ok());
    }

    #[test]
    fn test_download_forbidden_when_disabled() {
        let (registry, id) =
            registry_with_share(Utc::now() + Duration::hours(1), Some("hunter2"), false);

        // Forbidden regardless of password correctness, but the password gate
        // still runs first.
        assert!(matches!(
            registry.authorize_download(&id, Some("hunter2")),
            Err(AppError::Forbidden(_))
        ));
        // The forbidden attempt must not have bumped the counter.
        let record = registry.access(&id, Some("hunter2")).unwrap();
        assert_eq!(record.access_count, 1);
    }

    #[test]
    fn test_download_increments_counter() {
        let (registry, id) = registry_with_share(Utc::now() + Duration::hours(1), None, true);

        registry.access(&id, None).unwrap();
        let record = registry.authorize_download(&id, None).unwrap();
        assert_eq!(record.access_count, 2);
    }

    #[test]
    fn test_delete_is_not_idempotent_in_reporting() {
        let (registry, id) = registry_with_share(Utc::now() + Duration::hours(1), None, true);

        assert!(registry.delete(&id).is_ok());
        assert!(matches!(registry.delete(&id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_list_skips_expired_without_evicting() {
        let registry = ShareRegistry::new();
        registry.create(
            "live.txt".to_string(),
            "live.txt".to_string(),
            1,
            Utc::now() + Duration::hours(1),
            None,
            true,
        );
        let stale = registry.create(
            "stale.txt".to_string(),
            "stale.txt".to_string(),
            1,
            Utc::now() - Duration::hours(1),
            None,
            true,
        );

        let listed = registry.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_key, "live.txt");

        // Not evicted by listing: touching it directly still reports Gone.
        assert!(matches!(
            registry.access(&stale.share_id, None),
            Err(AppError::Gone(_))
        ));
    }

    #[test]
    fn test_concurrent_accesses_never_lose_an_increment() {
        let registry = Arc::new(ShareRegistry::new());
        let record = registry.create(
            "docs/report.pdf".to_string(),
            "report.pdf".to_string(),
            2048,
            Utc::now() + Duration::hours(1),
            None,
            true,
        );

        let threads: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let id = record.share_id.clone();
                std::thread::spawn(move || {
                    registry.access(&id, None).unwrap();
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let record = registry.access(&record.share_id, None).unwrap();
        assert_eq!(record.access_count, 33);
    }
}
