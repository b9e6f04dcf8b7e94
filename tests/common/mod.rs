#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bkp_drive::config::Config;
use bkp_drive::infrastructure::database;
use bkp_drive::services::file_ops::content_type_from_key;
use bkp_drive::services::share_registry::ShareRegistry;
use bkp_drive::services::storage::{ObjectEntry, ObjectListing, ObjectStorage, ObjectStream};
use bkp_drive::{AppState, create_app};
use bytes::Bytes;
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// In-memory stand-in for the object-storage bucket.
pub struct MockObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<ObjectStream> {
        let data = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("key not found: {key}"))?;

        let content_length = data.len() as i64;
        let content_type = content_type_from_key(key).to_string();
        let body: bkp_drive::services::storage::ObjectBody =
            Box::pin(futures::stream::once(async move {
                Ok::<_, std::io::Error>(Bytes::from(data))
            }));

        Ok(ObjectStream {
            body,
            content_length,
            content_type,
        })
    }

    async fn get_object_processed(&self, key: &str, _process: &str) -> anyhow::Result<ObjectStream> {
        self.get_object(key).await
    }

    async fn stat_object(&self, key: &str) -> anyhow::Result<ObjectEntry> {
        let size = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|d| d.len() as i64)
            .ok_or_else(|| anyhow::anyhow!("key not found: {key}"))?;

        Ok(ObjectEntry {
            key: key.to_string(),
            size,
            last_modified: Some(Utc::now()),
            etag: "mock-etag".to_string(),
        })
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| anyhow::anyhow!("key not found: {key}"))
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> anyhow::Result<()> {
        let mut objects = self.objects.lock().unwrap();
        let data = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("key not found: {source_key}"))?;
        objects.insert(dest_key.to_string(), data);
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> anyhow::Result<ObjectListing> {
        let objects = self.objects.lock().unwrap();
        let mut listing = ObjectListing::default();

        let mut keys: Vec<&String> = objects.keys().filter(|k| k.starts_with(prefix)).collect();
        keys.sort();

        for key in keys {
            if let Some(delim) = delimiter {
                let remainder = &key[prefix.len()..];
                if let Some(idx) = remainder.find(delim) {
                    let common = format!("{}{}{}", prefix, &remainder[..idx], delim);
                    if !listing.common_prefixes.contains(&common) {
                        listing.common_prefixes.push(common);
                    }
                    continue;
                }
            }
            listing.objects.push(ObjectEntry {
                key: key.clone(),
                size: objects[key.as_str()].len() as i64,
                last_modified: Some(Utc::now()),
                etag: "mock-etag".to_string(),
            });
        }

        Ok(listing)
    }
}

pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub storage: Arc<MockObjectStorage>,
}

pub async fn setup() -> TestContext {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db, "sqlite::memory:").await.unwrap();

    let storage = Arc::new(MockObjectStorage::new());
    let config = Config {
        jwt_secret: "test-secret".to_string(),
        ..Config::default()
    };

    let state = AppState {
        db,
        storage: storage.clone(),
        shares: Arc::new(ShareRegistry::new()),
        config,
    };

    TestContext {
        app: create_app(state.clone()),
        state,
        storage,
    }
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// Register a user and log in, returning the bearer token.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let (status, _) = send_json(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["token"].as_str().unwrap().to_string()
}
