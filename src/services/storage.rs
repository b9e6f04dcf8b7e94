use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{Stream, TryStreamExt};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::pin::Pin;
use tokio_util::io::ReaderStream;

pub type ObjectBody = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A streaming object read. The body is handed straight to the HTTP response;
/// a mid-stream backend failure after headers are sent simply truncates the
/// connection.
pub struct ObjectStream {
    pub body: ObjectBody,
    pub content_length: i64,
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: String,
}

#[derive(Debug, Default)]
pub struct ObjectListing {
    pub objects: Vec<ObjectEntry>,
    pub common_prefixes: Vec<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;
    async fn get_object(&self, key: &str) -> Result<ObjectStream>;
    /// Fetch the object with a remote transform applied (thumbnails, video
    /// snapshots). The `process` string is passed through to the storage
    /// service untouched.
    async fn get_object_processed(&self, key: &str, process: &str) -> Result<ObjectStream>;
    async fn stat_object(&self, key: &str) -> Result<ObjectEntry>;
    async fn delete_object(&self, key: &str) -> Result<()>;
    async fn copy_object(&self, source_key: &str, dest_key: &str) -> Result<()>;
    async fn list_objects(&self, prefix: &str, delimiter: Option<&str>) -> Result<ObjectListing>;
}

pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    endpoint: String,
    http: reqwest::Client,
}

impl S3ObjectStorage {
    pub fn new(client: Client, bucket: String, endpoint: String) -> Self {
        Self {
            client,
            bucket,
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    fn encoded_key(key: &str) -> String {
        key.split('/')
            .map(|seg| utf8_percent_encode(seg, NON_ALPHANUMERIC).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<ObjectStream> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        let content_length = res.content_length().unwrap_or(0);
        let content_type = res
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let body: ObjectBody = Box::pin(ReaderStream::new(res.body.into_async_read()));

        Ok(ObjectStream {
            body,
            content_length,
            content_type,
        })
    }

    async fn get_object_processed(&self, key: &str, process: &str) -> Result<ObjectStream> {
        let url = format!(
            "{}/{}/{}?x-tos-process={}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            Self::encoded_key(key),
            process
        );

        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            anyhow::bail!("transform request failed with status {}", res.status());
        }

        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let content_length = res.content_length().map(|l| l as i64).unwrap_or(0);
        let body: ObjectBody = Box::pin(
            res.bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );

        Ok(ObjectStream {
            body,
            content_length,
            content_type,
        })
    }

    async fn stat_object(&self, key: &str) -> Result<ObjectEntry> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        let etag = res.e_tag().unwrap_or_default().trim_matches('"').to_string();
        let last_modified = res
            .last_modified
            .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()));

        Ok(ObjectEntry {
            key: key.to_string(),
            size: res.content_length.unwrap_or(0),
            last_modified,
            etag,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> Result<()> {
        let res = self
            .client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, source_key))
            .key(dest_key)
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "copy_object failed: source={}/{}, dest={}, error={:?}",
                self.bucket,
                source_key,
                dest_key,
                e
            );
            return Err(e.into());
        }
        Ok(())
    }

    async fn list_objects(&self, prefix: &str, delimiter: Option<&str>) -> Result<ObjectListing> {
        let mut listing = ObjectListing::default();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_delimiter(delimiter.map(str::to_string))
                .set_continuation_token(continuation_token)
                .send()
                .await?;

            if let Some(contents) = res.contents {
                for object in contents {
                    let Some(key) = object.key else { continue };
                    let last_modified = object
                        .last_modified
                        .and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()));
                    listing.objects.push(ObjectEntry {
                        key,
                        size: object.size.unwrap_or(0),
                        last_modified,
                        etag: object
                            .e_tag
                            .unwrap_or_default()
                            .trim_matches('"')
                            .to_string(),
                    });
                }
            }

            if let Some(prefixes) = res.common_prefixes {
                for p in prefixes {
                    if let Some(prefix) = p.prefix {
                        listing.common_prefixes.push(prefix);
                    }
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(listing)
    }
}
