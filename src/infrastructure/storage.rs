use crate::config::Config;
use crate::services::storage::S3ObjectStorage;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &Config) -> Arc<S3ObjectStorage> {
    info!(
        "☁️  Object storage: {} (Bucket: {})",
        config.tos_endpoint, config.bucket_name
    );

    let aws_config = aws_config::from_env()
        .endpoint_url(&config.tos_endpoint)
        .region(Region::new(config.tos_region.clone()))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let client = aws_sdk_s3::Client::from_conf(s3_config);

    // Ensure bucket exists
    match client.head_bucket().bucket(&config.bucket_name).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", config.bucket_name),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", config.bucket_name);
            if let Err(e) = client
                .create_bucket()
                .bucket(&config.bucket_name)
                .send()
                .await
            {
                tracing::error!("❌ Failed to create bucket '{}': {}", config.bucket_name, e);
            } else {
                info!("✅ Bucket '{}' created successfully", config.bucket_name);
            }
        }
    }

    Arc::new(S3ObjectStorage::new(
        client,
        config.bucket_name.clone(),
        config.tos_endpoint.clone(),
    ))
}
