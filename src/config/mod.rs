use std::env;

/// Runtime configuration, loaded once at startup and carried in `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Object storage endpoint, including scheme
    pub tos_endpoint: String,

    /// Object storage region
    pub tos_region: String,

    /// Object storage access key (no default)
    pub access_key: String,

    /// Object storage secret key (no default)
    pub secret_key: String,

    /// Bucket holding all drive objects
    pub bucket_name: String,

    /// SeaORM connection URL (postgres:// or sqlite://)
    pub database_url: String,

    /// Symmetric JWT signing secret
    pub jwt_secret: String,

    /// Optional invite code required on registration
    pub invite_code: Option<String>,

    /// Maximum accepted upload size in bytes (default: 1 GB)
    pub max_file_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tos_endpoint: "https://tos-cn-beijing.volces.com".to_string(),
            tos_region: "cn-beijing".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket_name: "bkp-drive-bucket".to_string(),
            database_url: "sqlite://bkp-drive.db?mode=rwc".to_string(),
            jwt_secret: "bkp-drive-jwt-secret-key-2024".to_string(),
            invite_code: None,
            max_file_size: 1024 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for everything that is not a credential.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            tos_endpoint: env::var("TOS_ENDPOINT").unwrap_or(default.tos_endpoint),
            tos_region: env::var("TOS_REGION").unwrap_or(default.tos_region),
            access_key: env::var("TOS_ACCESS_KEY").unwrap_or_default(),
            secret_key: env::var("TOS_SECRET_KEY").unwrap_or_default(),
            bucket_name: env::var("TOS_BUCKET_NAME").unwrap_or(default.bucket_name),
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),
            invite_code: env::var("REGISTER_INVITE_CODE").ok().filter(|v| !v.is_empty()),
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }
}
