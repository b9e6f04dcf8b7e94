pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::services::share_registry::ShareRegistry;
use crate::services::storage::ObjectStorage;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::profile,
        api::handlers::files::upload_file,
        api::handlers::files::list_files,
        api::handlers::files::download_file,
        api::handlers::files::delete_file,
        api::handlers::files::create_folder,
        api::handlers::files::move_file,
        api::handlers::files::copy_file,
        api::handlers::files::rename_file,
        api::handlers::files::batch_delete,
        api::handlers::files::batch_move,
        api::handlers::files::batch_copy,
        api::handlers::search::search_files,
        api::handlers::search::recent_files,
        api::handlers::search::filter_files,
        api::handlers::stats::storage_stats,
        api::handlers::shares::create_share,
        api::handlers::shares::access_share,
        api::handlers::shares::download_shared_file,
        api::handlers::shares::delete_share,
        api::handlers::shares::list_shares,
    ),
    components(
        schemas(
            api::handlers::MessageResponse,
            api::handlers::health::HealthResponse,
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::UserResponse,
            api::handlers::auth::RegisterResponse,
            api::handlers::auth::LoginResponse,
            api::handlers::auth::ProfileUser,
            api::handlers::auth::ProfileResponse,
            api::handlers::files::UploadResponse,
            api::handlers::files::ListResponse,
            api::handlers::files::CreateFolderRequest,
            api::handlers::files::CreateFolderResponse,
            api::handlers::files::MoveRequest,
            api::handlers::files::MoveResponse,
            api::handlers::files::RenameRequest,
            api::handlers::files::RenameResponse,
            api::handlers::files::BatchDeleteRequest,
            api::handlers::files::BatchTransferRequest,
            api::handlers::files::BatchResponse,
            api::handlers::search::SearchResponse,
            api::handlers::search::RecentResponse,
            api::handlers::stats::StatsResponse,
            api::handlers::shares::CreateShareRequest,
            api::handlers::shares::ShareResponse,
            api::handlers::shares::SharedFileView,
            api::handlers::shares::ShareAccessStats,
            api::handlers::shares::ShareAccessResponse,
            api::handlers::shares::ShareListResponse,
            services::file_ops::FileInfo,
            services::file_ops::StorageStats,
            services::share_registry::ShareRecord,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "files", description = "File management endpoints"),
        (name = "batch", description = "Batch file operations"),
        (name = "search", description = "Search and filtering"),
        (name = "share", description = "Share links"),
        (name = "stats", description = "Storage statistics"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn ObjectStorage>,
    pub shares: Arc<ShareRegistry>,
    pub config: Config,
}

pub fn create_app(state: AppState) -> Router {
    use api::handlers::{auth, files, health, search, shares, stats};
    use api::middleware::auth::auth_middleware;

    // Share access and download are deliberately unauthenticated: the share
    // id plus the optional password is the credential.
    let api_v1 = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/auth/profile",
            get(auth::profile).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/upload",
            post(files::upload_file)
                .layer(axum::extract::DefaultBodyLimit::max(
                    state.config.max_file_size + 10 * 1024 * 1024,
                ))
                .layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files",
            get(files::list_files).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/download/*key",
            get(files::download_file).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files/move",
            put(files::move_file).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files/copy",
            put(files::copy_file).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files/rename",
            put(files::rename_file).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files/recent",
            get(search::recent_files).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files/filter",
            get(search::filter_files).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/files/*key",
            delete(files::delete_file).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/folders",
            post(files::create_folder).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/batch/delete",
            post(files::batch_delete).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/batch/move",
            post(files::batch_move).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/batch/copy",
            post(files::batch_copy).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/search",
            get(search::search_files).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/stats/storage",
            get(stats::storage_stats).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/share/create",
            post(shares::create_share).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/share/",
            get(shares::list_shares).layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/share/:share_id",
            get(shares::access_share).merge(
                delete(shares::delete_share)
                    .layer(from_fn_with_state(state.clone(), auth_middleware)),
            ),
        )
        .route(
            "/share/:share_id/download",
            get(shares::download_shared_file),
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
