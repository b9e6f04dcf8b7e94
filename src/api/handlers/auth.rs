use crate::api::error::AppError;
use crate::api::handlers::MessageResponse;
use crate::entities::users;
use crate::services::user_service::UserService;
use crate::utils::auth::Claims;
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30, message = "username must be 3-30 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub invite_code: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub user_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            user_id: user.user_id,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileUser {
    pub user_id: String,
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: ProfileUser,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Username already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(required) = &state.config.invite_code {
        if payload.invite_code.as_deref() != Some(required.as_str()) {
            return Err(AppError::BadRequest("invalid invite code".to_string()));
        }
    }

    let user = UserService::register_user(&state.db, &payload.username, &payload.password).await?;

    tracing::info!("👤 Registered user {} ({})", user.username, user.user_id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "registration successful".to_string(),
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, token) = UserService::login_user(
        &state.db,
        &state.config.jwt_secret,
        &payload.username,
        &payload.password,
    )
    .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "login successful".to_string(),
        token,
        user: user.into(),
    }))
}

/// Tokens are self-contained, so logout is a client-side act; the endpoint
/// exists so clients have something to call.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::ok("logged out"))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "auth"
)]
pub async fn profile(Extension(claims): Extension<Claims>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        user: ProfileUser {
            user_id: claims.user_id,
            username: claims.username,
        },
    })
}
