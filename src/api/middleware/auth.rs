use crate::AppState;
use crate::api::error::AppError;
use crate::utils::auth::validate_jwt;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

/// Bearer-token gate for every protected route. All failure modes collapse
/// into the same 401 so a caller cannot tell a bad signature from an expired
/// token from a missing header.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let token = if let Some(t) = auth_header {
        Some(t)
    } else {
        // Query-parameter fallback for links that cannot carry headers
        let query = req.uri().query().unwrap_or_default();
        serde_urlencoded::from_str::<AuthQuery>(query)
            .ok()
            .and_then(|q| q.token)
    };

    if let Some(token) = token {
        if let Ok(claims) = validate_jwt(&token, &state.config.jwt_secret) {
            req.extensions_mut().insert(claims);
            return Ok(next.run(req).await);
        }
    }

    Err(AppError::Unauthorized(
        "missing or invalid credentials".to_string(),
    ))
}
