pub mod auth;
pub mod files;
pub mod health;
pub mod search;
pub mod shares;
pub mod stats;

use serde::Serialize;
use utoipa::ToSchema;

/// Envelope for endpoints that only report an outcome.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
