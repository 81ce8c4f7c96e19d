use serde::Serialize;
use utoipa::ToSchema;

/// Greeting returned by `/api/message`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Greeting text.
    pub message: String,
}
