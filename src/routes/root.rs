use axum::{Json, Router, routing::get};

use crate::{dto::message::MessageResponse, state::SharedState};

const RUNNING_TEXT: &str = "Backend is running 🚀";
const GREETING: &str = "Hello from the game library backend!";

/// Static liveness text and greeting routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/api/message", get(message))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String, content_type = "text/plain"))
)]
/// Plain-text liveness check.
pub async fn index() -> &'static str {
    RUNNING_TEXT
}

#[utoipa::path(
    get,
    path = "/api/message",
    tag = "health",
    responses((status = 200, description = "Static greeting", body = MessageResponse))
)]
/// Static greeting used by frontends to check connectivity.
pub async fn message() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: GREETING.into(),
    })
}
