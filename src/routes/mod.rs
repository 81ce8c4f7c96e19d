use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{config::AppConfig, state::SharedState};

pub mod docs;
pub mod games;
pub mod health;
pub mod root;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = root::router()
        .merge(health::router())
        .merge(games::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

/// Build the top-level application and attach cross-cutting middleware layers.
pub fn app(state: SharedState, config: &AppConfig) -> Router<()> {
    router(state)
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Only the configured frontends may call the API, with the CRUD verbs it serves.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
