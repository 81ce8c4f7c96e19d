/// OpenAPI documentation generation.
pub mod documentation;
/// Game collection operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
