use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the game library API.
#[openapi(
    paths(
        crate::routes::root::index,
        crate::routes::root::message,
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::create_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::games::delete_all_games,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::message::MessageResponse,
            crate::dto::game::GameResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game library CRUD operations"),
    )
)]
pub struct ApiDoc;
