use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    dto::game::{CreateGameRequest, GameResponse, UpdateGameRequest},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// CRUD endpoints over the game collection.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/games",
            get(list_games).post(create_game).delete(delete_all_games),
        )
        .route("/api/games/{id}", put(update_game).delete(delete_game))
}

/// List every game in the library.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    responses(
        (status = 200, description = "All games", body = [GameResponse]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// Add a game; the name is trimmed and `favorite` defaults to false.
#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameResponse),
        (status = 400, description = "Missing or blank name"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    let Json(payload) = payload?;
    let game = game_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[utoipa::path(
    put,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game to update")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameResponse),
        (status = 404, description = "Game not found, or the update was rejected")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGameRequest>, JsonRejection>,
) -> Result<Json<GameResponse>, AppError> {
    let payload = payload.map(|Json(payload)| payload);
    Ok(Json(game_service::update_game(&state, &id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Identifier of the game to delete")),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Game not found")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/games",
    tag = "games",
    responses(
        (status = 204, description = "All games deleted"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn delete_all_games(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    game_service::delete_all_games(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}
