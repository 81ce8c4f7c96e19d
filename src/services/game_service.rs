use axum::extract::rejection::JsonRejection;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GamePatch, NewGameEntity},
    dto::game::{CreateGameRequest, GameResponse, UpdateGameRequest},
    error::ServiceError,
    state::SharedState,
};

const NAME_REQUIRED: &str = "Game name is required";
const GAME_NOT_FOUND: &str = "Game not found";

/// Return every stored game.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameResponse>, ServiceError> {
    let games = state.game_store().list_games().await.map_err(|err| {
        error!(error = %err, "failed to fetch games");
        ServiceError::storage("Failed to fetch games", err)
    })?;

    Ok(games.into_iter().map(Into::into).collect())
}

/// Validate and insert a new game, trimming its name and defaulting `favorite`.
pub async fn create_game(
    state: &SharedState,
    payload: CreateGameRequest,
) -> Result<GameResponse, ServiceError> {
    payload
        .validate()
        .map_err(|_| ServiceError::InvalidInput(NAME_REQUIRED.into()))?;

    let game = state
        .game_store()
        .create_game(NewGameEntity::from(payload))
        .await
        .map_err(|err| {
            error!(error = %err, "failed to add game");
            ServiceError::storage("Failed to add game", err)
        })?;

    info!(id = %game.id, name = %game.name, "game added");
    Ok(game.into())
}

/// Apply the allowlisted fields of `payload` to the game `id`.
///
/// Every failure answers "Game not found": unknown or malformed identifiers, an
/// unreadable body, a blank name, and storage errors.
pub async fn update_game(
    state: &SharedState,
    id: &str,
    payload: Result<UpdateGameRequest, JsonRejection>,
) -> Result<GameResponse, ServiceError> {
    let id = parse_game_id(id)?;
    let payload = payload.map_err(|rejection| {
        warn!(%id, error = %rejection.body_text(), "rejecting unreadable game update");
        game_not_found()
    })?;
    payload.validate().map_err(|err| {
        warn!(%id, error = %err, "rejecting game update with blank name");
        game_not_found()
    })?;

    match state
        .game_store()
        .update_game(id, GamePatch::from(payload))
        .await
    {
        Ok(Some(game)) => Ok(game.into()),
        Ok(None) => Err(game_not_found()),
        Err(err) => {
            error!(%id, error = %err, "failed to update game");
            Err(game_not_found())
        }
    }
}

/// Remove the game `id`.
///
/// Unknown identifiers and storage failures both answer "Game not found".
pub async fn delete_game(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let id = parse_game_id(id)?;

    match state.game_store().delete_game(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(game_not_found()),
        Err(err) => {
            error!(%id, error = %err, "failed to delete game");
            Err(game_not_found())
        }
    }
}

/// Remove every game from the collection.
pub async fn delete_all_games(state: &SharedState) -> Result<(), ServiceError> {
    let removed = state.game_store().delete_all_games().await.map_err(|err| {
        error!(error = %err, "failed to clear games");
        ServiceError::storage("Failed to clear games", err)
    })?;

    info!(removed, "cleared games");
    Ok(())
}

/// Identifiers that are not UUIDs cannot match a stored game.
fn parse_game_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|err| {
        warn!(id = raw, error = %err, "rejecting malformed game id");
        game_not_found()
    })
}

fn game_not_found() -> ServiceError {
    ServiceError::NotFound(GAME_NOT_FOUND.into())
}
