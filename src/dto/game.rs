use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{GameEntity, GamePatch, NewGameEntity},
    dto::validation::validate_game_name,
};

/// Game as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct GameResponse {
    /// UUID assigned when the game was created.
    pub id: Uuid,
    /// Trimmed display name.
    pub name: String,
    /// Whether the game is flagged as a favorite.
    pub favorite: bool,
}

impl From<GameEntity> for GameResponse {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            favorite: entity.favorite,
        }
    }
}

/// Payload used to add a game to the library.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Required; surrounding whitespace is trimmed.
    #[serde(default)]
    #[schema(value_type = String)]
    pub name: Option<String>,
    /// Defaults to `false`.
    #[serde(default)]
    pub favorite: Option<bool>,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self.name.as_deref() {
            Some(name) => {
                if let Err(e) = validate_game_name(name) {
                    errors.add("name", e);
                }
            }
            None => errors.add("name", ValidationError::new("required")),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<CreateGameRequest> for NewGameEntity {
    fn from(request: CreateGameRequest) -> Self {
        Self {
            name: request.name.unwrap_or_default().trim().to_owned(),
            favorite: request.favorite.unwrap_or(false),
        }
    }
}

/// Partial update of a game. Only `name` and `favorite` are applied; other fields are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub favorite: Option<bool>,
}

impl Validate for UpdateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.name {
            if let Err(e) = validate_game_name(name) {
                errors.add("name", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<UpdateGameRequest> for GamePatch {
    fn from(request: UpdateGameRequest) -> Self {
        Self {
            name: request.name.map(|name| name.trim().to_owned()),
            favorite: request.favorite,
        }
    }
}
