use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Game record as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Identifier generated by the store when the game is created.
    pub id: Uuid,
    /// Display name, already trimmed and never blank.
    pub name: String,
    /// Whether the game is flagged as a favorite.
    pub favorite: bool,
}

/// Payload for inserting a game; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameEntity {
    /// Trimmed, non-blank name.
    pub name: String,
    /// Initial favorite flag.
    pub favorite: bool,
}

impl NewGameEntity {
    /// Attach a freshly generated identifier to the payload.
    pub fn into_entity(self, id: Uuid) -> GameEntity {
        GameEntity {
            id,
            name: self.name,
            favorite: self.favorite,
        }
    }
}

/// Partial update applied to an existing game. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePatch {
    /// Replacement name, already trimmed and validated.
    pub name: Option<String>,
    /// Replacement favorite flag.
    pub favorite: Option<bool>,
}

impl GamePatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.favorite.is_none()
    }

    /// Apply the patch in place.
    pub fn apply(&self, game: &mut GameEntity) {
        if let Some(name) = &self.name {
            game.name = name.clone();
        }
        if let Some(favorite) = self.favorite {
            game.favorite = favorite;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chess() -> GameEntity {
        NewGameEntity {
            name: "Chess".into(),
            favorite: false,
        }
        .into_entity(Uuid::new_v4())
    }

    #[test]
    fn empty_patch_leaves_game_untouched() {
        let mut game = chess();
        let before = game.clone();
        let patch = GamePatch::default();

        assert!(patch.is_empty());
        patch.apply(&mut game);
        assert_eq!(game, before);
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut game = chess();
        let id = game.id;
        GamePatch {
            name: None,
            favorite: Some(true),
        }
        .apply(&mut game);

        assert_eq!(game.id, id);
        assert_eq!(game.name, "Chess");
        assert!(game.favorite);
    }
}
