use mongodb::bson::{self, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{GameEntity, GamePatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    #[serde(default)]
    favorite: bool,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: uuid_as_bson(value.id),
            name: value.name,
            favorite: value.favorite,
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: Uuid::from_bytes(value.id.bytes()),
            name: value.name,
            favorite: value.favorite,
        }
    }
}

fn uuid_as_bson(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_bson(id)}
}

/// `$set` document for the fields carried by the patch.
pub fn patch_as_set(patch: &GamePatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(favorite) = patch.favorite {
        set.insert("favorite", favorite);
    }
    doc! {"$set": set}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keeps_game_identifier() {
        let game = GameEntity {
            id: Uuid::new_v4(),
            name: "Chess".into(),
            favorite: true,
        };

        let document: MongoGameDocument = game.clone().into();
        assert_eq!(GameEntity::from(document), game);
    }

    #[test]
    fn patch_sets_only_provided_fields() {
        let patch = GamePatch {
            name: None,
            favorite: Some(true),
        };

        assert_eq!(patch_as_set(&patch), doc! {"$set": {"favorite": true}});
    }
}
