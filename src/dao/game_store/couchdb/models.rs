use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::{game_store::couchdb::error::CouchDaoError, models::GameEntity};

pub const GAME_PREFIX: &str = "game::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub name: String,
    #[serde(default)]
    pub favorite: bool,
}

/// Tombstone sent through `_bulk_docs` to delete a revision.
#[derive(Debug, Serialize)]
pub struct DeletedDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_deleted")]
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkDocsRequest<T> {
    pub docs: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDocsResult {
    #[serde(default)]
    pub ok: bool,
}

impl CouchGameDocument {
    pub fn from_entity(game: GameEntity, rev: Option<String>) -> Self {
        Self {
            id: game_doc_id(game.id),
            rev,
            name: game.name,
            favorite: game.favorite,
        }
    }

    pub fn try_into_entity(self) -> Result<GameEntity, CouchDaoError> {
        let id = parse_game_doc_id(&self.id)?;
        Ok(GameEntity {
            id,
            name: self.name,
            favorite: self.favorite,
        })
    }

    pub fn tombstone(&self) -> Option<DeletedDocument> {
        self.rev.clone().map(|rev| DeletedDocument {
            id: self.id.clone(),
            rev,
            deleted: true,
        })
    }
}

pub fn game_doc_id(id: Uuid) -> String {
    format!("{GAME_PREFIX}{id}")
}

pub fn parse_game_doc_id(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    doc_id
        .strip_prefix(GAME_PREFIX)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_doc_id_round_trips_through_parser() {
        let id = Uuid::new_v4();
        assert_eq!(parse_game_doc_id(&game_doc_id(id)).unwrap(), id);
    }

    #[test]
    fn foreign_document_ids_are_rejected() {
        assert!(parse_game_doc_id("_design/games").is_err());
        assert!(parse_game_doc_id("game::not-a-uuid").is_err());
    }

    #[test]
    fn new_documents_serialize_without_revision() {
        let game = GameEntity {
            id: Uuid::new_v4(),
            name: "Chess".into(),
            favorite: false,
        };

        let value = serde_json::to_value(CouchGameDocument::from_entity(game, None)).unwrap();
        assert!(value.get("_rev").is_none());
        assert_eq!(value["name"], "Chess");
        assert_eq!(value["favorite"], false);
    }
}
