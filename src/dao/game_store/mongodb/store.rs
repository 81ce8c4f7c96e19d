use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::doc,
    options::{IndexOptions, ReturnDocument},
};
use tracing::info;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, doc_id, patch_as_set},
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GamePatch, NewGameEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const GAME_NAME_INDEX: &str = "game_name_idx";

/// MongoDB-backed store. The driver client pools connections and is cheap to clone.
#[derive(Clone)]
pub struct MongoGameStore {
    database: Database,
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;
        let store = Self { database };
        store.ensure_indexes().await?;
        info!(database = %config.database_name, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        self.collection()
            .create_index(game_name_index())
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: GAME_NAME_INDEX,
                source,
            })?;

        Ok(())
    }

    fn collection(&self) -> Collection<MongoGameDocument> {
        self.database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn list_games(&self) -> MongoResult<Vec<GameEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .collection()
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn create_game(&self, game: NewGameEntity) -> MongoResult<GameEntity> {
        let entity = game.into_entity(Uuid::new_v4());
        let id = entity.id;
        let document: MongoGameDocument = entity.clone().into();

        self.collection()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::CreateGame { id, source })?;

        Ok(entity)
    }

    async fn update_game(&self, id: Uuid, patch: GamePatch) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection();

        let result = if patch.is_empty() {
            collection.find_one(doc_id(id)).await
        } else {
            collection
                .find_one_and_update(doc_id(id), patch_as_set(&patch))
                .return_document(ReturnDocument::After)
                .await
        };

        let document = result.map_err(|source| MongoDaoError::UpdateGame { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .collection()
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all_games(&self) -> MongoResult<u64> {
        let result = self
            .collection()
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::ClearGames { source })?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

/// Non-unique index on `name`; duplicate names are allowed.
fn game_name_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! {"name": 1})
        .options(
            IndexOptions::builder()
                .name(Some(GAME_NAME_INDEX.to_owned()))
                .build(),
        )
        .build()
}

impl GameStore for MongoGameStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn create_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_game(game).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_game(id, patch).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn delete_all_games(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.delete_all_games().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_index_is_named_and_not_unique() {
        let index = game_name_index();
        let options = index.options.expect("index options");

        assert_eq!(index.keys, doc! {"name": 1});
        assert_eq!(options.name.as_deref(), Some(GAME_NAME_INDEX));
        assert_ne!(options.unique, Some(true));
    }
}
