use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GamePatch, NewGameEntity},
    storage::StorageResult,
};

/// Process-local store keeping games in insertion order.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    games: Arc<RwLock<Vec<GameEntity>>>,
}

impl MemoryGameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let games = self.games.clone();
        Box::pin(async move { Ok(games.read().await.clone()) })
    }

    fn create_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let games = self.games.clone();
        Box::pin(async move {
            let entity = game.into_entity(Uuid::new_v4());
            games.write().await.push(entity.clone());
            Ok(entity)
        })
    }

    fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let games = self.games.clone();
        Box::pin(async move {
            let mut guard = games.write().await;
            let Some(game) = guard.iter_mut().find(|game| game.id == id) else {
                return Ok(None);
            };
            patch.apply(game);
            Ok(Some(game.clone()))
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let games = self.games.clone();
        Box::pin(async move {
            let mut guard = games.write().await;
            let before = guard.len();
            guard.retain(|game| game.id != id);
            Ok(guard.len() != before)
        })
    }

    fn delete_all_games(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let games = self.games.clone();
        Box::pin(async move {
            let mut guard = games.write().await;
            let removed = guard.len() as u64;
            guard.clear();
            Ok(removed)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
