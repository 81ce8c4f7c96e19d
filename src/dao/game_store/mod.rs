#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{GameEntity, GamePatch, NewGameEntity};
use crate::dao::storage::StorageResult;

pub use memory::MemoryGameStore;

/// Abstraction over the persistence layer holding the game collection.
pub trait GameStore: Send + Sync {
    /// Every stored game, in the order the backend returns them.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Insert a game and return it with its generated identifier.
    fn create_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Apply `patch` to the game `id`; `None` when no such game exists.
    fn update_game(
        &self,
        id: Uuid,
        patch: GamePatch,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Remove the game `id`; `false` when no such game exists.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove every game and return how many were deleted.
    fn delete_all_games(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Cheap round-trip to the backend used by `/healthcheck`.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
