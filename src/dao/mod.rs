/// Game storage backends and the abstraction they implement.
pub mod game_store;
/// Persistence model definitions shared by every backend.
pub mod models;
/// Backend-agnostic storage errors.
pub mod storage;
