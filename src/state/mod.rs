use std::sync::Arc;

use crate::dao::game_store::GameStore;

/// Handle cloned into every axum handler.
pub type SharedState = Arc<AppState>;

/// Central application state holding the store handle shared by every request.
pub struct AppState {
    game_store: Arc<dyn GameStore>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(game_store: Arc<dyn GameStore>) -> SharedState {
        Arc::new(Self { game_store })
    }

    /// Obtain a handle to the installed game store.
    pub fn game_store(&self) -> Arc<dyn GameStore> {
        self.game_store.clone()
    }
}
