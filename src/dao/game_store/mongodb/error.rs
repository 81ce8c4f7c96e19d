use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB store operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// What went wrong while talking to MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    /// The driver rejected the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The server never answered during startup.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A `/healthcheck` ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// Creating the `name` index failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    /// Reading the collection failed.
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    /// Inserting a game failed.
    #[error("failed to create game `{id}`")]
    CreateGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Patching a game failed.
    #[error("failed to update game `{id}`")]
    UpdateGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Removing one game failed.
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    /// Removing every game failed.
    #[error("failed to clear games")]
    ClearGames {
        #[source]
        source: MongoError,
    },
}
