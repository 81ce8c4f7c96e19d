use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DB: &str = "vgdb";

/// Parsed driver options plus the database holding the `games` collection.
#[derive(Clone)]
pub struct MongoConfig {
    /// Driver options parsed from `MONGO_URI`.
    pub options: ClientOptions,
    /// `MONGO_DB`, or `vgdb` when unset.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse the connection URI, falling back to the default database name.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or(DEFAULT_DB).to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }
}
