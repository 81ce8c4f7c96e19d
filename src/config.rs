//! Application-level configuration loaded from the environment and an optional JSON file.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "VGDB_BACK_CONFIG_PATH";
/// Port used when `PORT` is unset or unparsable.
pub const DEFAULT_PORT: u16 = 5000;
/// Frontends allowed to call the API when the config file does not list any.
const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "https://vgdb-frontend.vercel.app",
];
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_COUCH_URL: &str = "http://localhost:5984";
const DEFAULT_COUCH_DB: &str = "vgdb";

/// Persistence backend selected through `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// MongoDB through the official driver.
    #[default]
    Mongo,
    /// CouchDB through its HTTP API.
    Couch,
    /// Process-local store; data is lost on exit.
    Memory,
}

/// Configuration values that cannot be used to start the server.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `STORAGE_BACKEND` names no known backend.
    #[error("unknown storage backend `{0}` (expected mongo, couch or memory)")]
    UnknownBackend(String),
    /// Only one of `COUCH_USERNAME` / `COUCH_PASSWORD` was provided.
    #[error("COUCH_USERNAME and COUCH_PASSWORD must be set together")]
    PartialCouchCredentials,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "couch" | "couchdb" => Ok(StorageBackend::Couch),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::UnknownBackend(value.to_owned())),
        }
    }
}

/// Basic-auth credentials for CouchDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchCredentials {
    /// `COUCH_USERNAME`.
    pub username: String,
    /// `COUCH_PASSWORD`.
    pub password: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server binds on all interfaces.
    pub port: u16,
    /// Which [`GameStore`](crate::dao::game_store::GameStore) implementation to build.
    pub storage: StorageBackend,
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// MongoDB database name, when overriding the default.
    pub mongo_db: Option<String>,
    /// CouchDB server root, without the database segment.
    pub couch_url: String,
    /// CouchDB database holding the game documents.
    pub couch_db: String,
    /// CouchDB credentials, when the server requires authentication.
    pub couch_credentials: Option<CouchCredentials>,
    /// Origins accepted by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load the configuration from the environment and the optional JSON file.
    pub fn load() -> Result<Self, ConfigError> {
        let raw = load_raw_config();
        Self::from_lookup(|key| env::var(key).ok(), raw)
    }

    /// Build the configuration from a variable lookup (the process environment in production).
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        raw: Option<RawConfig>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match lookup("PORT").map(|value| value.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(err)) => {
                warn!(error = %err, default = DEFAULT_PORT, "invalid PORT; using default");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        let storage = lookup("STORAGE_BACKEND")
            .map(|value| value.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or_default();

        let couch_credentials = match (lookup("COUCH_USERNAME"), lookup("COUCH_PASSWORD")) {
            (Some(username), Some(password)) => Some(CouchCredentials { username, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCouchCredentials),
        };

        let allowed_origins = raw
            .and_then(|raw| raw.allowed_origins)
            .unwrap_or_else(default_allowed_origins);

        Ok(Self {
            port,
            storage,
            mongo_uri: lookup("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.into()),
            mongo_db: lookup("MONGO_DB"),
            couch_url: lookup("COUCH_BASE_URL").unwrap_or_else(|| DEFAULT_COUCH_URL.into()),
            couch_db: lookup("COUCH_DB").unwrap_or_else(|| DEFAULT_COUCH_DB.into()),
            couch_credentials,
            allowed_origins,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageBackend::default(),
            mongo_uri: DEFAULT_MONGO_URI.into(),
            mongo_db: None,
            couch_url: DEFAULT_COUCH_URL.into(),
            couch_db: DEFAULT_COUCH_DB.into(),
            couch_credentials: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.map(String::from).to_vec()
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
}

/// Read the optional config file; parse or IO failures fall back to defaults.
fn load_raw_config() -> Option<RawConfig> {
    let path = resolve_config_path();
    match fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
            Ok(raw) => {
                info!(path = %path.display(), "loaded config file");
                Some(raw)
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                None
            }
        },
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using built-in defaults"
            );
            None
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to read config; falling back to defaults"
            );
            None
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
