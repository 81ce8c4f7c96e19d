//! vgdb-back binary entrypoint wiring configuration, storage, and the HTTP router.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vgdb_back::{
    config::{AppConfig, StorageBackend},
    dao::game_store::{GameStore, MemoryGameStore},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("loading configuration")?;
    let store = connect_store(&config).await?;
    let app = routes::app(AppState::new(store), &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.context("binding server")?;
    info!(%addr, port = config.port, "server running");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the single store instance shared by every request.
async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn GameStore>> {
    match config.storage {
        StorageBackend::Memory => {
            info!("using in-memory storage; data is lost on exit");
            Ok(Arc::new(MemoryGameStore::new()))
        }
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use vgdb_back::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

            let mongo_config = MongoConfig::from_uri(&config.mongo_uri, config.mongo_db.as_deref())
                .await
                .context("parsing MongoDB configuration")?;
            let store = MongoGameStore::connect(mongo_config)
                .await
                .context("connecting to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            use vgdb_back::dao::game_store::couchdb::{CouchConfig, CouchGameStore};

            let mut couch_config = CouchConfig::new(&config.couch_url, &config.couch_db);
            if let Some(credentials) = &config.couch_credentials {
                couch_config =
                    couch_config.with_credentials(&credentials.username, &credentials.password);
            }
            let store = CouchGameStore::connect(couch_config)
                .await
                .context("connecting to CouchDB")?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("storage backend {other:?} is not compiled into this binary"),
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
