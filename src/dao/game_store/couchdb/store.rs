use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::info;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GamePatch, NewGameEntity},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, BulkDocsRequest, BulkDocsResult, CouchGameDocument, END_SUFFIX,
        GAME_PREFIX, game_doc_id,
    },
};

const ALL_DOCS: &str = "_all_docs";
const BULK_DOCS: &str = "_bulk_docs";

/// CouchDB-backed store; games live in one database as `game::<uuid>` documents.
#[derive(Clone)]
pub struct CouchGameStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<Arc<(String, String)>>,
}

impl CouchGameStore {
    /// Build the HTTP client and create the database when it does not exist yet.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            database: Arc::from(config.database),
            auth: config.credentials.map(Arc::new),
        };

        store.ensure_database().await?;
        info!(database = %store.database, "connected to CouchDB");
        Ok(store)
    }

    /// Request against the database root (empty `path`) or one of its documents.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.is_empty() {
            format!("{}/{}", self.base_url, self.database)
        } else {
            format!("{}/{}/{}", self.base_url, self.database, path)
        };
        let builder = self.client.request(method, url);
        match self.auth.as_deref() {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = &*self.database;
        let response = send(database, self.request(Method::GET, "")).await?;
        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(unexpected(database, &response));
        }

        let created = send(database, self.request(Method::PUT, "")).await?;
        // 412: created concurrently by another instance.
        if created.status().is_success() || created.status() == StatusCode::PRECONDITION_FAILED {
            info!(database, "created CouchDB database");
            Ok(())
        } else {
            Err(unexpected(database, &created))
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = send(doc_id, self.request(Method::GET, doc_id)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode(doc_id, response).await.map(Some),
            _ => Err(unexpected(doc_id, &response)),
        }
    }

    /// Write a document; a stale or missing `_rev` on an existing document answers 409.
    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = send(doc_id, self.request(Method::PUT, doc_id).json(document)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(unexpected(doc_id, &response))
        }
    }

    /// Delete one revision; `false` when the document is already gone.
    async fn delete_document(&self, doc_id: &str, rev: &str) -> CouchResult<bool> {
        let request = self.request(Method::DELETE, doc_id).query(&[("rev", rev)]);
        let response = send(doc_id, request).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(unexpected(doc_id, &response)),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];

        let response = send(ALL_DOCS, self.request(Method::GET, ALL_DOCS).query(&query)).await?;
        if !response.status().is_success() {
            return Err(unexpected(ALL_DOCS, &response));
        }

        let payload: AllDocsResponse = decode(ALL_DOCS, response).await?;
        payload
            .rows
            .into_iter()
            .filter_map(|row| row.doc.map(|doc| (row.id, doc)))
            .map(|(path, doc)| {
                from_value(doc).map_err(|source| CouchDaoError::Deserialize { path, source })
            })
            .collect()
    }

    async fn list_games(&self) -> CouchResult<Vec<GameEntity>> {
        self.list_documents::<CouchGameDocument>(GAME_PREFIX)
            .await?
            .into_iter()
            .map(CouchGameDocument::try_into_entity)
            .collect()
    }

    async fn create_game(&self, game: NewGameEntity) -> CouchResult<GameEntity> {
        let entity = game.into_entity(Uuid::new_v4());
        let doc_id = game_doc_id(entity.id);
        let document = CouchGameDocument::from_entity(entity.clone(), None);
        self.put_document(&doc_id, &document).await?;
        Ok(entity)
    }

    /// Read-modify-write carrying the current `_rev`; a concurrent writer surfaces as a 409 error.
    async fn update_game(&self, id: Uuid, patch: GamePatch) -> CouchResult<Option<GameEntity>> {
        let doc_id = game_doc_id(id);
        let Some(existing) = self.get_document::<CouchGameDocument>(&doc_id).await? else {
            return Ok(None);
        };

        let rev = existing.rev.clone();
        let mut entity = existing.try_into_entity()?;
        if patch.is_empty() {
            return Ok(Some(entity));
        }

        patch.apply(&mut entity);
        let document = CouchGameDocument::from_entity(entity.clone(), rev);
        self.put_document(&doc_id, &document).await?;
        Ok(Some(entity))
    }

    async fn delete_game(&self, id: Uuid) -> CouchResult<bool> {
        let doc_id = game_doc_id(id);
        let Some(CouchGameDocument { rev: Some(rev), .. }) =
            self.get_document::<CouchGameDocument>(&doc_id).await?
        else {
            return Ok(false);
        };
        self.delete_document(&doc_id, &rev).await
    }

    /// Tombstones every game in one `_bulk_docs` call; counts the rows CouchDB accepted.
    async fn delete_all_games(&self) -> CouchResult<u64> {
        let tombstones: Vec<_> = self
            .list_documents::<CouchGameDocument>(GAME_PREFIX)
            .await?
            .iter()
            .filter_map(CouchGameDocument::tombstone)
            .collect();

        if tombstones.is_empty() {
            return Ok(0);
        }

        let request = self
            .request(Method::POST, BULK_DOCS)
            .json(&BulkDocsRequest { docs: tombstones });
        let response = send(BULK_DOCS, request).await?;
        if !response.status().is_success() {
            return Err(unexpected(BULK_DOCS, &response));
        }

        let results: Vec<BulkDocsResult> = decode(BULK_DOCS, response).await?;
        Ok(results.iter().filter(|result| result.ok).count() as u64)
    }

    async fn ping(&self) -> CouchResult<()> {
        let response = send(&self.database, self.request(Method::GET, "")).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(unexpected(&self.database, &response))
        }
    }
}

async fn send(path: &str, request: RequestBuilder) -> CouchResult<Response> {
    request.send().await.map_err(|source| CouchDaoError::Request {
        path: path.to_owned(),
        source,
    })
}

fn unexpected(path: &str, response: &Response) -> CouchDaoError {
    CouchDaoError::Status {
        path: path.to_owned(),
        status: response.status(),
    }
}

async fn decode<T>(path: &str, response: Response) -> CouchResult<T>
where
    T: DeserializeOwned,
{
    response
        .json::<T>()
        .await
        .map_err(|source| CouchDaoError::Decode {
            path: path.to_owned(),
            source,
        })
}

impl GameStore for CouchGameStore {
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
    use std::{
        collections::{BTreeMap, HashMap},
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    /// Minimal CouchDB: one database, `N-fake` revisions, 409 on stale `_rev`.
    #[derive(Clone, Default)]
    struct FakeCouch {
        inner: Arc<Mutex<FakeDatabase>>,
    }

    #[derive(Default)]
    struct FakeDatabase {
        created: bool,
        docs: BTreeMap<String, Value>,
    }

    type Reply = (StatusCode, Json<Value>);

    fn reply(status: StatusCode, body: Value) -> Reply {
        (status, Json(body))
    }

    fn conflict() -> Reply {
        reply(StatusCode::CONFLICT, json!({"error": "conflict"}))
    }

    fn next_rev(current: Option<&str>) -> String {
        let generation = current
            .and_then(|rev| rev.split('-').next())
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0);
        format!("{}-fake", generation + 1)
    }

    fn current_rev(doc: &Value) -> Option<&str> {
        doc.get("_rev").and_then(Value::as_str)
    }

    impl FakeCouch {
        fn database_exists(&self) -> bool {
            self.inner.lock().unwrap().created
        }

        fn rev_of(&self, doc_id: &str) -> Option<String> {
            let db = self.inner.lock().unwrap();
            db.docs.get(doc_id).and_then(current_rev).map(str::to_owned)
        }

        fn router(self) -> Router {
            Router::new()
                .route("/{db}", get(get_database).put(put_database))
                .route("/{db}/_all_docs", get(all_docs))
                .route("/{db}/_bulk_docs", post(bulk_docs))
                .route(
                    "/{db}/{id}",
                    get(get_doc).put(put_doc).delete(delete_doc),
                )
                .with_state(self)
        }
    }

    async fn get_database(State(couch): State<FakeCouch>, Path(db): Path<String>) -> Reply {
        if couch.database_exists() {
            reply(StatusCode::OK, json!({"db_name": db}))
        } else {
            reply(StatusCode::NOT_FOUND, json!({"error": "not_found"}))
        }
    }

    async fn put_database(State(couch): State<FakeCouch>) -> Reply {
        let mut db = couch.inner.lock().unwrap();
        if db.created {
            return reply(StatusCode::PRECONDITION_FAILED, json!({"error": "file_exists"}));
        }
        db.created = true;
        reply(StatusCode::CREATED, json!({"ok": true}))
    }

    async fn get_doc(
        State(couch): State<FakeCouch>,
        Path((_, id)): Path<(String, String)>,
    ) -> Reply {
        match couch.inner.lock().unwrap().docs.get(&id) {
            Some(doc) => reply(StatusCode::OK, doc.clone()),
            None => reply(StatusCode::NOT_FOUND, json!({"error": "not_found"})),
        }
    }

    async fn put_doc(
        State(couch): State<FakeCouch>,
        Path((_, id)): Path<(String, String)>,
        Json(mut body): Json<Value>,
    ) -> Reply {
        let mut db = couch.inner.lock().unwrap();
        let stored = db.docs.get(&id).and_then(current_rev).map(str::to_owned);
        if stored.as_deref() != current_rev(&body) {
            return conflict();
        }

        let rev = next_rev(stored.as_deref());
        body["_id"] = json!(id);
        body["_rev"] = json!(rev);
        db.docs.insert(id.clone(), body);
        reply(StatusCode::CREATED, json!({"ok": true, "id": id, "rev": rev}))
    }

    async fn delete_doc(
        State(couch): State<FakeCouch>,
        Path((_, id)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Reply {
        let mut db = couch.inner.lock().unwrap();
        let Some(stored) = db.docs.get(&id) else {
            return reply(StatusCode::NOT_FOUND, json!({"error": "not_found"}));
        };
        if current_rev(stored) != query.get("rev").map(String::as_str) {
            return conflict();
        }
        db.docs.remove(&id);
        reply(StatusCode::OK, json!({"ok": true, "id": id}))
    }

    async fn all_docs(
        State(couch): State<FakeCouch>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Reply {
        let key = |name: &str| {
            query
                .get(name)
                .and_then(|raw| serde_json::from_str::<String>(raw).ok())
        };
        let (start, end) = (key("startkey").unwrap_or_default(), key("endkey"));
        let include_docs = query.get("include_docs").is_some_and(|v| v == "true");

        let db = couch.inner.lock().unwrap();
        let rows: Vec<Value> = db
            .docs
            .iter()
            .filter(|(id, _)| id.as_str() >= start.as_str())
            .filter(|(id, _)| end.as_deref().is_none_or(|end| id.as_str() <= end))
            .map(|(id, doc)| {
                let mut row = json!({"id": id, "key": id, "value": {"rev": current_rev(doc)}});
                if include_docs {
                    row["doc"] = doc.clone();
                }
                row
            })
            .collect();
        reply(StatusCode::OK, json!({"total_rows": db.docs.len(), "rows": rows}))
    }

    async fn bulk_docs(State(couch): State<FakeCouch>, Json(body): Json<Value>) -> Reply {
        let mut db = couch.inner.lock().unwrap();
        let docs = body["docs"].as_array().cloned().unwrap_or_default();
        let results: Vec<Value> = docs
            .iter()
            .map(|doc| {
                let id = doc["_id"].as_str().unwrap_or_default().to_owned();
                let matches = db
                    .docs
                    .get(&id)
                    .is_some_and(|stored| current_rev(stored) == current_rev(doc));
                if matches && doc["_deleted"] == json!(true) {
                    db.docs.remove(&id);
                    json!({"ok": true, "id": id})
                } else {
                    json!({"id": id, "error": "conflict"})
                }
            })
            .collect();
        reply(StatusCode::CREATED, Value::Array(results))
    }

    async fn spawn_fake_couch() -> (FakeCouch, CouchConfig) {
        let couch = FakeCouch::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = couch.clone().router();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (couch, CouchConfig::new(format!("http://{addr}/"), "vgdb"))
    }

    async fn connected_store() -> (FakeCouch, CouchGameStore) {
        let (couch, config) = spawn_fake_couch().await;
        let store = CouchGameStore::connect(config).await.unwrap();
        (couch, store)
    }

    fn new_game(name: &str) -> NewGameEntity {
        NewGameEntity {
            name: name.into(),
            favorite: false,
        }
    }

    #[tokio::test]
    async fn connect_creates_missing_database_and_reconnects() {
        let (couch, config) = spawn_fake_couch().await;
        assert!(!couch.database_exists());

        let store = CouchGameStore::connect(config.clone()).await.unwrap();
        assert!(couch.database_exists());
        store.ping().await.unwrap();

        CouchGameStore::connect(config).await.unwrap();
    }

    #[tokio::test]
    async fn created_games_are_listed() {
        let (couch, store) = connected_store().await;

        let chess = store.create_game(new_game("Chess")).await.unwrap();
        let go = store.create_game(new_game("Go")).await.unwrap();

        let mut listed = store.list_games().await.unwrap();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(listed, vec![chess.clone(), go]);
        assert_eq!(couch.rev_of(&game_doc_id(chess.id)).as_deref(), Some("1-fake"));
    }

    #[tokio::test]
    async fn updates_carry_the_current_revision() {
        let (couch, store) = connected_store().await;
        let game = store.create_game(new_game("Chess")).await.unwrap();
        let doc_id = game_doc_id(game.id);

        let favorite = GamePatch {
            name: None,
            favorite: Some(true),
        };
        let renamed = GamePatch {
            name: Some("Shogi".into()),
            favorite: None,
        };
        store.update_game(game.id, favorite).await.unwrap();
        let updated = store.update_game(game.id, renamed).await.unwrap().unwrap();

        assert_eq!(updated.id, game.id);
        assert_eq!(updated.name, "Shogi");
        assert!(updated.favorite);
        assert_eq!(couch.rev_of(&doc_id).as_deref(), Some("3-fake"));
        assert_eq!(store.list_games().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn empty_patch_leaves_the_revision_alone() {
        let (couch, store) = connected_store().await;
        let game = store.create_game(new_game("Chess")).await.unwrap();

        let unchanged = store
            .update_game(game.id, GamePatch::default())
            .await
            .unwrap();

        assert_eq!(unchanged, Some(game.clone()));
        assert_eq!(couch.rev_of(&game_doc_id(game.id)).as_deref(), Some("1-fake"));
    }

    #[tokio::test]
    async fn updating_a_missing_game_returns_none() {
        let (_couch, store) = connected_store().await;
        let patch = GamePatch {
            name: None,
            favorite: Some(true),
        };

        assert_eq!(store.update_game(Uuid::new_v4(), patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stale_revision_is_reported_as_conflict() {
        let (_couch, store) = connected_store().await;
        let game = store.create_game(new_game("Chess")).await.unwrap();
        let doc_id = game_doc_id(game.id);

        let stale = CouchGameDocument::from_entity(game, None);
        let err = store.put_document(&doc_id, &stale).await.unwrap_err();

        assert!(matches!(
            err,
            CouchDaoError::Status { status: StatusCode::CONFLICT, ref path } if *path == doc_id
        ));
    }

    #[tokio::test]
    async fn delete_game_reports_whether_it_removed_something() {
        let (_couch, store) = connected_store().await;
        let game = store.create_game(new_game("Chess")).await.unwrap();

        assert!(store.delete_game(game.id).await.unwrap());
        assert!(!store.delete_game(game.id).await.unwrap());
        assert!(store.list_games().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_all_games_counts_tombstones() {
        let (_couch, store) = connected_store().await;
        assert_eq!(store.delete_all_games().await.unwrap(), 0);

        for name in ["Chess", "Go", "Shogi"] {
            store.create_game(new_game(name)).await.unwrap();
        }

        assert_eq!(store.delete_all_games().await.unwrap(), 3);
        assert!(store.list_games().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = CouchGameStore::connect(CouchConfig::new(format!("http://{addr}"), "vgdb")).await;

        assert!(matches!(result, Err(CouchDaoError::Request { .. })));
    }
}
