//! Failures of the CouchDB game store.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB store operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// What went wrong while talking to CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an HTTP response.
    #[error("CouchDB request to `{path}` failed")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with a status the store does not handle.
    #[error("CouchDB answered {status} for `{path}`")]
    Status { path: String, status: StatusCode },
    /// The response body was not the expected JSON.
    #[error("unreadable CouchDB response for `{path}`")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// An `_all_docs` row did not hold a game document.
    #[error("document `{path}` is not a game")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A game document id lacks the `game::` prefix or a UUID.
    #[error("invalid game document id `{doc_id}`")]
    InvalidDocId { doc_id: String },
}
