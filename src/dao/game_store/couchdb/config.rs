/// Connection settings for the CouchDB store, built from [`AppConfig`](crate::config::AppConfig).
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root such as `http://localhost:5984`.
    pub base_url: String,
    /// Database holding the game documents; created on connect when missing.
    pub database: String,
    /// Basic-auth `(username, password)`.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Anonymous access to `database` on the server at `base_url`.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            credentials: None,
        }
    }

    /// Authenticate every request with basic auth.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }
}
