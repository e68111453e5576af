//! Builder for creating and configuring Planner instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{Planner, PlannerConfig};
use crate::{
    error::{PlannerError, Result},
    store::{HttpRecordStore, LocalStore, RecordStore, SqliteLocalStore},
};

/// Server used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8123";

/// Default per-request timeout of the HTTP record store.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for creating and configuring Planner instances.
#[derive(Clone)]
pub struct PlannerBuilder {
    database_path: Option<PathBuf>,
    server_url: Option<String>,
    request_timeout: Duration,
    config: PlannerConfig,
    record_store: Option<Arc<dyn RecordStore>>,
    local_store: Option<Arc<dyn LocalStore>>,
}

impl PlannerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            server_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            config: PlannerConfig::default(),
            record_store: None,
            local_store: None,
        }
    }

    /// Sets a custom database file for the local store.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/plandeck/plandeck.db` or
    /// `~/.local/share/plandeck/plandeck.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the base URL of the record store server.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Sets the minimum time between two refreshes of a plan.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    /// Sets how many records are requested when loading plans.
    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.config.list_limit = limit;
        self
    }

    /// Sets the per-request timeout of the HTTP record store.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Uses `store` instead of the HTTP record store.
    pub fn with_record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    /// Uses `store` instead of the SQLite local store.
    pub fn with_local_store(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    /// Builds the configured planner instance.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if the database directory cannot be created
    /// Returns `PlannerError::LocalStore` if database initialization fails
    /// Returns `PlannerError::InvalidInput` if the server URL is invalid
    pub async fn build(self) -> Result<Planner> {
        let local: Arc<dyn LocalStore> = match self.local_store {
            Some(store) => store,
            None => {
                let db_path = match self.database_path {
                    Some(path) => path,
                    None => Self::default_database_path()?,
                };

                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| PlannerError::FileSystem {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }

                Arc::new(SqliteLocalStore::open(db_path).await?)
            }
        };

        let records: Arc<dyn RecordStore> = match self.record_store {
            Some(store) => store,
            None => {
                let url = self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL);
                Arc::new(HttpRecordStore::new(url, self.request_timeout)?)
            }
        };

        Ok(Planner::new(records, local, self.config))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("plandeck")
            .place_data_file("plandeck.db")
            .map_err(|e| PlannerError::XdgDirectory(e.to_string()))
    }
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
