//! Contracts for the remote record store and the local persistent store,
//! with their concrete implementations.
//!
//! - [`HttpRecordStore`]: the REST record store over `reqwest`
//! - [`MemoryRecordStore`]: in-process record store with failure injection
//! - [`SqliteLocalStore`]: plan membership and secrets in a SQLite key-value table

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{Record, TaskPatch, User},
};

pub mod http;
pub mod memory;
pub mod sqlite;

pub use http::HttpRecordStore;
pub use memory::{MemoryRecordStore, Operation};
pub use sqlite::{Database, SqliteLocalStore};

/// Remote collection of flat task and plan records.
///
/// Transport failures are reported as `NetworkUnavailable`, non-2xx answers
/// as `ServerRejected` carrying the status code and body text.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Up to `limit` records of any plan.
    async fn list(&self, limit: usize) -> Result<Vec<Record>>;

    /// Stores a new record and returns the server's echo.
    async fn create(&self, record: &Record) -> Result<Record>;

    /// Applies a partial update and returns the updated record.
    async fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Record>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// The record `root_id` and every record below it.
    async fn fetch_subtree(&self, root_id: &str) -> Result<Vec<Record>>;
}

/// Secrets of a plan that are never sourced from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSecret {
    pub access_key: String,
    pub me_user_id: String,
}

/// Durable store of known plan ids and their secrets.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Known plan ids in registration order.
    async fn plan_ids(&self) -> Result<Vec<String>>;

    /// Registers a plan, overwriting the secrets of an already known id.
    ///
    /// A plan joined before its local identity is chosen is registered with
    /// `me_user_id` set to `None`.
    async fn add_plan(&self, id: &str, access_key: &str, me_user_id: Option<&str>)
        -> Result<()>;

    /// Forgets a plan, its secrets and its pending deletes.
    async fn remove_plan(&self, id: &str) -> Result<()>;

    /// Both halves of a plan's secret, or `None` if either is missing.
    async fn plan_secret(&self, id: &str) -> Result<Option<PlanSecret>>;

    async fn set_me_user_id(&self, id: &str, user_id: &str) -> Result<()>;

    /// App-level profile used as creator of new plans.
    async fn default_user(&self) -> Result<User>;

    async fn set_default_user(&self, user: &User) -> Result<()>;

    /// Ids deleted locally whose server delete is not confirmed yet.
    async fn pending_deletes(&self, id: &str) -> Result<Vec<String>>;

    /// Records ids whose server delete failed. Known ids are not duplicated.
    async fn add_pending_deletes(&self, id: &str, task_ids: &[String]) -> Result<()>;

    /// Drops ids the server no longer has.
    async fn resolve_pending_deletes(&self, id: &str, task_ids: &[String]) -> Result<()>;

    /// Removes everything this store holds.
    async fn clear(&self) -> Result<()>;

    async fn me_user_id(&self, id: &str) -> Result<Option<String>> {
        Ok(self.plan_secret(id).await?.map(|s| s.me_user_id))
    }

    async fn access_key(&self, id: &str) -> Result<Option<String>> {
        Ok(self.plan_secret(id).await?.map(|s| s.access_key))
    }
}
