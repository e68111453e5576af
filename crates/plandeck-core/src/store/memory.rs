//! In-process record store.
//!
//! Behaves like the REST server: creates upsert, unknown ids answer 404 and
//! deletes do not cascade. Callers can inject failures and latency per
//! operation and read call counts. Used by the planner tests and for
//! running the planner without a server.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;

use super::RecordStore;
use crate::{
    error::{PlannerError, Result},
    models::{Record, TaskPatch},
};

/// Record store operations, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Patch,
    Delete,
    FetchSubtree,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Record>,
    offline: bool,
    failing: HashMap<Operation, bool>,
    failing_ids: HashMap<(Operation, String), bool>,
    failing_once: HashMap<Operation, usize>,
    latency: HashMap<Operation, Duration>,
    calls: HashMap<Operation, usize>,
}

impl Inner {
    fn injected_failure(&mut self, op: Operation, id: Option<&str>) -> Result<()> {
        if self.offline {
            return Err(PlannerError::NetworkUnavailable {
                message: "record store is offline".to_string(),
            });
        }

        let for_id = id.is_some_and(|id| self.failing_ids.contains_key(&(op, id.to_string())));
        let once = match self.failing_once.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };

        if for_id || once || self.failing.get(&op).copied().unwrap_or(false) {
            return Err(PlannerError::ServerRejected {
                status: 500,
                body: format!("Injected {op:?} failure"),
            });
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}

fn not_found() -> PlannerError {
    PlannerError::ServerRejected {
        status: 404,
        body: "Not found".to_string(),
    }
}

/// Thread-safe in-memory [`RecordStore`].
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `records`, in order.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let store = Self::new();
        store.lock().records.extend(records);
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces a record without counting a call.
    pub fn insert(&self, record: Record) {
        let mut inner = self.lock();
        match inner.position(record.id()) {
            Some(pos) => inner.records[pos] = record,
            None => inner.records.push(record),
        }
    }

    /// Removes a record without counting a call.
    pub fn remove(&self, id: &str) -> Option<Record> {
        let mut inner = self.lock();
        let pos = inner.position(id)?;
        Some(inner.records.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        let inner = self.lock();
        inner.position(id).map(|pos| inner.records[pos].clone())
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Makes every operation fail as `NetworkUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Makes every call of `op` fail with status 500.
    pub fn fail(&self, op: Operation) {
        self.lock().failing.insert(op, true);
    }

    /// Makes calls of `op` on `id` fail with status 500.
    pub fn fail_for(&self, op: Operation, id: &str) {
        self.lock().failing_ids.insert((op, id.to_string()), true);
    }

    /// Makes the next call of `op` fail with status 500.
    pub fn fail_once(&self, op: Operation) {
        *self.lock().failing_once.entry(op).or_default() += 1;
    }

    /// Delays every call of `op` before it is answered.
    pub fn set_latency(&self, op: Operation, latency: Duration) {
        self.lock().latency.insert(op, latency);
    }

    /// Removes injected failures, latency and the offline switch.
    pub fn clear_failures(&self) {
        let mut inner = self.lock();
        inner.offline = false;
        inner.failing.clear();
        inner.failing_ids.clear();
        inner.failing_once.clear();
        inner.latency.clear();
    }

    /// Number of calls of `op`, failed ones included.
    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    async fn enter(&self, op: Operation, id: Option<&str>) -> Result<()> {
        let latency = {
            let mut inner = self.lock();
            *inner.calls.entry(op).or_default() += 1;
            inner.latency.get(&op).copied()
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.lock().injected_failure(op, id)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self, limit: usize) -> Result<Vec<Record>> {
        self.enter(Operation::List, None).await?;
        Ok(self.lock().records.iter().take(limit).cloned().collect())
    }

    async fn create(&self, record: &Record) -> Result<Record> {
        self.enter(Operation::Create, Some(record.id())).await?;
        let mut inner = self.lock();
        match inner.position(record.id()) {
            Some(pos) => inner.records[pos] = record.clone(),
            None => inner.records.push(record.clone()),
        }
        Ok(record.clone())
    }

    async fn patch(&self, id: &str, patch: &TaskPatch) -> Result<Record> {
        self.enter(Operation::Patch, Some(id)).await?;
        let mut inner = self.lock();
        let pos = inner.position(id).ok_or_else(not_found)?;
        let record = &mut inner.records[pos];

        patch.apply_to(&mut record.task);
        if let Some(users) = &patch.users {
            record.users = Some(users.clone());
        }
        record.task.updated_at = Some(Timestamp::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter(Operation::Delete, Some(id)).await?;
        let mut inner = self.lock();
        let pos = inner.position(id).ok_or_else(not_found)?;
        inner.records.remove(pos);
        Ok(())
    }

    async fn fetch_subtree(&self, root_id: &str) -> Result<Vec<Record>> {
        self.enter(Operation::FetchSubtree, Some(root_id)).await?;
        let inner = self.lock();

        let mut members = vec![root_id.to_string()];
        let mut grew = true;
        while grew {
            grew = false;
            for record in &inner.records {
                let linked = record
                    .task
                    .parent_id
                    .as_ref()
                    .is_some_and(|p| members.contains(p));
                if linked && !members.iter().any(|m| m == record.id()) {
                    members.push(record.id().to_string());
                    grew = true;
                }
            }
        }

        Ok(inner
            .records
            .iter()
            .filter(|r| members.iter().any(|m| m == r.id()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn record(id: &str, parent: Option<&str>) -> Record {
        let mut task = Task::new(id, id, Timestamp::UNIX_EPOCH);
        task.parent_id = parent.map(String::from);
        Record::from(task)
    }

    #[tokio::test]
    async fn test_fetch_subtree_follows_parent_links() {
        let store = MemoryRecordStore::with_records([
            record("a1", Some("a")),
            record("p", None),
            record("a", Some("p")),
            record("q", None),
            record("q1", Some("q")),
        ]);

        let ids: Vec<String> = store
            .fetch_subtree("p")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a1", "p", "a"]);
        assert_eq!(store.calls(Operation::FetchSubtree), 1);
    }

    #[tokio::test]
    async fn test_patch_and_delete_unknown_id_is_404() {
        let store = MemoryRecordStore::new();

        let err = store.patch("nope", &TaskPatch::default()).await.unwrap_err();
        assert!(matches!(err, PlannerError::ServerRejected { status: 404, .. }));
        let err = store.delete("nope").await.unwrap_err();
        assert!(matches!(err, PlannerError::ServerRejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_patch_applies_fields() {
        let store = MemoryRecordStore::with_records([record("p", None)]);
        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            ..TaskPatch::subtasks(vec!["x".to_string()])
        };

        let echoed = store.patch("p", &patch).await.unwrap();
        assert_eq!(echoed.task.title, "Renamed");
        assert_eq!(echoed.task.subtask_ids, vec!["x"]);
        assert!(echoed.task.updated_at.is_some());
        assert_eq!(store.get("p").unwrap(), echoed);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryRecordStore::with_records([record("p", None), record("a", Some("p"))]);

        store.fail_once(Operation::List);
        assert!(store.list(10).await.is_err());
        assert_eq!(store.list(10).await.unwrap().len(), 2);

        store.fail_for(Operation::Delete, "a");
        assert!(store.delete("a").await.is_err());
        assert!(store.delete("p").await.is_ok());

        store.set_offline(true);
        let err = store.list(10).await.unwrap_err();
        assert!(matches!(err, PlannerError::NetworkUnavailable { .. }));

        store.clear_failures();
        assert!(store.delete("a").await.is_ok());
        assert!(store.is_empty());
        assert_eq!(store.calls(Operation::Delete), 3);
    }

    #[tokio::test]
    async fn test_create_upserts() {
        let store = MemoryRecordStore::new();
        store.create(&record("a", None)).await.unwrap();

        let mut renamed = record("a", None);
        renamed.task.title = "Renamed".to_string();
        store.create(&renamed).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().task.title, "Renamed");
        assert_eq!(store.calls(Operation::Create), 2);
    }
}
