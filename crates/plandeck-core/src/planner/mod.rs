//! High-level planner API for open plans and their task trees.
//!
//! The [`Planner`] is the single source of truth for every open plan. Each
//! mutation calls the record store first, then patches the local tree so
//! that parent pointers and child lists stay consistent. Refreshes reconcile
//! the local trees with the server.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Handlers     │    │   Operations    │    │     Stores      │
//! │  (handlers)     │───▶│ (plan_ops,      │───▶│ RecordStore +   │
//! │                 │    │  task_ops, ...) │    │ LocalStore      │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!   Display wrappers       Tree + sync logic      Remote / durable
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Planner`] instances with configuration
//! - [`plan_ops`]: Plan lifecycle (create, load, open, join, delete, push)
//! - [`task_ops`]: Task create, edit and cascading delete
//! - [`user_ops`]: Plan user dictionary and local identity
//! - [`refresh`]: Throttled, single-flight refresh and merge
//! - [`handlers`]: Operations returning display wrappers for interfaces
//!
//! ## Concurrency
//!
//! State sits behind a mutex that is only held for synchronous critical
//! sections, never across an `.await`. Operations re-check that their plan
//! is still open whenever they re-acquire it, so results for a closed plan
//! are dropped. Creates, edits and deletes on one plan are not ordered
//! against each other; a refresh that overlaps a local mutation discards its
//! fetch instead of overwriting the mutation.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use plandeck_core::{params::{CreatePlan, CreateTask}, store::MemoryRecordStore, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let planner = PlannerBuilder::new()
//!     .with_database_path(dir.path().join("plandeck.db"))
//!     .with_record_store(Arc::new(MemoryRecordStore::new()))
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan {
//!         title: "Trip".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! planner.flush().await;
//!
//! planner
//!     .create_task(&CreateTask {
//!         parent_id: plan.id.clone(),
//!         title: "Book flight".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! planner.flush().await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use jiff::Timestamp;
use tokio::{sync::watch, task::JoinSet};

use crate::{
    store::{LocalStore, RecordStore},
    tree::PlanTree,
};

pub mod builder;
pub mod handlers;
pub mod outcomes;
pub mod plan_ops;
pub mod refresh;
pub mod snapshot;
pub mod task_ops;
pub mod user_ops;

#[cfg(test)]
mod tests;

pub use builder::PlannerBuilder;
pub use outcomes::{DeleteFailure, DeleteReport, EditReport, LoadReport, RefreshOutcome};
pub use snapshot::{PlanSnapshot, Snapshot};

/// Default minimum time between two refreshes of a plan.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of records requested when loading plans.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Tunables of a planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub refresh_interval: Duration,
    pub list_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Main planner interface for open plans.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct Planner {
    pub(crate) inner: Arc<Shared>,
}

pub(crate) struct Shared {
    pub(crate) records: Arc<dyn RecordStore>,
    pub(crate) local: Arc<dyn LocalStore>,
    pub(crate) config: PlannerConfig,
    state: Mutex<PlannerState>,
    pub(crate) snapshots: watch::Sender<Snapshot>,
    pushes: Mutex<JoinSet<()>>,
}

/// One open plan and its refresh bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct OpenPlan {
    pub(crate) tree: PlanTree,
    pub(crate) last_update: Option<Timestamp>,
    pub(crate) refreshing: bool,
    pub(crate) offline: bool,
    /// Bumped by every local mutation
    pub(crate) revision: u64,
}

impl OpenPlan {
    pub(crate) fn new(tree: PlanTree, last_update: Option<Timestamp>) -> Self {
        Self {
            tree,
            last_update,
            refreshing: false,
            offline: false,
            revision: 0,
        }
    }

    fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            tree: self.tree.clone(),
            last_update: self.last_update,
            is_refreshing: self.refreshing,
            offline: self.offline,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PlannerState {
    order: Vec<String>,
    plans: HashMap<String, OpenPlan>,
}

impl PlannerState {
    /// Opens or replaces a plan, keeping its position if it was open.
    pub(crate) fn insert(&mut self, plan: OpenPlan) {
        let id = plan.tree.id().to_string();
        if !self.plans.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.plans.insert(id, plan);
    }

    pub(crate) fn remove(&mut self, plan_id: &str) -> Option<OpenPlan> {
        self.order.retain(|id| id != plan_id);
        self.plans.remove(plan_id)
    }

    pub(crate) fn plan(&self, plan_id: &str) -> Option<&OpenPlan> {
        self.plans.get(plan_id)
    }

    pub(crate) fn plan_mut(&mut self, plan_id: &str) -> Option<&mut OpenPlan> {
        self.plans.get_mut(plan_id)
    }

    pub(crate) fn is_open(&self, plan_id: &str) -> bool {
        self.plans.contains_key(plan_id)
    }

    pub(crate) fn plan_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Id of the open plan containing `task_id`.
    pub(crate) fn locate(&self, task_id: &str) -> Option<String> {
        self.order
            .iter()
            .find(|id| {
                self.plans
                    .get(id.as_str())
                    .is_some_and(|p| p.tree.contains(task_id))
            })
            .cloned()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            plans: self
                .order
                .iter()
                .filter_map(|id| self.plans.get(id))
                .map(OpenPlan::snapshot)
                .collect(),
        }
    }
}

impl Planner {
    pub(crate) fn new(
        records: Arc<dyn RecordStore>,
        local: Arc<dyn LocalStore>,
        config: PlannerConfig,
    ) -> Self {
        let (snapshots, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(Shared {
                records,
                local,
                config,
                state: Mutex::new(PlannerState::default()),
                snapshots,
                pushes: Mutex::new(JoinSet::new()),
            }),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.inner.config
    }

    fn lock_state(&self) -> MutexGuard<'_, PlannerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the state without publishing.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&PlannerState) -> T) -> T {
        f(&self.lock_state())
    }

    /// Mutates the state and publishes a new snapshot.
    pub(crate) fn update<T>(&self, f: impl FnOnce(&mut PlannerState) -> T) -> T {
        let mut state = self.lock_state();
        let result = f(&mut state);
        let snapshot = state.snapshot();
        drop(state);
        self.inner.snapshots.send_replace(snapshot);
        result
    }

    /// Ids of the open plans in display order.
    pub fn open_plan_ids(&self) -> Vec<String> {
        self.read(PlannerState::plan_ids)
    }

    pub fn is_open(&self, plan_id: &str) -> bool {
        self.read(|state| state.is_open(plan_id))
    }

    /// Copy of a task from whichever open plan contains it.
    pub fn task(&self, task_id: &str) -> Option<crate::models::Task> {
        self.read(|state| {
            let plan_id = state.locate(task_id)?;
            state.plan(&plan_id)?.tree.get(task_id).cloned()
        })
    }

    /// Runs `f` as a tracked background job that [`Planner::flush`] awaits.
    pub(crate) fn spawn_background<F>(&self, job: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.inner
            .pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .spawn(job);
    }

    /// Waits until every background push has finished.
    pub async fn flush(&self) {
        loop {
            let mut jobs = std::mem::take(
                &mut *self
                    .inner
                    .pushes
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if jobs.is_empty() {
                break;
            }
            while let Some(result) = jobs.join_next().await {
                if let Err(e) = result {
                    log::warn!("Background push task failed: {e}");
                }
            }
        }
    }
}
