//! Throttled, single-flight refresh of open plans.
//!
//! Per plan the refresh state is `Idle → Refreshing → Idle`. A trigger only
//! starts a fetch when the plan is not already refreshing and its last
//! update is older than the refresh interval; otherwise it is a no-op.
//! [`Planner::refresh_now`] skips the interval but still never runs two
//! fetches of one plan at once.
//!
//! Ids deleted locally whose server delete failed are kept out of every
//! merge and their delete is retried until the server no longer has them.

use futures::future::join_all;
use jiff::{SignedDuration, Timestamp};
use log::{debug, warn};

use super::{Planner, RefreshOutcome};
use crate::{
    error::{PlannerError, Result},
    models::{Record, TaskPatch},
};

/// Clears the plan's in-flight flag when dropped, so the flag is released
/// on every exit path, including a dropped future.
struct RefreshGuard {
    planner: Planner,
    plan_id: String,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        let plan_id = &self.plan_id;
        self.planner.update(|state| {
            if let Some(open) = state.plan_mut(plan_id) {
                open.refreshing = false;
            }
        });
    }
}

enum Gate {
    Open { revision: u64 },
    Skip(RefreshOutcome),
}

/// Work left after the merge, done once the guard is released.
#[derive(Default)]
struct FollowUp {
    repairs: Vec<(String, Vec<String>)>,
    repush: bool,
    /// Pending deletes the server still returned
    redelete: Vec<String>,
    /// Pending deletes the server no longer has
    gone: Vec<String>,
}

impl Planner {
    /// Refreshes one open plan from the server if it is due.
    ///
    /// Fetch failures are absorbed into the outcome; the cached tree stays
    /// as it was.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is not open
    pub async fn refresh(&self, plan_id: &str) -> Result<RefreshOutcome> {
        self.refresh_with(plan_id, false).await
    }

    /// Refreshes one open plan regardless of when it was last updated.
    ///
    /// A refresh already in flight for the plan still makes this a no-op.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is not open
    pub async fn refresh_now(&self, plan_id: &str) -> Result<RefreshOutcome> {
        self.refresh_with(plan_id, true).await
    }

    async fn refresh_with(&self, plan_id: &str, force: bool) -> Result<RefreshOutcome> {
        let interval = SignedDuration::try_from(self.inner.config.refresh_interval)
            .unwrap_or(SignedDuration::MAX);

        let gate = self.update(|state| -> Result<Gate> {
            let open = state
                .plan_mut(plan_id)
                .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;
            if open.refreshing {
                return Ok(Gate::Skip(RefreshOutcome::InFlight));
            }
            let due = force
                || open
                    .last_update
                    .map_or(true, |last| Timestamp::now().duration_since(last) >= interval);
            if !due {
                return Ok(Gate::Skip(RefreshOutcome::Throttled));
            }
            open.refreshing = true;
            Ok(Gate::Open {
                revision: open.revision,
            })
        })?;

        let revision = match gate {
            Gate::Open { revision } => revision,
            Gate::Skip(outcome) => {
                debug!("Refresh of plan {plan_id} skipped: {outcome:?}");
                return Ok(outcome);
            }
        };

        let guard = RefreshGuard {
            planner: self.clone(),
            plan_id: plan_id.to_string(),
        };
        debug!("Refreshing plan {plan_id}");

        let fetched = self.inner.records.fetch_subtree(plan_id).await;
        let access_key = match self.inner.local.access_key(plan_id).await {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("Failed to read access key of plan {plan_id}: {e}");
                None
            }
        };
        let pending = match self.inner.local.pending_deletes(plan_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to read pending deletes of plan {plan_id}: {e}");
                Vec::new()
            }
        };

        let (outcome, follow_up) = self.update(|state| {
            let Some(open) = state.plan_mut(plan_id) else {
                return (RefreshOutcome::Closed, FollowUp::default());
            };

            let records = match fetched {
                Ok(records) => records,
                Err(error) => {
                    warn!("Refresh of plan {plan_id} failed: {error}");
                    open.last_update = Some(Timestamp::now());
                    let outcome = if open.tree.tasks().is_empty() {
                        RefreshOutcome::Unavailable { error }
                    } else {
                        RefreshOutcome::Stale { error }
                    };
                    return (outcome, FollowUp::default());
                }
            };

            let (mut roots, others): (Vec<Record>, Vec<Record>) =
                records.into_iter().partition(|r| r.id() == plan_id);
            let Some(root) = roots.pop() else {
                debug!("Plan {plan_id} missing from the server, keeping cached tree");
                open.last_update = Some(Timestamp::now());
                let follow_up = FollowUp {
                    repush: open.offline,
                    ..Default::default()
                };
                return (RefreshOutcome::PlanMissing, follow_up);
            };

            if open.revision != revision {
                debug!("Plan {plan_id} changed during refresh, dropping fetched data");
                return (RefreshOutcome::Superseded, FollowUp::default());
            }

            let (redelete, gone): (Vec<String>, Vec<String>) = pending
                .into_iter()
                .partition(|id| others.iter().any(|r| r.id() == id.as_str()));
            let descendants: Vec<Record> = others
                .into_iter()
                .filter(|r| !redelete.iter().any(|id| id.as_str() == r.id()))
                .collect();

            let access_key =
                access_key.unwrap_or_else(|| open.tree.access_key().map(String::from));
            open.tree.merge_fetched(root, descendants, access_key);
            let repaired = open.tree.repair_linkage();
            open.last_update = Some(Timestamp::now());
            open.offline = false;

            let repairs: Vec<(String, Vec<String>)> = repaired
                .iter()
                .filter_map(|id| {
                    open.tree
                        .get(id)
                        .map(|task| (id.clone(), task.subtask_ids.clone()))
                })
                .collect();
            debug!(
                "Merged plan {plan_id}: {} tasks, {} parents repaired",
                open.tree.tasks().len(),
                repairs.len()
            );

            (
                RefreshOutcome::Refreshed {
                    tasks: open.tree.tasks().len(),
                    repaired: repairs.len(),
                },
                FollowUp {
                    repairs,
                    repush: false,
                    redelete,
                    gone,
                },
            )
        });
        drop(guard);

        for (task_id, subtask_ids) in follow_up.repairs {
            if let Err(e) = self
                .inner
                .records
                .patch(&task_id, &TaskPatch::subtasks(subtask_ids))
                .await
            {
                warn!("Failed to push repaired subtasks of {task_id}: {e}");
            }
        }
        if follow_up.repush {
            if let Err(e) = self.push_plan(plan_id).await {
                debug!("Plan {plan_id} stays offline: {e}");
            }
        }
        self.retry_pending_deletes(plan_id, follow_up.redelete, follow_up.gone)
            .await;

        Ok(outcome)
    }

    /// Re-sends the deletes the server has not applied and forgets the
    /// ones it has.
    async fn retry_pending_deletes(
        &self,
        plan_id: &str,
        redelete: Vec<String>,
        mut gone: Vec<String>,
    ) {
        if !redelete.is_empty() {
            let failures = self.delete_records(&redelete).await;
            gone.extend(
                redelete
                    .into_iter()
                    .filter(|id| {
                        !failures
                            .iter()
                            .any(|f| &f.id == id && !f.error.is_not_found())
                    }),
            );
        }
        if let Err(e) = self.inner.local.resolve_pending_deletes(plan_id, &gone).await {
            warn!("Failed to resolve pending deletes of plan {plan_id}: {e}");
        }
    }

    /// Refreshes every open plan that is due.
    pub async fn refresh_all(&self) -> Vec<(String, Result<RefreshOutcome>)> {
        let plan_ids = self.open_plan_ids();
        let outcomes = join_all(plan_ids.iter().map(|id| self.refresh(id))).await;
        plan_ids.into_iter().zip(outcomes).collect()
    }

    /// Refreshes every open plan regardless of when it was last updated.
    pub async fn refresh_all_now(&self) -> Vec<(String, Result<RefreshOutcome>)> {
        let plan_ids = self.open_plan_ids();
        let outcomes = join_all(plan_ids.iter().map(|id| self.refresh_now(id))).await;
        plan_ids.into_iter().zip(outcomes).collect()
    }
}
