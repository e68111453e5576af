//! Task operations for the Planner.

use futures::future::join_all;
use jiff::Timestamp;
use log::{debug, info, warn};

use super::{plan_ops::new_id, DeleteFailure, DeleteReport, EditReport, Planner};
use crate::{
    error::{PlannerError, Result},
    models::{requests::normalize_text, Record, Task, TaskEdit, TaskPatch},
    params::{normalize_title, CreateTask},
    tree::closure,
};

impl Planner {
    /// Creates a task under an existing plan or task.
    ///
    /// The task is pushed first, then the parent's child list. If the task
    /// push fails nothing changes locally. If only the parent push fails the
    /// task is still added locally and `PartialWrite` is returned; the next
    /// refresh re-links it.
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidTitle` - When the title is blank
    /// * `PlannerError::NotFound` - When the parent is not in an open plan
    /// * `PlannerError::MissingIdentity` - When no local user is set for the plan
    /// * `PlannerError::InvalidInput` - When the assignee is not a plan user
    /// * `PlannerError::PartialWrite` - When linking the parent failed
    pub async fn create_task(&self, params: &CreateTask) -> Result<Task> {
        let title = normalize_title(&params.title)?;
        let parent_id = params.parent_id.as_str();

        let plan_id = self
            .read(|state| state.locate(parent_id))
            .ok_or_else(|| PlannerError::task_not_found(parent_id))?;

        let me_user_id = self
            .inner
            .local
            .me_user_id(&plan_id)
            .await?
            .ok_or_else(|| PlannerError::MissingIdentity {
                plan_id: plan_id.clone(),
            })?;

        let assignee_id = normalize_text(params.assignee_id.as_deref());
        let mut subtask_ids = self.read(|state| -> Result<Vec<String>> {
            let open = state
                .plan(&plan_id)
                .ok_or_else(|| PlannerError::plan_not_found(&plan_id))?;
            if let Some(assignee_id) = &assignee_id {
                ensure_member(&open.tree, assignee_id)?;
            }
            open.tree
                .get(parent_id)
                .map(|parent| parent.subtask_ids.clone())
                .ok_or_else(|| PlannerError::task_not_found(parent_id))
        })?;

        let mut task = Task::new(new_id(), title, Timestamp::now());
        task.description = normalize_text(params.description.as_deref());
        task.author_id = Some(me_user_id);
        task.assignee_id = assignee_id;
        task.parent_id = Some(parent_id.to_string());

        let task: Task = self.inner.records.create(&Record::from(task)).await?.into();

        if !subtask_ids.contains(&task.id) {
            subtask_ids.push(task.id.clone());
        }
        let linked = self
            .inner
            .records
            .patch(parent_id, &TaskPatch::subtasks(subtask_ids))
            .await;

        let applied = self.update(|state| match state.plan_mut(&plan_id) {
            Some(open) => {
                open.revision += 1;
                open.tree.insert_child(task.clone()).is_ok()
            }
            None => false,
        });
        if !applied {
            debug!("Plan {plan_id} changed before task {} could be added", task.id);
        }

        match linked {
            Ok(_) => {
                info!("Created task {} under {parent_id}", task.id);
                Ok(task)
            }
            Err(e) => {
                warn!("Task {} created but parent {parent_id} was not updated: {e}", task.id);
                Err(PlannerError::PartialWrite {
                    task_id: task.id,
                    parent_id: parent_id.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Applies a partial edit to a task or plan.
    ///
    /// Only fields that differ from the current task are pushed; an edit
    /// that changes nothing makes no network call. On success the fields are
    /// shallow-merged into the local task.
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidTitle` - When the edit clears the title
    /// * `PlannerError::NotFound` - When the task is not in an open plan
    /// * `PlannerError::InvalidInput` - When the assignee is not a plan user
    pub async fn edit_task(&self, task_id: &str, edit: &TaskEdit) -> Result<EditReport> {
        edit.validate()?;

        let (plan_id, current) = self
            .read(|state| -> Result<(String, Task)> {
                let plan_id = state
                    .locate(task_id)
                    .ok_or_else(|| PlannerError::task_not_found(task_id))?;
                let tree = &state
                    .plan(&plan_id)
                    .ok_or_else(|| PlannerError::task_not_found(task_id))?
                    .tree;
                if let Some(Some(assignee_id)) = &edit.assignee_id {
                    ensure_member(tree, assignee_id.trim())?;
                }
                let task = tree
                    .get(task_id)
                    .cloned()
                    .ok_or_else(|| PlannerError::task_not_found(task_id))?;
                Ok((plan_id, task))
            })?;

        let patch = edit.diff(&current);
        if patch.is_empty() {
            debug!("Edit of {task_id} changes nothing");
            return Ok(EditReport {
                task: current,
                patch,
            });
        }

        let echoed = self.inner.records.patch(task_id, &patch).await?;
        let updated_at = echoed.task.updated_at.or_else(|| Some(Timestamp::now()));

        let task = self
            .update(|state| {
                let open = state.plan_mut(&plan_id)?;
                open.revision += 1;
                let task = open.tree.get_mut(task_id)?;
                patch.apply_to(task);
                task.updated_at = updated_at;
                Some(task.clone())
            })
            .unwrap_or_else(|| {
                let mut task = current;
                patch.apply_to(&mut task);
                task.updated_at = updated_at;
                task
            });

        info!("Updated task {task_id}");
        Ok(EditReport { task, patch })
    }

    /// Deletes a task and everything below it.
    ///
    /// Deleting a plan root delegates to [`Planner::delete_plan`]. Every id
    /// of the closure is deleted in parallel and failures only produce
    /// warnings. The parent is then unlinked best-effort and the closure is
    /// removed locally regardless of what the server confirmed.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the task is not in an open plan
    pub async fn delete_task(&self, task_id: &str) -> Result<DeleteReport> {
        let found = self.read(|state| {
            let plan_id = state.locate(task_id)?;
            let tree = &state.plan(&plan_id)?.tree;
            let task = tree.get(task_id)?;
            Some((
                plan_id,
                task.parent_id.clone(),
                task.title.clone(),
                closure(task_id, tree),
            ))
        });
        let Some((plan_id, parent_id, title, ids)) = found else {
            return Err(PlannerError::task_not_found(task_id));
        };
        let Some(parent_id) = parent_id else {
            return self.delete_plan(task_id).await;
        };

        let failures = self.delete_records(&ids).await;
        self.remember_pending_deletes(&plan_id, &failures).await;

        let remaining = self.read(|state| {
            state
                .plan(&plan_id)
                .and_then(|open| open.tree.get(&parent_id))
                .map(|parent| {
                    parent
                        .subtask_ids
                        .iter()
                        .filter(|id| id.as_str() != task_id)
                        .cloned()
                        .collect::<Vec<_>>()
                })
        });
        let parent_unlinked = match remaining {
            Some(subtask_ids) => match self
                .inner
                .records
                .patch(&parent_id, &TaskPatch::subtasks(subtask_ids))
                .await
            {
                Ok(_) => true,
                Err(e) => {
                    warn!("Failed to unlink {task_id} from parent {parent_id}: {e}");
                    false
                }
            },
            None => false,
        };

        self.update(|state| {
            if let Some(open) = state.plan_mut(&plan_id) {
                open.revision += 1;
                open.tree.remove_all(&ids);
            }
        });
        info!("Deleted task {task_id} ({} records)", ids.len());

        Ok(DeleteReport {
            target_id: task_id.to_string(),
            title: Some(title),
            removed: ids,
            failures,
            parent_unlinked: Some(parent_unlinked),
            plan_removed: false,
        })
    }

    /// Keeps ids whose server delete failed out of later refreshes.
    async fn remember_pending_deletes(&self, plan_id: &str, failures: &[DeleteFailure]) {
        let ids: Vec<String> = failures
            .iter()
            .filter(|f| !f.error.is_not_found())
            .map(|f| f.id.clone())
            .collect();
        if let Err(e) = self.inner.local.add_pending_deletes(plan_id, &ids).await {
            warn!("Failed to record pending deletes of plan {plan_id}: {e}");
        }
    }

    /// Deletes every id in parallel, collecting the failures.
    pub(crate) async fn delete_records(&self, ids: &[String]) -> Vec<DeleteFailure> {
        let records = &self.inner.records;
        let results = join_all(
            ids.iter()
                .map(|id| async move { (id, records.delete(id).await) }),
        )
        .await;

        results
            .into_iter()
            .filter_map(|(id, result)| {
                result.err().map(|error| {
                    warn!("Failed to delete {id}: {error}");
                    DeleteFailure {
                        id: id.clone(),
                        error,
                    }
                })
            })
            .collect()
    }
}

fn ensure_member(tree: &crate::tree::PlanTree, user_id: &str) -> Result<()> {
    if tree.user(user_id).is_none() {
        return Err(PlannerError::invalid_input("assignee_id")
            .with_reason(format!("User {user_id} is not a member of this plan")));
    }
    Ok(())
}
