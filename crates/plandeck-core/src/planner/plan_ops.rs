//! Plan lifecycle operations for the Planner.

use std::collections::HashMap;

use jiff::Timestamp;
use log::{debug, info, warn};
use uuid::Uuid;

use super::{LoadReport, OpenPlan, PlanSnapshot, Planner};
use crate::{
    error::{PlannerError, Result},
    models::{requests::normalize_text, Plan, Record, Task, TaskEdit, User, Users},
    params::{normalize_title, CreatePlan, JoinPlan},
    tree::{closure, group_into_plans, PlanGroup, PlanTree},
};

/// Fresh client-side identifier.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Planner {
    /// Creates a plan owned by a new plan user built from the creator profile.
    ///
    /// The plan is registered in the local store before any network call and
    /// is usable at once. The push to the record store runs in the
    /// background; if it fails the plan is flagged offline and kept.
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidTitle` - When the title is blank
    /// * `PlannerError::InvalidInput` - When the creator profile is invalid
    /// * `PlannerError::LocalStore` - When the plan cannot be registered
    pub async fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        let title = normalize_title(&params.title)?;
        let creator = match &params.creator {
            Some(user) => user.normalized()?,
            None => self.inner.local.default_user().await?,
        };

        let plan_id = new_id();
        let user_id = new_id();
        let access_key = new_id();

        let mut task = Task::new(plan_id.clone(), title, Timestamp::now());
        task.description = normalize_text(params.description.as_deref());
        task.author_id = Some(user_id.clone());

        let plan = Plan {
            task,
            users: Users::from([(user_id.clone(), creator)]),
            access_key: Some(access_key.clone()),
        };

        self.inner
            .local
            .add_plan(&plan_id, &access_key, Some(&user_id))
            .await?;

        self.update(|state| {
            state.insert(OpenPlan::new(
                PlanTree::new(plan.clone()),
                Some(Timestamp::now()),
            ))
        });
        info!("Created plan {plan_id} '{}'", plan.title);

        let planner = self.clone();
        let id = plan_id.clone();
        self.spawn_background(async move {
            if let Err(e) = planner.push_plan(&id).await {
                debug!("Plan {id} created offline: {e}");
            }
        });

        Ok(plan)
    }

    /// Pushes the whole plan record and updates its offline flag.
    pub(crate) async fn push_plan(&self, plan_id: &str) -> Result<()> {
        let plan = self
            .read(|state| state.plan(plan_id).map(|p| p.tree.plan()))
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;

        let result = self.inner.records.create(&Record::from(plan)).await;
        let offline = result.is_err();
        self.update(|state| {
            if let Some(open) = state.plan_mut(plan_id) {
                open.offline = offline;
            }
        });

        match result {
            Ok(_) => {
                debug!("Pushed plan {plan_id}");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to push plan {plan_id}, keeping it offline: {e}");
                Err(e)
            }
        }
    }

    /// Re-pushes every open plan flagged offline. Returns how many pushes
    /// succeeded.
    pub async fn retry_offline_pushes(&self) -> usize {
        let offline: Vec<String> = self.read(|state| {
            state
                .plan_ids()
                .into_iter()
                .filter(|id| state.plan(id).is_some_and(|p| p.offline))
                .collect()
        });

        let mut pushed = 0;
        for plan_id in offline {
            if self.push_plan(&plan_id).await.is_ok() {
                pushed += 1;
            }
        }
        pushed
    }

    /// Edits the plan's own fields. See [`Planner::edit_task`].
    pub async fn edit_plan(&self, plan_id: &str, edit: &TaskEdit) -> Result<super::EditReport> {
        if !self.is_open(plan_id) {
            return Err(PlannerError::plan_not_found(plan_id));
        }
        self.edit_task(plan_id, edit).await
    }

    /// Deletes a plan and every task below it.
    ///
    /// A plan that is registered locally but not open (for instance because
    /// the server never received it) is still deleted by id and unregistered.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is neither open nor registered
    pub async fn delete_plan(&self, plan_id: &str) -> Result<super::DeleteReport> {
        let open = self.read(|state| {
            state
                .plan(plan_id)
                .map(|p| (closure(plan_id, &p.tree), p.tree.root().title.clone()))
        });

        let (ids, title) = match open {
            Some((ids, title)) => (ids, Some(title)),
            None => {
                let known = self.inner.local.plan_ids().await?;
                if !known.iter().any(|id| id == plan_id) {
                    return Err(PlannerError::plan_not_found(plan_id));
                }
                (vec![plan_id.to_string()], None)
            }
        };

        let failures = self.delete_records(&ids).await;

        self.update(|state| state.remove(plan_id));
        self.inner.local.remove_plan(plan_id).await?;
        info!("Deleted plan {plan_id} ({} records)", ids.len());

        Ok(super::DeleteReport {
            target_id: plan_id.to_string(),
            title,
            removed: ids,
            failures,
            parent_unlinked: None,
            plan_removed: true,
        })
    }

    /// Opens every locally known plan that is not open yet.
    ///
    /// Plans are taken from one `list` call and grouped; known plans missing
    /// from it are fetched one by one. A failing `list` is absorbed and
    /// reported as offline.
    pub async fn load_plans(&self) -> Result<LoadReport> {
        let pending: Vec<String> = self
            .inner
            .local
            .plan_ids()
            .await?
            .into_iter()
            .filter(|id| !self.is_open(id))
            .collect();

        let mut report = LoadReport::default();
        if pending.is_empty() {
            return Ok(report);
        }

        let records = match self.inner.records.list(self.inner.config.list_limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to list plans: {e}");
                report.offline = true;
                report.unavailable = pending;
                return Ok(report);
            }
        };

        let mut groups: HashMap<String, PlanGroup> = group_into_plans(&records)
            .into_iter()
            .map(|group| (group.id().to_string(), group))
            .collect();

        for plan_id in pending {
            let group = match groups.remove(&plan_id) {
                Some(group) => Some(group),
                None => self.fetch_group(&plan_id).await,
            };

            match group {
                Some(group) => {
                    self.open_group(group).await?;
                    report.opened.push(plan_id);
                }
                None => {
                    warn!("Plan {plan_id} is not available from the server");
                    report.unavailable.push(plan_id);
                }
            }
        }

        info!(
            "Loaded {} plans, {} unavailable",
            report.opened.len(),
            report.unavailable.len()
        );
        Ok(report)
    }

    /// Opens one locally known plan from the server.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is not registered locally
    ///   or the server has no record of it
    /// * `PlannerError::NetworkUnavailable` / `ServerRejected` - When the fetch fails
    pub async fn open_plan(&self, plan_id: &str) -> Result<PlanSnapshot> {
        if let Some(snapshot) = self.plan_snapshot(plan_id) {
            return Ok(snapshot);
        }

        let known = self.inner.local.plan_ids().await?;
        if !known.iter().any(|id| id == plan_id) {
            return Err(PlannerError::plan_not_found(plan_id));
        }

        let records = self.inner.records.fetch_subtree(plan_id).await?;
        let group = group_into_plans(&records)
            .into_iter()
            .find(|group| group.id() == plan_id)
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;

        self.open_group(group).await?;
        self.plan_snapshot(plan_id)
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))
    }

    /// Drops a plan's in-memory tree. Returns whether it was open.
    pub fn close_plan(&self, plan_id: &str) -> bool {
        let closed = self.update(|state| state.remove(plan_id)).is_some();
        if closed {
            debug!("Closed plan {plan_id}");
        }
        closed
    }

    /// Registers a plan shared by someone else and opens it.
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidInput` - When the id or key is blank, or the
    ///   chosen identity is not a user of the plan
    /// * `PlannerError::NotFound` - When the server has no such plan
    pub async fn join_plan(&self, params: &JoinPlan) -> Result<PlanSnapshot> {
        let plan_id = params.plan_id.trim();
        let access_key = params.access_key.trim();
        if plan_id.is_empty() {
            return Err(PlannerError::invalid_input("plan_id").with_reason("Plan ID is required"));
        }
        if access_key.is_empty() {
            return Err(
                PlannerError::invalid_input("access_key").with_reason("Access key is required")
            );
        }
        let me_user_id = normalize_text(params.me_user_id.as_deref());

        self.inner
            .local
            .add_plan(plan_id, access_key, me_user_id.as_deref())
            .await?;

        let snapshot = match self.open_plan(plan_id).await {
            Ok(snapshot) => snapshot,
            Err(e @ PlannerError::NotFound { .. }) => {
                self.inner.local.remove_plan(plan_id).await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if let Some(user_id) = &me_user_id {
            if snapshot.tree.user(user_id).is_none() {
                self.close_plan(plan_id);
                self.inner.local.remove_plan(plan_id).await?;
                return Err(PlannerError::invalid_input("me_user_id")
                    .with_reason(format!("User {user_id} is not a member of plan {plan_id}")));
            }
        }

        info!("Joined plan {plan_id}");
        Ok(snapshot)
    }

    /// Profile used as creator of new plans.
    pub async fn default_user(&self) -> Result<User> {
        self.inner.local.default_user().await
    }

    pub async fn set_default_user(&self, user: &User) -> Result<User> {
        let user = user.normalized()?;
        self.inner.local.set_default_user(&user).await?;
        Ok(user)
    }

    async fn fetch_group(&self, plan_id: &str) -> Option<PlanGroup> {
        match self.inner.records.fetch_subtree(plan_id).await {
            Ok(records) => group_into_plans(&records)
                .into_iter()
                .find(|group| group.id() == plan_id),
            Err(e) => {
                warn!("Failed to fetch plan {plan_id}: {e}");
                None
            }
        }
    }

    /// Opens a fetched plan with its locally held access key, unless it was
    /// opened meanwhile.
    async fn open_group(&self, group: PlanGroup) -> Result<()> {
        let plan_id = group.id().to_string();
        let access_key = self.inner.local.access_key(&plan_id).await?;
        let pending = self.inner.local.pending_deletes(&plan_id).await?;

        let mut tree = PlanTree::from_group(group);
        tree.set_access_key(access_key);
        tree.remove_all(&pending);

        self.update(|state| {
            if !state.is_open(&plan_id) {
                state.insert(OpenPlan::new(tree, Some(Timestamp::now())));
            }
        });
        info!("Opened plan {plan_id}");
        Ok(())
    }
}
