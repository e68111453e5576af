//! Planner operations that return display wrappers for interfaces.

use super::{Planner, RefreshOutcome};
use crate::{
    display::{CreateResult, DeleteResult, PlanSummaries, TaskTree, UpdateResult, UserList},
    error::{PlannerError, Result},
    models::{Plan, Task},
    params::{CreatePlan, CreateTask, UpdateTask},
};

impl Planner {
    /// Summaries of every open plan in display order.
    pub fn list_plans_summary(&self) -> PlanSummaries {
        PlanSummaries(self.snapshot().summaries())
    }

    /// Opens a plan if needed, refreshes it when due, and returns its outline
    /// together with what the refresh did.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use plandeck_core::PlannerBuilder;
    /// # async {
    /// let planner = PlannerBuilder::new().build().await?;
    /// let (tree, outcome) = planner.show_plan("6f1c…").await?;
    /// println!("{tree}");
    /// if let Some(warning) = outcome.warning() {
    ///     eprintln!("{warning}");
    /// }
    /// # Result::<(), plandeck_core::PlannerError>::Ok(())
    /// # };
    /// ```
    pub async fn show_plan(&self, plan_id: &str) -> Result<(TaskTree, RefreshOutcome)> {
        self.open_plan(plan_id).await?;
        let outcome = self.refresh(plan_id).await?;
        let snapshot = self
            .plan_snapshot(plan_id)
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;
        Ok((TaskTree(snapshot), outcome))
    }

    /// A single task from whichever open plan contains it.
    pub fn show_task(&self, task_id: &str) -> Result<Task> {
        self.task(task_id)
            .ok_or_else(|| PlannerError::task_not_found(task_id))
    }

    pub async fn create_plan_result(&self, params: &CreatePlan) -> Result<CreateResult<Plan>> {
        self.create_plan(params).await.map(CreateResult::new)
    }

    pub async fn create_task_result(&self, params: &CreateTask) -> Result<CreateResult<Task>> {
        self.create_task(params).await.map(CreateResult::new)
    }

    /// Applies string-typed update parameters and lists what changed.
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidInput` - When the status is not a known status
    /// * Everything [`Planner::edit_task`] returns
    pub async fn update_task_result(&self, params: &UpdateTask) -> Result<UpdateResult> {
        let edit = params.into_edit()?;
        self.edit_task(&params.id, &edit).await.map(UpdateResult::from)
    }

    /// Deletes a task and everything below it. Plans are only deleted
    /// through [`Planner::delete_plan`].
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidInput` - When `task_id` is a plan
    /// * Everything [`Planner::delete_task`] returns
    pub async fn delete_task_result(&self, task_id: &str) -> Result<DeleteResult> {
        if self.is_open(task_id) {
            return Err(PlannerError::invalid_input("id")
                .with_reason(format!("{task_id} is a plan, delete it as a plan")));
        }
        self.delete_task(task_id).await.map(DeleteResult)
    }

    /// Users of an open plan with the local identity marked.
    pub async fn user_list(&self, plan_id: &str) -> Result<UserList> {
        let users = self
            .plan_snapshot(plan_id)
            .map(|snapshot| snapshot.tree.users().clone())
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;
        let me_user_id = self.me_user(plan_id).await?.map(|(id, _)| id);
        Ok(UserList::new(users, me_user_id))
    }
}
