//! Plan user operations for the Planner.

use log::info;

use super::{plan_ops::new_id, Planner};
use crate::{
    error::{PlannerError, Result},
    models::{Task, TaskPatch, User, Users},
};

impl Planner {
    /// Adds a user to a plan and returns the new user id.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is not open
    /// * `PlannerError::InvalidInput` - When the display name is blank or the
    ///   email is malformed
    pub async fn add_user(&self, plan_id: &str, user: &User) -> Result<String> {
        let user = user.normalized()?;
        let user_id = new_id();
        let id = user_id.clone();
        let display_name = user.display_name.clone();

        self.change_users(plan_id, move |users| {
            users.insert(id, user);
            Ok(())
        })
        .await?;

        info!("Added user {user_id} '{display_name}' to plan {plan_id}");
        Ok(user_id)
    }

    /// Replaces a plan user's profile.
    pub async fn update_user(&self, plan_id: &str, user_id: &str, user: &User) -> Result<User> {
        let user = user.normalized()?;
        let updated = user.clone();
        let id = user_id.to_string();

        self.change_users(plan_id, move |users| match users.get_mut(&id) {
            Some(existing) => {
                *existing = user;
                Ok(())
            }
            None => Err(PlannerError::user_not_found(id)),
        })
        .await?;

        info!("Updated user {user_id} of plan {plan_id}");
        Ok(updated)
    }

    /// Removes a plan user that nothing refers to.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is not open or has no such user
    /// * `PlannerError::InvalidInput` - When the user authored or is assigned
    ///   the plan, or any task refers to them
    pub async fn remove_user(&self, plan_id: &str, user_id: &str) -> Result<User> {
        let (plan, using) = self
            .read(|state| {
                let tree = &state.plan(plan_id)?.tree;
                let using = tree.tasks_using_user(user_id).len();
                Some((tree.root().clone(), using))
            })
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;

        let refuse = |reason: String| {
            Err(PlannerError::invalid_input("user_id").with_reason(reason))
        };
        if plan.author_id.as_deref() == Some(user_id) {
            return refuse(format!("User {user_id} is the author of the plan"));
        }
        if plan.assignee_id.as_deref() == Some(user_id) {
            return refuse(format!("User {user_id} is assigned to the plan"));
        }
        if using > 0 {
            return refuse(format!("User {user_id} is referenced by {using} task(s)"));
        }

        let id = user_id.to_string();
        let removed = self
            .change_users(plan_id, move |users| {
                users.remove(&id).ok_or_else(|| PlannerError::user_not_found(id))
            })
            .await?;

        info!("Removed user {user_id} from plan {plan_id}");
        Ok(removed)
    }

    /// Tasks of a plan, plan included, authored by or assigned to a user, in
    /// display order.
    pub fn tasks_using_user(&self, plan_id: &str, user_id: &str) -> Result<Vec<Task>> {
        self.read(|state| {
            state
                .plan(plan_id)
                .map(|open| {
                    open.tree
                        .tasks_using_user(user_id)
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .ok_or_else(|| PlannerError::plan_not_found(plan_id))
        })
    }

    /// Chooses which plan user acts locally.
    ///
    /// # Errors
    ///
    /// * `PlannerError::NotFound` - When the plan is not open or has no such user
    pub async fn set_me_user(&self, plan_id: &str, user_id: &str) -> Result<()> {
        let known = self
            .read(|state| state.plan(plan_id).map(|open| open.tree.user(user_id).is_some()))
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;
        if !known {
            return Err(PlannerError::user_not_found(user_id));
        }

        self.inner.local.set_me_user_id(plan_id, user_id).await?;
        info!("Acting as user {user_id} in plan {plan_id}");
        Ok(())
    }

    /// The local identity of a plan, if one is set.
    pub async fn me_user(&self, plan_id: &str) -> Result<Option<(String, User)>> {
        let Some(user_id) = self.inner.local.me_user_id(plan_id).await? else {
            return Ok(None);
        };
        Ok(self.read(|state| {
            state
                .plan(plan_id)
                .and_then(|open| open.tree.user(&user_id).cloned())
                .map(|user| (user_id.clone(), user))
        }))
    }

    /// Pushes a changed user dictionary, then applies it locally.
    ///
    /// `change` works on a copy; nothing changes locally if it fails or the
    /// push fails.
    async fn change_users<T>(
        &self,
        plan_id: &str,
        change: impl FnOnce(&mut Users) -> Result<T>,
    ) -> Result<T> {
        let mut users = self
            .read(|state| state.plan(plan_id).map(|open| open.tree.users().clone()))
            .ok_or_else(|| PlannerError::plan_not_found(plan_id))?;

        let result = change(&mut users)?;
        self.inner
            .records
            .patch(plan_id, &TaskPatch::users(users.clone()))
            .await?;

        self.update(|state| {
            if let Some(open) = state.plan_mut(plan_id) {
                open.revision += 1;
                open.tree.set_users(users);
            }
        });
        Ok(result)
    }
}
