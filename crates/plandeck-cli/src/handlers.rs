//! Command handlers that drive the planner and render the results.

use anyhow::{bail, Context, Result};
use log::debug;
use plandeck_core::{
    display::{DeleteResult, OperationStatus, UpdateResult, UserList},
    models::{User, Users},
    params::UpdateTask,
    Planner, RefreshOutcome,
};

use crate::{
    args::Commands,
    cli::{PlanCommands, ProfileCommands, TaskCommands, UserCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    planner: Planner,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(planner: Planner, renderer: TerminalRenderer) -> Self {
        Self { planner, renderer }
    }

    pub fn renderer(&self) -> &TerminalRenderer {
        &self.renderer
    }

    /// Opens the known plans, then runs `command`. Without a command the
    /// open plans are listed.
    pub async fn run(&self, command: Option<Commands>) -> Result<()> {
        let report = self
            .planner
            .load_plans()
            .await
            .context("Failed to load plans")?;
        debug!("{report}");
        if let Some(warning) = report.warning() {
            self.renderer.warn(warning);
        }

        match command {
            Some(Commands::Plan { command }) => self.handle_plan_command(command).await,
            Some(Commands::Task { command }) => self.handle_task_command(command).await,
            Some(Commands::User { command }) => self.handle_user_command(command).await,
            Some(Commands::Profile { command }) => self.handle_profile_command(command).await,
            None => {
                self.list_plans();
                Ok(())
            }
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let result = self.planner.create_plan_result(&args.into()).await?;
                let plan_id = result.resource.id.clone();
                self.renderer.render(&result.to_string());

                self.planner.flush().await;
                let offline = self
                    .planner
                    .plan_snapshot(&plan_id)
                    .is_some_and(|snapshot| snapshot.offline);
                if offline {
                    self.renderer.warn(format!(
                        "Plan {plan_id} is saved locally but is not on the server yet"
                    ));
                }
            }
            PlanCommands::List => self.list_plans(),
            PlanCommands::Show(args) => {
                let (tree, outcome) = self.planner.show_plan(&args.id).await?;
                self.render_refresh_warning(&outcome);
                self.renderer.render(&tree.to_string());
            }
            PlanCommands::Edit(args) => {
                let params: UpdateTask = args.into();
                let report = self
                    .planner
                    .edit_plan(&params.id, &params.into_edit()?)
                    .await?;
                self.renderer.render(&UpdateResult::from(report).to_string());
            }
            PlanCommands::Delete(args) => {
                if !args.confirm {
                    bail!(
                        "Deleting plan {} removes every task in it; pass --confirm to proceed",
                        args.id
                    );
                }
                let report = self.planner.delete_plan(&args.id).await?;
                self.renderer.render(&DeleteResult(report).to_string());
            }
            PlanCommands::Join(args) => {
                let snapshot = self.planner.join_plan(&args.into()).await?;
                self.renderer.render(
                    &OperationStatus::success(format!(
                        "Joined plan '{}' (ID: {})",
                        snapshot.tree.root().title,
                        snapshot.id()
                    ))
                    .to_string(),
                );
                if self.planner.me_user(snapshot.id()).await?.is_none() {
                    self.renderer.warn(format!(
                        "Choose who you are with `pd user me {}` before adding tasks",
                        snapshot.id()
                    ));
                }
            }
            PlanCommands::Refresh(args) => {
                let pushed = self.planner.retry_offline_pushes().await;
                if pushed > 0 {
                    self.renderer.render(
                        &OperationStatus::success(format!("Pushed {pushed} offline plan(s)"))
                            .to_string(),
                    );
                }

                let outcomes = match args.id {
                    Some(id) => {
                        let outcome = self.planner.refresh_now(&id).await?;
                        vec![(id, Ok(outcome))]
                    }
                    None => self.planner.refresh_all_now().await,
                };
                for (plan_id, outcome) in outcomes {
                    match outcome {
                        Ok(outcome) => {
                            self.render_refresh_warning(&outcome);
                            self.renderer.render(&format!("- `{plan_id}`: {outcome}\n"));
                        }
                        Err(e) => self.renderer.warn(format!("{plan_id}: {e}")),
                    }
                }
            }
        }
        Ok(())
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        match command {
            TaskCommands::Add(args) => {
                let result = self.planner.create_task_result(&args.into()).await?;
                self.renderer.render(&result.to_string());
            }
            TaskCommands::Show(args) => {
                let task = self.planner.show_task(&args.id)?;
                self.renderer.render(&task.to_string());
            }
            TaskCommands::Edit(args) => {
                let params: UpdateTask = args.into();
                let result = self.planner.update_task_result(&params).await?;
                self.renderer.render(&result.to_string());
            }
            TaskCommands::Delete(args) => {
                let result = self.planner.delete_task_result(&args.id).await?;
                self.renderer.render(&result.to_string());
            }
        }
        Ok(())
    }

    pub async fn handle_user_command(&self, command: UserCommands) -> Result<()> {
        match command {
            UserCommands::List(args) => {
                let users = self.planner.user_list(&args.plan_id).await?;
                self.renderer.render(&users.to_string());
            }
            UserCommands::Add(args) => {
                let user: User = args.user.into();
                let user_id = self.planner.add_user(&args.plan_id, &user).await?;
                self.renderer.render(
                    &OperationStatus::success(format!(
                        "Added user '{}' with ID: {user_id}",
                        user.display_name.trim()
                    ))
                    .to_string(),
                );
            }
            UserCommands::Edit(args) => {
                let user = self
                    .planner
                    .update_user(&args.plan_id, &args.user_id, &args.user.into())
                    .await?;
                self.renderer.render(
                    &OperationStatus::success(format!("Updated user {}: {user}", args.user_id))
                        .to_string(),
                );
            }
            UserCommands::Remove(args) => {
                let user = self
                    .planner
                    .remove_user(&args.plan_id, &args.user_id)
                    .await?;
                self.renderer.render(
                    &OperationStatus::success(format!(
                        "Removed user '{}' (ID: {})",
                        user.display_name, args.user_id
                    ))
                    .to_string(),
                );
            }
            UserCommands::Me(args) => {
                if let Some(user_id) = &args.user_id {
                    self.planner.set_me_user(&args.plan_id, user_id).await?;
                }
                match self.planner.me_user(&args.plan_id).await? {
                    Some((user_id, user)) => {
                        let mut users = Users::new();
                        users.insert(user_id.clone(), user);
                        self.renderer
                            .render(&UserList::new(users, Some(user_id)).to_string());
                    }
                    None => self.renderer.warn(format!(
                        "No identity chosen for plan {}",
                        args.plan_id
                    )),
                }
            }
        }
        Ok(())
    }

    pub async fn handle_profile_command(&self, command: ProfileCommands) -> Result<()> {
        let user = match command {
            ProfileCommands::Show => self.planner.default_user().await?,
            ProfileCommands::Set(args) => self.planner.set_default_user(&args.into()).await?,
        };
        self.renderer.render(&format!("{user}\n"));
        Ok(())
    }

    fn list_plans(&self) {
        let summaries = self.planner.list_plans_summary();
        self.renderer.render(&summaries.to_string());
    }

    fn render_refresh_warning(&self, outcome: &RefreshOutcome) {
        if let Some(warning) = outcome.warning() {
            self.renderer.warn(warning);
        }
    }
}

