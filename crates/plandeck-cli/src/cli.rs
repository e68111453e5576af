//! Command-line argument wrappers using clap.
//!
//! Core parameter types carry no clap derives. Each command here defines its
//! own argument struct and converts into the core type explicitly:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Planner
//! ```

use clap::{Args, Subcommand, ValueEnum};
use plandeck_core::{
    models::{TaskStatus, User},
    params::{CreatePlan, CreateTask, JoinPlan, UpdateTask},
};

/// Create a new plan
///
/// The plan is owned by a new plan user copied from your profile (see
/// `pd profile`).
#[derive(Args)]
pub struct CreatePlanArgs {
    /// Title of the plan
    pub title: String,
    #[arg(short, long, help = "Optional description of the plan")]
    pub description: Option<String>,
}

impl From<CreatePlanArgs> for CreatePlan {
    fn from(val: CreatePlanArgs) -> Self {
        CreatePlan {
            title: val.title,
            description: val.description,
            creator: None,
        }
    }
}

/// Show a plan with its task outline
#[derive(Args)]
pub struct ShowPlanArgs {
    #[arg(help = "Identifier of the plan to show")]
    pub id: String,
}

/// Change a plan's title, description or status
///
/// Pass an empty string to clear the description.
#[derive(Args)]
pub struct EditPlanArgs {
    #[arg(help = "Identifier of the plan to edit")]
    pub id: String,
    #[arg(short, long, help = "New title for the plan")]
    pub title: Option<String>,
    #[arg(short, long, help = "New description; empty clears it")]
    pub description: Option<String>,
    #[arg(short, long, help = "New status for the plan")]
    pub status: Option<TaskStatusArg>,
}

impl From<EditPlanArgs> for UpdateTask {
    fn from(val: EditPlanArgs) -> Self {
        UpdateTask {
            id: val.id,
            status: val.status.map(|s| s.to_string()),
            title: val.title,
            description: val.description,
            result: None,
            assignee_id: None,
        }
    }
}

/// Delete a plan and every task in it
#[derive(Args)]
pub struct DeletePlanArgs {
    #[arg(help = "Identifier of the plan to delete")]
    pub id: String,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

/// Join a plan someone shared with you
#[derive(Args)]
pub struct JoinPlanArgs {
    #[arg(help = "Identifier of the shared plan")]
    pub id: String,
    #[arg(help = "Access key received together with the plan id")]
    pub access_key: String,
    #[arg(long, help = "Plan user id to act as; can be chosen later with `pd user me`")]
    pub me: Option<String>,
}

impl From<JoinPlanArgs> for JoinPlan {
    fn from(val: JoinPlanArgs) -> Self {
        JoinPlan {
            plan_id: val.id,
            access_key: val.access_key,
            me_user_id: val.me,
        }
    }
}

/// Refresh plans from the server
#[derive(Args)]
pub struct RefreshPlanArgs {
    #[arg(help = "Identifier of the plan to refresh; all open plans if omitted")]
    pub id: Option<String>,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a new plan
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List open plans
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show a plan with its task outline
    #[command(alias = "s")]
    Show(ShowPlanArgs),
    /// Change a plan's title, description or status
    #[command(alias = "e")]
    Edit(EditPlanArgs),
    /// Delete a plan and every task in it
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
    /// Join a plan someone shared with you
    #[command(alias = "j")]
    Join(JoinPlanArgs),
    /// Refresh plans from the server and retry offline pushes
    #[command(alias = "r")]
    Refresh(RefreshPlanArgs),
}

/// Add a task under a plan or another task
#[derive(Args)]
pub struct AddTaskArgs {
    #[arg(help = "Identifier of the plan or task to add this task under")]
    pub parent_id: String,
    /// Title of the task
    pub title: String,
    #[arg(short, long, help = "Optional description of what needs to be done")]
    pub description: Option<String>,
    #[arg(short, long, help = "Plan user id to assign the task to")]
    pub assignee: Option<String>,
}

impl From<AddTaskArgs> for CreateTask {
    fn from(val: AddTaskArgs) -> Self {
        CreateTask {
            parent_id: val.parent_id,
            title: val.title,
            description: val.description,
            assignee_id: val.assignee,
        }
    }
}

/// Show a single task
#[derive(Args)]
pub struct ShowTaskArgs {
    #[arg(help = "Identifier of the task to show")]
    pub id: String,
}

/// Update a task's status or details
///
/// Only the given fields change. Pass an empty string to clear the
/// description, result or assignee.
#[derive(Args)]
pub struct UpdateTaskArgs {
    #[arg(help = "Identifier of the task to update")]
    pub id: String,
    #[arg(short, long, help = "New status for the task")]
    pub status: Option<TaskStatusArg>,
    #[arg(short, long, help = "Updated title for the task")]
    pub title: Option<String>,
    #[arg(short, long, help = "Updated description; empty clears it")]
    pub description: Option<String>,
    #[arg(short, long, help = "What came out of the task; empty clears it")]
    pub result: Option<String>,
    #[arg(short, long, help = "Plan user id to assign; empty unassigns")]
    pub assignee: Option<String>,
}

impl From<UpdateTaskArgs> for UpdateTask {
    fn from(val: UpdateTaskArgs) -> Self {
        UpdateTask {
            id: val.id,
            status: val.status.map(|s| s.to_string()),
            title: val.title,
            description: val.description,
            result: val.result,
            assignee_id: val.assignee,
        }
    }
}

/// Delete a task and everything below it
#[derive(Args)]
pub struct DeleteTaskArgs {
    #[arg(help = "Identifier of the task to delete")]
    pub id: String,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task under a plan or another task
    #[command(alias = "a")]
    Add(AddTaskArgs),
    /// Show a single task
    #[command(alias = "s")]
    Show(ShowTaskArgs),
    /// Update a task's status or details
    #[command(aliases = ["u", "e", "update"])]
    Edit(UpdateTaskArgs),
    /// Delete a task and everything below it
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteTaskArgs),
}

/// Profile fields of a person
#[derive(Args)]
pub struct UserArgs {
    /// Name shown next to assigned tasks
    pub name: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

impl From<UserArgs> for User {
    fn from(val: UserArgs) -> Self {
        User {
            display_name: val.name,
            first_name: val.first_name,
            last_name: val.last_name,
            email: val.email,
            phone_number: val.phone,
        }
    }
}

#[derive(Args)]
pub struct PlanIdArg {
    #[arg(help = "Identifier of the plan")]
    pub plan_id: String,
}

#[derive(Args)]
pub struct AddUserArgs {
    #[arg(help = "Identifier of the plan")]
    pub plan_id: String,
    #[command(flatten)]
    pub user: UserArgs,
}

#[derive(Args)]
pub struct EditUserArgs {
    #[arg(help = "Identifier of the plan")]
    pub plan_id: String,
    #[arg(help = "Identifier of the plan user")]
    pub user_id: String,
    #[command(flatten)]
    pub user: UserArgs,
}

#[derive(Args)]
pub struct UserRefArgs {
    #[arg(help = "Identifier of the plan")]
    pub plan_id: String,
    #[arg(help = "Identifier of the plan user")]
    pub user_id: String,
}

/// Show or choose who you are in a plan
#[derive(Args)]
pub struct MeArgs {
    #[arg(help = "Identifier of the plan")]
    pub plan_id: String,
    #[arg(help = "Plan user id to act as; shows the current one if omitted")]
    pub user_id: Option<String>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List the users of a plan
    #[command(aliases = ["l", "ls"])]
    List(PlanIdArg),
    /// Add a user to a plan
    #[command(alias = "a")]
    Add(AddUserArgs),
    /// Replace a plan user's profile
    #[command(alias = "e")]
    Edit(EditUserArgs),
    /// Remove a user nobody refers to
    #[command(aliases = ["d", "rm"])]
    Remove(UserRefArgs),
    /// Show or choose who you are in a plan
    Me(MeArgs),
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile used when creating plans
    Show,
    /// Replace the profile used when creating plans
    Set(UserArgs),
}

/// Command-line representation of task status values
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum TaskStatusArg {
    /// Not started
    New,
    /// Being worked on
    InProgress,
    /// Progresses without manual work
    Automatic,
    /// Finished
    Done,
}

impl From<TaskStatusArg> for TaskStatus {
    fn from(val: TaskStatusArg) -> Self {
        match val {
            TaskStatusArg::New => TaskStatus::New,
            TaskStatusArg::InProgress => TaskStatus::InProgress,
            TaskStatusArg::Automatic => TaskStatus::Automatic,
            TaskStatusArg::Done => TaskStatus::Done,
        }
    }
}

impl std::fmt::Display for TaskStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", TaskStatus::from(*self).as_str())
    }
}
