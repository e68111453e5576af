//! Result wrapper types for displaying operation outcomes.
//!
//! These format the results of create, update, delete and sync operations
//! with consistent messaging. Partial successes are spelled out as warnings
//! rather than hidden.

use std::fmt;

use crate::{
    models::{Plan, Task},
    planner::{DeleteReport, EditReport, LoadReport, RefreshOutcome},
};

/// Wrapper type for displaying the result of create operations.
///
/// # Examples
///
/// ```rust
/// use plandeck_core::{display::CreateResult, models::Task};
/// use jiff::Timestamp;
///
/// let task = Task::new("t1", "Book flight", Timestamp::now());
/// let output = CreateResult::new(task).to_string();
/// assert!(output.starts_with("Created task with ID: t1"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created plan with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created task with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of an edit, listing what changed.
///
/// # Examples
///
/// ```rust
/// use plandeck_core::{
///     display::UpdateResult,
///     models::{Task, TaskStatus},
/// };
/// use jiff::Timestamp;
///
/// let mut task = Task::new("t1", "Book flight", Timestamp::now());
/// task.status = TaskStatus::Done;
///
/// let result = UpdateResult::with_changes(task, vec!["Changed status to ✓ Done".to_string()]);
/// assert!(result.to_string().contains("- Changed status to ✓ Done"));
/// ```
pub struct UpdateResult {
    pub resource: Task,
    pub changes: Vec<String>,
}

impl UpdateResult {
    pub fn new(resource: Task) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: Task, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl From<EditReport> for UpdateResult {
    fn from(report: EditReport) -> Self {
        let changes = report.patch.describe_changes();
        Self::with_changes(report.task, changes)
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.resource.is_root() { "plan" } else { "task" };

        if self.changes.is_empty() {
            writeln!(f, "No changes to {kind} with ID: {}", self.resource.id)?;
        } else {
            writeln!(f, "Updated {kind} with ID: {}", self.resource.id)?;
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of a cascading delete.
pub struct DeleteResult(pub DeleteReport);

impl fmt::Display for DeleteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.0;
        let kind = if report.plan_removed { "plan" } else { "task" };

        match &report.title {
            Some(title) => write!(f, "Deleted {kind} '{title}' (ID: {})", report.target_id)?,
            None => write!(f, "Deleted {kind} (ID: {})", report.target_id)?,
        }
        let below = report.removed_count().saturating_sub(1);
        if below > 0 {
            write!(f, " and {below} task(s) below it")?;
        }
        writeln!(f)?;

        if let Some(warning) = report.warning() {
            writeln!(f)?;
            writeln!(f, "Warning: {warning}")?;
            for failure in &report.failures {
                writeln!(f, "- `{}`: {}", failure.id, failure.error)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshOutcome::Throttled => write!(f, "Refreshed recently, skipped"),
            RefreshOutcome::InFlight => write!(f, "Refresh already running"),
            RefreshOutcome::Refreshed { tasks, repaired } => {
                write!(f, "Refreshed {tasks} task(s)")?;
                if *repaired > 0 {
                    write!(f, ", repaired {repaired} child list(s)")?;
                }
                Ok(())
            }
            RefreshOutcome::PlanMissing => write!(f, "Plan not on the server, kept local copy"),
            RefreshOutcome::Superseded => write!(f, "Changed locally during refresh, will retry"),
            RefreshOutcome::Stale { error } => write!(f, "Using offline data: {error}"),
            RefreshOutcome::Unavailable { error } => write!(f, "Cannot load plan (offline): {error}"),
            RefreshOutcome::Closed => write!(f, "Plan was closed"),
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Opened {} plan(s)", self.opened.len())?;
        if let Some(warning) = self.warning() {
            writeln!(f, "Warning: {warning}")?;
        }
        for id in &self.unavailable {
            writeln!(f, "- `{id}` unavailable")?;
        }
        Ok(())
    }
}
