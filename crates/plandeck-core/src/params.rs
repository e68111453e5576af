//! Parameter structures for planner operations
//!
//! Core parameter structures carry no interface-specific derives. The CLI
//! wraps them in its own `clap` argument types and converts with `.into()`,
//! so the planner API stays independent of how requests are collected.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │  Core Params    │
//! │  (clap derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘
//! ```
//!
//! ### Adding New Parameters
//!
//! 1. **Define core structure** in this module with minimal dependencies
//! 2. **Add an argument wrapper** in the CLI with `clap` derives
//! 3. **Implement `From`** from the wrapper to the core type
//! 4. **Accept the core type** in the planner method

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{PlannerError, Result},
    models::{TaskEdit, TaskStatus, User},
};

/// Parameters for creating a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlan {
    /// Title of the plan (required)
    pub title: String,
    /// Optional detailed description of the plan
    pub description: Option<String>,
    /// Profile of the creating user; the stored default profile when absent
    pub creator: Option<User>,
}

/// Parameters for creating a task under an existing plan or task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    /// ID of the plan or task that will contain the new task
    pub parent_id: String,
    /// Title of the task (required)
    pub title: String,
    /// Optional detailed description of the task
    pub description: Option<String>,
    /// Optional plan user to assign the task to
    pub assignee_id: Option<String>,
}

/// Parameters for joining a plan shared by someone else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinPlan {
    /// ID of the shared plan
    pub plan_id: String,
    /// Sharing secret handed out by the plan's creator
    pub access_key: String,
    /// Plan user to act as; may be chosen later
    pub me_user_id: Option<String>,
}

/// Parameters for updating an existing task or plan.
///
/// Text fields follow command-line conventions: an empty string clears a
/// clearable field, `None` leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// Task or plan ID to update (required)
    pub id: String,
    /// New status ('new', 'in_progress', 'automatic' or 'done')
    pub status: Option<String>,
    /// Updated title
    pub title: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Notes on what was accomplished
    pub result: Option<String>,
    /// Plan user the task is assigned to
    pub assignee_id: Option<String>,
}

impl UpdateTask {
    /// Validates the parameters and converts them into a [`TaskEdit`].
    ///
    /// # Errors
    ///
    /// * `PlannerError::InvalidInput` - When the status string is invalid
    /// * `PlannerError::InvalidTitle` - When the new title is blank
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plandeck_core::{models::TaskStatus, params::UpdateTask};
    ///
    /// let params = UpdateTask {
    ///     id: "t1".to_string(),
    ///     status: Some("done".to_string()),
    ///     description: Some(String::new()),
    ///     ..Default::default()
    /// };
    /// let edit = params.into_edit()?;
    /// assert_eq!(edit.status, Some(TaskStatus::Done));
    /// assert_eq!(edit.description, Some(None));
    /// # plandeck_core::Result::<()>::Ok(())
    /// ```
    pub fn into_edit(&self) -> Result<TaskEdit> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                TaskStatus::from_str(s).map_err(|_| PlannerError::InvalidInput {
                    field: "status".to_string(),
                    reason: format!(
                        "Invalid status: {s}. Must be 'new', 'in_progress', 'automatic' or 'done'"
                    ),
                })
            })
            .transpose()?;

        let edit = TaskEdit {
            title: self.title.clone(),
            description: self.description.as_deref().map(clearable),
            result: self.result.as_deref().map(clearable),
            status,
            assignee_id: self.assignee_id.as_deref().map(clearable),
        };
        edit.validate()?;
        Ok(edit)
    }
}

fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Trims a title, rejecting blank input.
pub(crate) fn normalize_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PlannerError::InvalidTitle);
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_valid_status() {
        let params = UpdateTask {
            id: "t1".to_string(),
            status: Some("in_progress".to_string()),
            ..Default::default()
        };

        let edit = params.into_edit().unwrap();
        assert_eq!(edit.status, Some(TaskStatus::InProgress));
        assert_eq!(edit.title, None);
        assert_eq!(edit.description, None);
    }

    #[test]
    fn test_update_task_invalid_status() {
        let params = UpdateTask {
            id: "t1".to_string(),
            status: Some("blocked".to_string()),
            ..Default::default()
        };

        match params.into_edit().unwrap_err() {
            PlannerError::InvalidInput { field, reason } => {
                assert_eq!(field, "status");
                assert!(reason.contains("Invalid status: blocked"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_task_blank_title() {
        let params = UpdateTask {
            id: "t1".to_string(),
            title: Some("  ".to_string()),
            ..Default::default()
        };

        assert!(matches!(params.into_edit(), Err(PlannerError::InvalidTitle)));
    }

    #[test]
    fn test_update_task_empty_strings_clear() {
        let params = UpdateTask {
            id: "t1".to_string(),
            assignee_id: Some(String::new()),
            result: Some(" Packed ".to_string()),
            ..Default::default()
        };

        let edit = params.into_edit().unwrap();
        assert_eq!(edit.assignee_id, Some(None));
        assert_eq!(edit.result, Some(Some("Packed".to_string())));
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Trip ").unwrap(), "Trip");
        assert!(matches!(normalize_title(""), Err(PlannerError::InvalidTitle)));
    }
}
