//! Edit requests and the partial-update payload sent to the record store.

use serde::Serialize;

use super::{Task, TaskStatus, Users};
use crate::error::{PlannerError, Result};

/// Requested changes to a task or plan.
///
/// `None` leaves a field alone. For clearable fields, `Some(None)` clears the
/// value and `Some(Some(..))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub result: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Option<String>>,
}

impl TaskEdit {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_result(mut self, result: Option<String>) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_assignee(mut self, assignee_id: Option<String>) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Rejects an edit that would clear the title.
    pub fn validate(&self) -> Result<()> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(PlannerError::InvalidTitle),
            _ => Ok(()),
        }
    }

    /// Computes the patch holding only the fields that differ from `current`.
    pub fn diff(&self, current: &Task) -> TaskPatch {
        let mut patch = TaskPatch::default();

        if let Some(title) = &self.title {
            let title = title.trim();
            if title != current.title {
                patch.title = Some(title.to_string());
            }
        }
        if let Some(description) = &self.description {
            let description = normalize_text(description.as_deref());
            if description != current.description {
                patch.description = Some(description);
            }
        }
        if let Some(result) = &self.result {
            let result = normalize_text(result.as_deref());
            if result != current.result {
                patch.result = Some(result);
            }
        }
        if let Some(status) = self.status {
            if status != current.status {
                patch.status = Some(status);
            }
        }
        if let Some(assignee_id) = &self.assignee_id {
            let assignee_id = normalize_text(assignee_id.as_deref());
            if assignee_id != current.assignee_id {
                patch.assignee_id = Some(assignee_id);
            }
        }

        patch
    }
}

/// Partial update sent to the record store. Only `Some` fields are
/// serialized; `Some(None)` is sent as `null` to clear a value.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Users>,
}

impl TaskPatch {
    /// Patch replacing a parent's child list.
    pub fn subtasks(subtask_ids: Vec<String>) -> Self {
        Self {
            subtask_ids: Some(subtask_ids),
            ..Default::default()
        }
    }

    /// Patch replacing a plan's user dictionary.
    pub fn users(users: Users) -> Self {
        Self {
            users: Some(users),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }

    /// Shallow-merges the task fields of this patch into `task`.
    ///
    /// `users` is not a task field and is left to the caller.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(result) = &self.result {
            task.result = result.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assignee_id) = &self.assignee_id {
            task.assignee_id = assignee_id.clone();
        }
        if let Some(subtask_ids) = &self.subtask_ids {
            task.subtask_ids = subtask_ids.clone();
        }
    }

    /// Human-readable list of the changes this patch carries.
    pub fn describe_changes(&self) -> Vec<String> {
        let mut changes = Vec::new();
        if let Some(title) = &self.title {
            changes.push(format!("Updated title to '{title}'"));
        }
        if let Some(description) = &self.description {
            changes.push(describe_optional("description", description.as_deref()));
        }
        if let Some(result) = &self.result {
            changes.push(describe_optional("result", result.as_deref()));
        }
        if let Some(status) = self.status {
            changes.push(format!("Changed status to {}", status.with_icon()));
        }
        if let Some(assignee_id) = &self.assignee_id {
            changes.push(describe_optional("assignee", assignee_id.as_deref()));
        }
        if self.subtask_ids.is_some() {
            changes.push("Updated subtask order".to_string());
        }
        if self.users.is_some() {
            changes.push("Updated users".to_string());
        }
        changes
    }
}

fn describe_optional(field: &str, value: Option<&str>) -> String {
    match value {
        Some(_) => format!("Updated {field}"),
        None => format!("Cleared {field}"),
    }
}

/// Trims optional text and treats blank input as absent.
pub(crate) fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
