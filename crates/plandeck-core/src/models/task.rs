//! Task model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// A unit of work inside a plan's hierarchy.
///
/// Hierarchy is stored twice: `parent_id` points up and `subtask_ids` lists
/// children in display order. Every mutation in the planner keeps both sides
/// in step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Client-generated unique identifier
    pub id: String,

    /// Non-empty display title
    pub title: String,

    /// Optional free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional outcome notes, usually filled in when the task is done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Current status of the task
    #[serde(default)]
    pub status: TaskStatus,

    /// Key into the owning plan's user dictionary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,

    /// Key into the owning plan's user dictionary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    /// Ordered child task ids
    #[serde(default)]
    pub subtask_ids: Vec<String>,

    /// Containing task or plan; absent for a plan root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Timestamp when the task was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the task was last modified on the server (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Task {
    /// Creates a task with the given id and title and every other field empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            result: None,
            status: TaskStatus::New,
            author_id: None,
            assignee_id: None,
            subtask_ids: Vec::new(),
            parent_id: None,
            created_at,
            updated_at: None,
        }
    }

    /// Whether this task has no parent, i.e. it is a plan root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the user is this task's author or assignee.
    pub fn references_user(&self, user_id: &str) -> bool {
        self.author_id.as_deref() == Some(user_id) || self.assignee_id.as_deref() == Some(user_id)
    }
}
