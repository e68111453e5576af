//! Task status enumeration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of task statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been started
    #[default]
    New,

    /// Task is being worked on
    InProgress,

    /// Task progresses without manual intervention
    Automatic,

    /// Task has been completed
    Done,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(TaskStatus::New),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "automatic" => Ok(TaskStatus::Automatic),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

impl TaskStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "new",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Automatic => "automatic",
            TaskStatus::Done => "done",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plandeck_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Done.with_icon(), "✓ Done");
    /// assert_eq!(TaskStatus::InProgress.with_icon(), "➤ In Progress");
    /// assert_eq!(TaskStatus::New.with_icon(), "○ New");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::New => "○ New",
            TaskStatus::InProgress => "➤ In Progress",
            TaskStatus::Automatic => "⟳ Automatic",
            TaskStatus::Done => "✓ Done",
        }
    }
}
