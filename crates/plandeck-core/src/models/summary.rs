//! Plan summary model for list views.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::TaskStatus;
use crate::planner::PlanSnapshot;

/// Summary information about an open plan, including task counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: Timestamp,
    pub last_update: Option<Timestamp>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub user_count: usize,
    /// The plan was never confirmed by the server
    pub offline: bool,
}

impl From<&PlanSnapshot> for PlanSummary {
    fn from(snapshot: &PlanSnapshot) -> Self {
        let root = snapshot.tree.root();
        let tasks = snapshot.tree.tasks();
        Self {
            id: root.id.clone(),
            title: root.title.clone(),
            description: root.description.clone(),
            status: root.status,
            created_at: root.created_at,
            last_update: snapshot.last_update,
            total_tasks: tasks.len(),
            completed_tasks: tasks
                .values()
                .filter(|t| t.status == TaskStatus::Done)
                .count(),
            user_count: snapshot.tree.users().len(),
            offline: snapshot.offline,
        }
    }
}
