//! Collection wrapper types for displaying groups of domain objects.
//!
//! These wrappers format collections with a consistent structure and handle
//! empty collections gracefully.

use std::{fmt, ops::Index};

use super::datetime::LastSync;
use crate::{
    models::{PlanSummary, Users},
    planner::PlanSnapshot,
    tree::PlanTree,
};

/// Newtype wrapper for displaying collections of plan summaries.
///
/// # Examples
///
/// ```rust
/// use plandeck_core::{
///     display::PlanSummaries,
///     models::{PlanSummary, TaskStatus},
/// };
/// use jiff::Timestamp;
///
/// let plan = PlanSummary {
///     id: "p1".to_string(),
///     title: "Trip".to_string(),
///     description: None,
///     status: TaskStatus::New,
///     created_at: Timestamp::now(),
///     last_update: None,
///     total_tasks: 3,
///     completed_tasks: 1,
///     user_count: 2,
///     offline: false,
/// };
///
/// let output = PlanSummaries(vec![plan]).to_string();
/// assert!(output.contains("## Trip (ID: p1) (1/3)"));
/// ```
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&PlanSummary> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanSummary> {
        self.0.iter()
    }
}

impl Index<usize> for PlanSummaries {
    type Output = PlanSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for PlanSummaries {
    type Item = PlanSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlanSummaries {
    type Item = &'a PlanSummary;
    type IntoIter = std::slice::Iter<'a, PlanSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No plans found.")
        } else {
            for plan in &self.0 {
                write!(f, "{plan}")?;
            }
            Ok(())
        }
    }
}

/// An open plan rendered as a nested outline in child-list order.
///
/// Assignees are shown by display name when the plan knows them.
pub struct TaskTree(pub PlanSnapshot);

impl TaskTree {
    pub fn tree(&self) -> &PlanTree {
        &self.0.tree
    }
}

impl fmt::Display for TaskTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = &self.0;
        let tree = &snapshot.tree;
        let root = tree.root();

        writeln!(f, "# {} ({})", root.title, root.status.with_icon())?;
        writeln!(f)?;
        writeln!(f, "- ID: `{}`", root.id)?;
        writeln!(f, "- Synced: {}", LastSync(snapshot.last_update.as_ref()))?;
        if snapshot.is_refreshing {
            writeln!(f, "- Refreshing…")?;
        }
        if snapshot.offline {
            writeln!(f, "- Offline: not yet on the server")?;
        }
        if let Some(desc) = &root.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        writeln!(f)?;
        if tree.tasks().is_empty() {
            return writeln!(f, "No tasks in this plan.");
        }

        for (depth, task) in tree.walk().into_iter().skip(1) {
            let indent = "  ".repeat(depth.saturating_sub(1));
            write!(
                f,
                "{indent}- {} **{}** `{}`",
                task.status.with_icon(),
                task.title,
                task.id
            )?;
            if let Some(assignee_id) = &task.assignee_id {
                match tree.user(assignee_id) {
                    Some(user) => write!(f, " → {}", user.display_name)?,
                    None => write!(f, " → `{assignee_id}`")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A plan's user dictionary, with the local identity marked.
pub struct UserList {
    pub users: Users,
    pub me_user_id: Option<String>,
}

impl UserList {
    pub fn new(users: Users, me_user_id: Option<String>) -> Self {
        Self { users, me_user_id }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}

impl fmt::Display for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.users.is_empty() {
            return writeln!(f, "No users in this plan.");
        }
        for (id, user) in &self.users {
            let me = if self.me_user_id.as_deref() == Some(id.as_str()) {
                " (me)"
            } else {
                ""
            };
            writeln!(f, "- {user}{me} `{id}`")?;
        }
        Ok(())
    }
}
