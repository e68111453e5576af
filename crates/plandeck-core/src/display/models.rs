//! Display implementations for domain models.
//!
//! These live apart from the model definitions so the models stay plain
//! data. All output is markdown for rich terminal display.

use std::fmt;

use super::datetime::{LastSync, LocalDateTime};
use crate::models::{Plan, PlanSummary, Task, TaskStatus, User};

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)?;

        let full_name: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !full_name.is_empty() {
            write!(f, " ({})", full_name.join(" "))?;
        }
        if let Some(email) = &self.email {
            write!(f, " <{email}>")?;
        }
        if let Some(phone) = &self.phone_number {
            write!(f, " {phone}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {} ({})", self.title, self.status.with_icon())?;
        writeln!(f)?;
        writeln!(f, "- ID: `{}`", self.id)?;
        if let Some(parent) = &self.parent_id {
            writeln!(f, "- Parent: `{parent}`")?;
        }
        if let Some(assignee) = &self.assignee_id {
            writeln!(f, "- Assignee: `{assignee}`")?;
        }
        if !self.subtask_ids.is_empty() {
            writeln!(f, "- Subtasks: {}", self.subtask_ids.len())?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        if let Some(updated) = &self.updated_at {
            writeln!(f, "- Updated: {}", LocalDateTime(updated))?;
        }

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        // Result is only meaningful once the task is done
        if self.status == TaskStatus::Done {
            if let Some(result) = &self.result {
                writeln!(f)?;
                writeln!(f, "#### Result")?;
                writeln!(f)?;
                writeln!(f, "{result}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;
        writeln!(f, "- ID: `{}`", self.id)?;
        writeln!(f, "- Status: {}", self.status.with_icon())?;
        if let Some(key) = &self.access_key {
            writeln!(f, "- Access key: `{key}`")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if !self.users.is_empty() {
            writeln!(f, "\n## Users")?;
            writeln!(f)?;
            for (id, user) in &self.users {
                let role = if self.author_id.as_deref() == Some(id.as_str()) {
                    " (author)"
                } else {
                    ""
                };
                writeln!(f, "- {user}{role} `{id}`")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = if self.total_tasks > 0 {
            format!(" ({}/{})", self.completed_tasks, self.total_tasks)
        } else {
            String::new()
        };

        writeln!(f, "## {} (ID: {}){progress}", self.title, self.id)?;
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "- **Description**: {desc}")?;
        }
        writeln!(f, "- **Status**: {}", self.status.with_icon())?;
        writeln!(f, "- **Users**: {}", self.user_count)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- **Synced**: {}", LastSync(self.last_update.as_ref()))?;
        if self.offline {
            writeln!(f, "- **Offline**: not yet on the server")?;
        }
        writeln!(f)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use crate::models::Users;

    use super::*;

    #[test]
    fn test_task_display_hides_result_until_done() {
        let mut task = Task::new("t1", "Book flight", Timestamp::now());
        task.result = Some("Booked LH 400".to_string());
        assert!(!task.to_string().contains("Booked LH 400"));

        task.status = TaskStatus::Done;
        let output = task.to_string();
        assert!(output.starts_with("### Book flight (✓ Done)"));
        assert!(output.contains("#### Result"));
        assert!(output.contains("Booked LH 400"));
    }

    #[test]
    fn test_user_display() {
        let mut user = User::new("Ann");
        user.first_name = Some("Ann".to_string());
        user.last_name = Some("Lee".to_string());
        user.email = Some("ann@example.com".to_string());
        assert_eq!(user.to_string(), "Ann (Ann Lee) <ann@example.com>");
        assert_eq!(User::new("Bo").to_string(), "Bo");
    }

    #[test]
    fn test_plan_display_marks_author() {
        let mut task = Task::new("p1", "Trip", Timestamp::now());
        task.author_id = Some("u1".to_string());
        let plan = Plan {
            task,
            users: Users::from([
                ("u1".to_string(), User::new("Ann")),
                ("u2".to_string(), User::new("Bo")),
            ]),
            access_key: Some("secret".to_string()),
        };

        let output = plan.to_string();
        assert!(output.starts_with("# Trip"));
        assert!(output.contains("- Ann (author) `u1`"));
        assert!(output.contains("- Bo `u2`"));
        assert!(output.contains("Access key: `secret`"));
    }
}
