//! Flat wire record exchanged with the record store.

use serde::{Deserialize, Serialize};

use super::{Plan, Task, Users};

/// A flat record as stored remotely: either a plain task or a plan, which is
/// a task with extra fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(flatten)]
    pub task: Task,

    /// Present on plan records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Users>,

    /// Never trusted when read back; see the refresh merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

impl Record {
    /// Id of the underlying task.
    pub fn id(&self) -> &str {
        &self.task.id
    }

    /// Reads this record as a plan; a record without users yields an empty
    /// user dictionary.
    pub fn into_plan(self) -> Plan {
        Plan {
            task: self.task,
            users: self.users.unwrap_or_default(),
            access_key: self.access_key,
        }
    }
}

impl From<Task> for Record {
    fn from(task: Task) -> Self {
        Self {
            task,
            users: None,
            access_key: None,
        }
    }
}

impl From<Plan> for Record {
    fn from(plan: Plan) -> Self {
        Self {
            task: plan.task,
            users: Some(plan.users),
            access_key: plan.access_key,
        }
    }
}

impl From<Record> for Task {
    fn from(record: Record) -> Self {
        record.task
    }
}
