//! Plan model definition and related functionality.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::{Task, Users};

/// A root task that also carries the plan's user dictionary and sharing
/// secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// The plan's own task fields
    #[serde(flatten)]
    pub task: Task,

    /// Users that tasks of this plan may reference
    #[serde(default)]
    pub users: Users,

    /// Sharing secret; only ever sourced from the local store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

impl Deref for Plan {
    type Target = Task;

    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

impl DerefMut for Plan {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.task
    }
}
