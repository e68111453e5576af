//! Results of planner operations that can partly succeed.

use crate::{
    error::PlannerError,
    models::{Task, TaskPatch},
};

/// What a refresh trigger did.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The last update is more recent than the refresh interval
    Throttled,
    /// Another refresh of the plan is still running
    InFlight,
    /// The server's view was merged into the plan
    Refreshed { tasks: usize, repaired: usize },
    /// The server has no record of the plan; the cached tree was kept
    PlanMissing,
    /// A local mutation landed while fetching; the fetched data was dropped
    Superseded,
    /// The fetch failed and cached tasks are shown instead
    Stale { error: PlannerError },
    /// The fetch failed and nothing is cached
    Unavailable { error: PlannerError },
    /// The plan was closed before the fetch completed
    Closed,
}

impl RefreshOutcome {
    /// Whether a fetch was issued.
    pub fn fetched(&self) -> bool {
        !matches!(self, RefreshOutcome::Throttled | RefreshOutcome::InFlight)
    }

    /// Non-fatal status to show next to the plan, if any.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            RefreshOutcome::Stale { .. } => Some("Using offline data"),
            RefreshOutcome::Unavailable { .. } => Some("Cannot load plan (offline)"),
            _ => None,
        }
    }
}

/// Result of opening the locally known plans.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Plans opened by this load
    pub opened: Vec<String>,
    /// Known plans the server could not provide
    pub unavailable: Vec<String>,
    /// The plan list could not be fetched at all
    pub offline: bool,
}

impl LoadReport {
    pub fn warning(&self) -> Option<String> {
        if self.offline {
            Some("Server unreachable; plans are unavailable until it is back".to_string())
        } else if !self.unavailable.is_empty() {
            Some(format!(
                "{} known plan(s) could not be loaded",
                self.unavailable.len()
            ))
        } else {
            None
        }
    }
}

/// A per-id delete the server did not confirm.
#[derive(Debug)]
pub struct DeleteFailure {
    pub id: String,
    pub error: PlannerError,
}

/// Result of a cascading delete.
///
/// Local state is pruned regardless of server acknowledgment, so `removed`
/// lists every id the delete intended to remove.
#[derive(Debug)]
pub struct DeleteReport {
    pub target_id: String,
    pub title: Option<String>,
    pub removed: Vec<String>,
    pub failures: Vec<DeleteFailure>,
    /// `None` for plan deletes, otherwise whether the parent update succeeded
    pub parent_unlinked: Option<bool>,
    pub plan_removed: bool,
}

impl DeleteReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Aggregated warning about unconfirmed server work.
    pub fn warning(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.failures.is_empty() {
            parts.push(format!(
                "{} of {} deletions were not confirmed by the server",
                self.failures.len(),
                self.removed.len()
            ));
        }
        if self.parent_unlinked == Some(false) {
            parts.push("the parent task could not be updated".to_string());
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Result of an edit: the task after the edit and what was sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EditReport {
    pub task: Task,
    pub patch: TaskPatch,
}

impl EditReport {
    pub fn changed(&self) -> bool {
        !self.patch.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_warnings() {
        let stale = RefreshOutcome::Stale {
            error: PlannerError::NetworkUnavailable {
                message: "down".to_string(),
            },
        };
        assert_eq!(stale.warning(), Some("Using offline data"));
        assert!(stale.fetched());
        assert!(!RefreshOutcome::Throttled.fetched());
        assert_eq!(RefreshOutcome::PlanMissing.warning(), None);
    }

    #[test]
    fn test_delete_warning_aggregates() {
        let report = DeleteReport {
            target_id: "a".to_string(),
            title: None,
            removed: vec!["a".to_string(), "b".to_string()],
            failures: vec![DeleteFailure {
                id: "b".to_string(),
                error: PlannerError::ServerRejected {
                    status: 500,
                    body: "boom".to_string(),
                },
            }],
            parent_unlinked: Some(false),
            plan_removed: false,
        };

        assert_eq!(
            report.warning().unwrap(),
            "1 of 2 deletions were not confirmed by the server; the parent task could not be updated"
        );
        assert_eq!(report.removed_count(), 2);
    }
}
