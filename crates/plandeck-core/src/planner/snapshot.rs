//! Read-only views of the open plans published to the UI layer.

use jiff::Timestamp;
use tokio::sync::watch;

use super::Planner;
use crate::{models::PlanSummary, tree::PlanTree};

/// State of one open plan at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSnapshot {
    pub tree: PlanTree,
    pub last_update: Option<Timestamp>,
    pub is_refreshing: bool,
    /// The plan's initial push has not reached the server
    pub offline: bool,
}

impl PlanSnapshot {
    pub fn id(&self) -> &str {
        self.tree.id()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary::from(self)
    }
}

/// Every open plan, in the order plans were opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub plans: Vec<PlanSnapshot>,
}

impl Snapshot {
    pub fn plan(&self, id: &str) -> Option<&PlanSnapshot> {
        self.plans.iter().find(|p| p.id() == id)
    }

    pub fn summaries(&self) -> Vec<PlanSummary> {
        self.plans.iter().map(PlanSummary::from).collect()
    }
}

impl Planner {
    /// Current state of all open plans.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// State of one open plan.
    pub fn plan_snapshot(&self, plan_id: &str) -> Option<PlanSnapshot> {
        self.inner.snapshots.borrow().plan(plan_id).cloned()
    }

    /// Receiver that observes a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshots.subscribe()
    }
}
