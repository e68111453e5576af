//! Tests for the planner module.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::{
    error::PlannerError,
    models::{Plan, Record, Task, TaskEdit, TaskStatus, User, Users},
    params::{CreatePlan, CreateTask, JoinPlan, UpdateTask},
    store::{MemoryRecordStore, Operation, RecordStore},
    tree::closure,
};

struct Harness {
    dir: TempDir,
    store: Arc<MemoryRecordStore>,
    planner: Planner,
}

impl Harness {
    /// Planner that refreshes on every trigger.
    async fn new() -> Self {
        Self::with_interval(Duration::ZERO).await
    }

    async fn with_interval(interval: Duration) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(MemoryRecordStore::new());
        let planner = build(&dir, &store, interval).await;
        Self {
            dir,
            store,
            planner,
        }
    }

    /// Second planner over the same local database and server.
    async fn reopen(&self) -> Planner {
        build(&self.dir, &self.store, Duration::ZERO).await
    }

    async fn plan(&self, title: &str) -> Plan {
        let plan = self
            .planner
            .create_plan(&CreatePlan {
                title: title.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create plan");
        self.planner.flush().await;
        plan
    }

    async fn task(&self, parent_id: &str, title: &str) -> Task {
        self.planner
            .create_task(&CreateTask {
                parent_id: parent_id.to_string(),
                title: title.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create task")
    }

    async fn task_result(&self, parent_id: &str) -> crate::error::Result<Task> {
        self.planner
            .create_task(&CreateTask {
                parent_id: parent_id.to_string(),
                title: "Anything".to_string(),
                ..Default::default()
            })
            .await
    }

    fn tree(&self, plan_id: &str) -> crate::tree::PlanTree {
        self.planner
            .plan_snapshot(plan_id)
            .expect("Plan is not open")
            .tree
    }

    /// The plan as the server sees it.
    async fn server_tree(&self, plan_id: &str) -> crate::tree::PlanTree {
        let records = self.store.fetch_subtree(plan_id).await.unwrap();
        let (mut roots, rest): (Vec<Record>, Vec<Record>) =
            records.into_iter().partition(|r| r.id() == plan_id);
        crate::tree::PlanTree::from_records(roots.pop().unwrap(), rest)
    }
}

async fn build(dir: &TempDir, store: &Arc<MemoryRecordStore>, interval: Duration) -> Planner {
    PlannerBuilder::new()
        .with_database_path(dir.path().join("test.db"))
        .with_record_store(store.clone())
        .with_refresh_interval(interval)
        .build()
        .await
        .expect("Failed to create planner")
}

/// A plan someone else created, already on the server.
fn foreign_plan(store: &MemoryRecordStore, plan_id: &str) {
    let mut root = Task::new(plan_id, "Shared", jiff::Timestamp::now());
    root.author_id = Some("u1".to_string());
    store.insert(Record::from(Plan {
        task: root,
        users: Users::from([
            ("u1".to_string(), User::new("Ann")),
            ("u2".to_string(), User::new("Bo")),
        ]),
        access_key: None,
    }));
}

#[tokio::test]
async fn test_trip_scenario() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;
    let seat = h.task(&flight.id, "Pick seat").await;

    assert_eq!(h.store.len(), 3);
    let tree = h.tree(&plan.id);
    assert_eq!(tree.root().subtask_ids, vec![flight.id.clone()]);
    assert_eq!(tree.get(&flight.id).unwrap().subtask_ids, vec![seat.id.clone()]);
    assert_eq!(closure(&plan.id, &tree).len(), 3);
    assert!(tree.check_consistency().is_empty());
    assert!(h.server_tree(&plan.id).await.check_consistency().is_empty());

    let report = h.planner.delete_task(&flight.id).await.unwrap();
    assert_eq!(report.removed_count(), 2);
    assert!(report.warning().is_none());
    assert_eq!(report.parent_unlinked, Some(true));

    assert_eq!(h.store.len(), 1);
    assert!(h.tree(&plan.id).root().subtask_ids.is_empty());
    assert!(h.store.get(&plan.id).unwrap().task.subtask_ids.is_empty());
}

#[tokio::test]
async fn test_create_plan_registers_creator() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    let author_id = plan.author_id.clone().unwrap();
    assert_eq!(plan.users.get(&author_id).unwrap().display_name, "Me");

    let (me_id, me) = h.planner.me_user(&plan.id).await.unwrap().unwrap();
    assert_eq!(me_id, author_id);
    assert_eq!(me.display_name, "Me");
    assert_eq!(
        h.tree(&plan.id).access_key(),
        plan.access_key.as_deref()
    );

    let summaries = h.planner.list_plans_summary();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].title, "Trip");
    assert_eq!(summaries[0].user_count, 1);
    assert!(!summaries[0].offline);
}

#[tokio::test]
async fn test_create_plan_uses_given_creator() {
    let h = Harness::new().await;
    let plan = h
        .planner
        .create_plan(&CreatePlan {
            title: "  Trip  ".to_string(),
            description: Some("   ".to_string()),
            creator: Some(User::new(" Ann ")),
        })
        .await
        .unwrap();

    assert_eq!(plan.title, "Trip");
    assert_eq!(plan.description, None);
    let author_id = plan.author_id.as_deref().unwrap();
    assert_eq!(plan.users[author_id].display_name, "Ann");
}

#[tokio::test]
async fn test_blank_titles_make_no_network_call() {
    let h = Harness::new().await;
    let result = h
        .planner
        .create_plan(&CreatePlan {
            title: "   ".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(PlannerError::InvalidTitle)));

    let plan = h.plan("Trip").await;
    let creates = h.store.calls(Operation::Create);

    let result = h
        .planner
        .create_task(&CreateTask {
            parent_id: plan.id.clone(),
            title: "\t".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(PlannerError::InvalidTitle)));
    assert_eq!(h.store.calls(Operation::Create), creates);

    let result = h
        .planner
        .edit_task(&plan.id, &TaskEdit::default().with_title(" "))
        .await;
    assert!(matches!(result, Err(PlannerError::InvalidTitle)));
    assert_eq!(h.store.calls(Operation::Patch), 0);
}

#[tokio::test]
async fn test_create_task_under_unknown_parent() {
    let h = Harness::new().await;
    h.plan("Trip").await;

    let result = h.task_result("missing").await;
    assert!(matches!(result, Err(PlannerError::NotFound { kind: "Task", .. })));
}

#[tokio::test]
async fn test_create_task_checks_assignee_membership() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    let result = h
        .planner
        .create_task(&CreateTask {
            parent_id: plan.id.clone(),
            title: "Book flight".to_string(),
            assignee_id: Some("stranger".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        result,
        Err(PlannerError::InvalidInput { ref field, .. }) if field == "assignee_id"
    ));
    assert!(h.tree(&plan.id).tasks().is_empty());
}

#[tokio::test]
async fn test_join_without_identity_then_choose_one() {
    let h = Harness::new().await;
    foreign_plan(&h.store, "shared");

    let snapshot = h
        .planner
        .join_plan(&JoinPlan {
            plan_id: "shared".to_string(),
            access_key: "key".to_string(),
            me_user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(snapshot.tree.users().len(), 2);
    assert_eq!(snapshot.tree.access_key(), Some("key"));

    let result = h.task_result("shared").await;
    assert!(matches!(result, Err(PlannerError::MissingIdentity { ref plan_id }) if plan_id == "shared"));

    h.planner.set_me_user("shared", "u2").await.unwrap();
    let task = h.task("shared", "Bring snacks").await;
    assert_eq!(task.author_id.as_deref(), Some("u2"));
}

#[tokio::test]
async fn test_join_rejects_non_member_identity() {
    let h = Harness::new().await;
    foreign_plan(&h.store, "shared");

    let result = h
        .planner
        .join_plan(&JoinPlan {
            plan_id: "shared".to_string(),
            access_key: "key".to_string(),
            me_user_id: Some("nobody".to_string()),
        })
        .await;
    assert!(matches!(result, Err(PlannerError::InvalidInput { .. })));
    assert!(!h.planner.is_open("shared"));
    assert!(h.planner.inner.local.plan_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_unknown_plan_is_not_registered() {
    let h = Harness::new().await;

    let result = h
        .planner
        .join_plan(&JoinPlan {
            plan_id: "ghost".to_string(),
            access_key: "key".to_string(),
            me_user_id: None,
        })
        .await;
    assert!(matches!(result, Err(PlannerError::NotFound { .. })));
    assert!(h.planner.inner.local.plan_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_write_is_repaired_by_refresh() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    h.store.fail(Operation::Patch);
    let result = h.task_result(&plan.id).await;
    let (task_id, parent_id) = match result {
        Err(PlannerError::PartialWrite {
            task_id, parent_id, ..
        }) => (task_id, parent_id),
        other => panic!("expected a partial write, got {other:?}"),
    };
    assert_eq!(parent_id, plan.id);

    // The task is linked locally even though the server parent is not
    let tree = h.tree(&plan.id);
    assert_eq!(tree.root().subtask_ids, vec![task_id.clone()]);
    assert!(tree.check_consistency().is_empty());
    assert!(h.store.get(&plan.id).unwrap().task.subtask_ids.is_empty());

    h.store.clear_failures();
    let outcome = h.planner.refresh(&plan.id).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Refreshed { tasks: 1, repaired: 1 }));

    assert_eq!(h.tree(&plan.id).root().subtask_ids, vec![task_id.clone()]);
    assert_eq!(h.store.get(&plan.id).unwrap().task.subtask_ids, vec![task_id]);
}

#[tokio::test]
async fn test_failed_task_push_changes_nothing() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    h.store.fail(Operation::Create);
    let result = h.task_result(&plan.id).await;
    assert!(matches!(result, Err(PlannerError::ServerRejected { status: 500, .. })));
    assert!(h.tree(&plan.id).tasks().is_empty());
    assert_eq!(h.store.calls(Operation::Patch), 0);
}

#[tokio::test]
async fn test_refresh_is_throttled() {
    let h = Harness::with_interval(Duration::from_secs(3600)).await;
    let plan = h.plan("Trip").await;

    let outcome = h.planner.refresh(&plan.id).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Throttled));
    assert!(!outcome.fetched());
    assert_eq!(h.store.calls(Operation::FetchSubtree), 0);
}

#[tokio::test]
async fn test_refresh_triggers_within_interval_fetch_once() {
    let h = Harness::with_interval(DEFAULT_REFRESH_INTERVAL).await;
    let plan = h.plan("Trip").await;
    h.planner.update(|state| {
        if let Some(open) = state.plan_mut(&plan.id) {
            open.last_update = None;
        }
    });

    let first = h.planner.refresh(&plan.id).await.unwrap();
    let second = h.planner.refresh(&plan.id).await.unwrap();

    assert!(matches!(first, RefreshOutcome::Refreshed { .. }));
    assert!(matches!(second, RefreshOutcome::Throttled));
    assert_eq!(h.store.calls(Operation::FetchSubtree), 1);
}

#[tokio::test]
async fn test_refresh_now_ignores_interval() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    h.task(&plan.id, "Book flight").await;

    let planner = build(&h.dir, &h.store, DEFAULT_REFRESH_INTERVAL).await;
    planner.load_plans().await.unwrap();

    let throttled = planner.refresh(&plan.id).await.unwrap();
    assert!(matches!(throttled, RefreshOutcome::Throttled));
    assert_eq!(h.store.calls(Operation::FetchSubtree), 0);

    let forced = planner.refresh_now(&plan.id).await.unwrap();
    assert!(matches!(forced, RefreshOutcome::Refreshed { tasks: 1, .. }));
    assert_eq!(h.store.calls(Operation::FetchSubtree), 1);

    let all = planner.refresh_all_now().await;
    assert_eq!(all.len(), 1);
    assert!(matches!(all[0].1, Ok(RefreshOutcome::Refreshed { .. })));
}

#[tokio::test]
async fn test_concurrent_refreshes_fetch_once() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    h.store
        .set_latency(Operation::FetchSubtree, Duration::from_millis(50));

    let (first, second) = tokio::join!(h.planner.refresh(&plan.id), h.planner.refresh(&plan.id));
    let outcomes = [first.unwrap(), second.unwrap()];

    assert_eq!(h.store.calls(Operation::FetchSubtree), 1);
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, RefreshOutcome::Refreshed { .. })));
    assert!(outcomes.iter().any(|o| matches!(o, RefreshOutcome::InFlight)));
    assert!(!h.planner.plan_snapshot(&plan.id).unwrap().is_refreshing);
}

#[tokio::test]
async fn test_refresh_overlapping_edit_is_superseded() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let before = h.planner.plan_snapshot(&plan.id).unwrap().last_update;
    h.store
        .set_latency(Operation::FetchSubtree, Duration::from_millis(100));

    let edit = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.planner
            .edit_task(&plan.id, &TaskEdit::default().with_title("Road trip"))
            .await
    };
    let (outcome, edited) = tokio::join!(h.planner.refresh(&plan.id), edit);

    assert!(matches!(outcome.unwrap(), RefreshOutcome::Superseded));
    assert!(edited.unwrap().changed());

    let snapshot = h.planner.plan_snapshot(&plan.id).unwrap();
    assert_eq!(snapshot.tree.root().title, "Road trip");
    assert_eq!(snapshot.last_update, before);
    assert!(!snapshot.is_refreshing);
}

#[tokio::test]
async fn test_refresh_failure_keeps_cached_tree() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    h.task(&plan.id, "Book flight").await;

    h.store.set_offline(true);
    let outcome = h.planner.refresh(&plan.id).await.unwrap();
    assert_eq!(outcome.warning(), Some("Using offline data"));
    assert_eq!(h.tree(&plan.id).tasks().len(), 1);
}

#[tokio::test]
async fn test_refresh_takes_server_changes_and_keeps_secrets() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;

    // Another client renames the task and leaks a different key
    let mut record = h.store.get(&flight.id).unwrap();
    record.task.title = "Book train".to_string();
    h.store.insert(record);
    let mut root = h.store.get(&plan.id).unwrap();
    root.access_key = Some("leaked".to_string());
    h.store.insert(root);

    h.planner.refresh(&plan.id).await.unwrap();

    let tree = h.tree(&plan.id);
    assert_eq!(tree.get(&flight.id).unwrap().title, "Book train");
    assert_eq!(tree.access_key(), plan.access_key.as_deref());
}

#[tokio::test]
async fn test_refresh_of_plan_missing_on_server_repushes() {
    let h = Harness::new().await;
    h.store.set_offline(true);
    let plan = h.plan("Trip").await;
    assert!(h.planner.plan_snapshot(&plan.id).unwrap().offline);

    h.store.set_offline(false);
    let outcome = h.planner.refresh(&plan.id).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::PlanMissing));
    assert!(h.store.get(&plan.id).is_some());
    assert!(!h.planner.plan_snapshot(&plan.id).unwrap().offline);
}

#[tokio::test]
async fn test_offline_plan_push_is_retried() {
    let h = Harness::new().await;
    h.store.set_offline(true);
    let plan = h.plan("Trip").await;

    let summaries = h.planner.list_plans_summary();
    assert!(summaries[0].offline);
    assert_eq!(h.planner.retry_offline_pushes().await, 0);

    h.store.set_offline(false);
    assert_eq!(h.planner.retry_offline_pushes().await, 1);
    assert!(h.store.get(&plan.id).is_some());
    assert!(!h.planner.plan_snapshot(&plan.id).unwrap().offline);
}

#[tokio::test]
async fn test_edit_pushes_only_changes() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;

    let report = h
        .planner
        .edit_task(
            &flight.id,
            &TaskEdit::default()
                .with_title("Book flight")
                .with_status(TaskStatus::Done)
                .with_result(Some("LH 400".to_string())),
        )
        .await
        .unwrap();

    assert_eq!(report.patch.title, None);
    assert_eq!(report.task.status, TaskStatus::Done);
    assert!(report.task.updated_at.is_some());
    assert_eq!(h.store.calls(Operation::Patch), 2);

    let server = h.store.get(&flight.id).unwrap().task;
    assert_eq!(server.status, TaskStatus::Done);
    assert_eq!(server.result.as_deref(), Some("LH 400"));

    // Same edit again: nothing to send
    let again = h
        .planner
        .edit_task(&flight.id, &TaskEdit::default().with_status(TaskStatus::Done))
        .await
        .unwrap();
    assert!(!again.changed());
    assert_eq!(h.store.calls(Operation::Patch), 2);
}

#[tokio::test]
async fn test_update_task_result_parses_strings() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;

    let result = h
        .planner
        .update_task_result(&UpdateTask {
            id: flight.id.clone(),
            status: Some("in_progress".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(result.resource.status, TaskStatus::InProgress);
    assert_eq!(result.changes, vec!["Changed status to ➤ In Progress"]);

    let invalid = h
        .planner
        .update_task_result(&UpdateTask {
            id: flight.id,
            status: Some("finished".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(invalid, Err(PlannerError::InvalidInput { ref field, .. }) if field == "status"));
}

#[tokio::test]
async fn test_delete_is_best_effort() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;
    let seat = h.task(&flight.id, "Pick seat").await;

    h.store.fail_for(Operation::Delete, &seat.id);
    let report = h.planner.delete_task(&flight.id).await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, seat.id);
    assert!(report.warning().unwrap().starts_with("1 of 2 deletions"));

    let tree = h.tree(&plan.id);
    assert!(tree.tasks().is_empty());
    assert!(tree.check_consistency().is_empty());
    assert!(h.store.get(&seat.id).is_some());
}

#[tokio::test]
async fn test_deleted_task_does_not_come_back() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;

    h.store.fail_for(Operation::Delete, &flight.id);
    let report = h.planner.delete_task(&flight.id).await.unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.parent_unlinked, Some(true));
    assert!(h.store.get(&flight.id).is_some());

    // The server still returns the task with its parent pointer
    let outcome = h.planner.refresh(&plan.id).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Refreshed { tasks: 0, repaired: 0 }));
    assert!(!h.tree(&plan.id).contains(&flight.id));
    assert!(h.store.get(&plan.id).unwrap().task.subtask_ids.is_empty());
    assert_eq!(
        h.planner.inner.local.pending_deletes(&plan.id).await.unwrap(),
        vec![flight.id.clone()]
    );

    // A new session keeps it out as well
    let planner = h.reopen().await;
    planner.load_plans().await.unwrap();
    planner.refresh_now(&plan.id).await.unwrap();
    assert!(planner
        .plan_snapshot(&plan.id)
        .is_some_and(|snapshot| !snapshot.tree.contains(&flight.id)));

    // Once the server accepts the delete it is forgotten
    h.store.clear_failures();
    h.planner.refresh(&plan.id).await.unwrap();
    assert!(h.store.get(&flight.id).is_none());
    assert!(h
        .planner
        .inner
        .local
        .pending_deletes(&plan.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_delete_task_result_refuses_plans() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let flight = h.task(&plan.id, "Book flight").await;

    let result = h.planner.delete_task_result(&plan.id).await;
    assert!(matches!(result, Err(PlannerError::InvalidInput { ref field, .. }) if field == "id"));
    assert!(h.planner.is_open(&plan.id));
    assert_eq!(h.store.calls(Operation::Delete), 0);

    let deleted = h.planner.delete_task_result(&flight.id).await.unwrap();
    assert_eq!(deleted.0.removed, vec![flight.id.clone()]);
    assert!(!deleted.0.plan_removed);
}

#[tokio::test]
async fn test_delete_plan_forgets_it() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    h.task(&plan.id, "Book flight").await;

    let report = h.planner.delete_task(&plan.id).await.unwrap();
    assert!(report.plan_removed);
    assert_eq!(report.removed_count(), 2);
    assert_eq!(report.parent_unlinked, None);

    assert!(h.store.is_empty());
    assert!(!h.planner.is_open(&plan.id));
    assert!(h.planner.inner.local.plan_ids().await.unwrap().is_empty());
    assert!(h.planner.inner.local.plan_secret(&plan.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_registered_plan_that_is_not_open() {
    let h = Harness::new().await;
    h.store.set_offline(true);
    let plan = h.plan("Trip").await;
    h.store.set_offline(false);

    let planner = h.reopen().await;
    let report = planner.load_plans().await.unwrap();
    assert_eq!(report.unavailable, vec![plan.id.clone()]);

    let report = planner.delete_plan(&plan.id).await.unwrap();
    assert_eq!(report.removed, vec![plan.id.clone()]);
    assert_eq!(report.failures.len(), 1);
    assert!(planner.inner.local.plan_ids().await.unwrap().is_empty());

    let missing = planner.delete_plan(&plan.id).await;
    assert!(matches!(missing, Err(PlannerError::NotFound { kind: "Plan", .. })));
}

#[tokio::test]
async fn test_load_plans_restores_trees() {
    let h = Harness::new().await;
    let trip = h.plan("Trip").await;
    let flight = h.task(&trip.id, "Book flight").await;
    h.task(&flight.id, "Pick seat").await;
    let party = h.plan("Party").await;

    let planner = h.reopen().await;
    let report = planner.load_plans().await.unwrap();
    assert_eq!(report.opened, vec![trip.id.clone(), party.id.clone()]);
    assert!(report.warning().is_none());

    let snapshot = planner.plan_snapshot(&trip.id).unwrap();
    assert_eq!(snapshot.tree.tasks().len(), 2);
    assert_eq!(snapshot.tree.access_key(), trip.access_key.as_deref());
    assert!(snapshot.tree.check_consistency().is_empty());

    // Loading again opens nothing new
    let again = planner.load_plans().await.unwrap();
    assert!(again.opened.is_empty());
}

#[tokio::test]
async fn test_load_plans_offline() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    h.store.set_offline(true);
    let planner = h.reopen().await;
    let report = planner.load_plans().await.unwrap();

    assert!(report.offline);
    assert_eq!(report.unavailable, vec![plan.id.clone()]);
    assert!(report.warning().is_some());
    assert!(planner.open_plan_ids().is_empty());
}

#[tokio::test]
async fn test_open_unregistered_plan_is_not_found() {
    let h = Harness::new().await;
    foreign_plan(&h.store, "shared");

    let result = h.planner.open_plan("shared").await;
    assert!(matches!(result, Err(PlannerError::NotFound { .. })));
    assert_eq!(h.store.calls(Operation::FetchSubtree), 0);
}

#[tokio::test]
async fn test_user_management() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    let author_id = plan.author_id.clone().unwrap();

    let bo = h.planner.add_user(&plan.id, &User::new("Bo")).await.unwrap();
    assert_eq!(h.tree(&plan.id).users().len(), 2);
    assert_eq!(
        h.store.get(&plan.id).unwrap().users.unwrap().len(),
        2
    );

    let flight = h
        .planner
        .create_task(&CreateTask {
            parent_id: plan.id.clone(),
            title: "Book flight".to_string(),
            assignee_id: Some(bo.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(h.planner.tasks_using_user(&plan.id, &bo).unwrap().len(), 1);

    let refused = h.planner.remove_user(&plan.id, &author_id).await;
    assert!(matches!(refused, Err(PlannerError::InvalidInput { .. })));
    let refused = h.planner.remove_user(&plan.id, &bo).await;
    assert!(matches!(refused, Err(PlannerError::InvalidInput { .. })));

    h.planner
        .edit_task(&flight.id, &TaskEdit::default().with_assignee(None))
        .await
        .unwrap();
    let removed = h.planner.remove_user(&plan.id, &bo).await.unwrap();
    assert_eq!(removed.display_name, "Bo");
    assert!(h.tree(&plan.id).user(&bo).is_none());

    let users = h.planner.user_list(&plan.id).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users.me_user_id.as_deref(), Some(author_id.as_str()));
}

#[tokio::test]
async fn test_failed_user_push_changes_nothing() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    h.store.fail(Operation::Patch);
    let result = h.planner.add_user(&plan.id, &User::new("Bo")).await;
    assert!(result.is_err());
    assert_eq!(h.tree(&plan.id).users().len(), 1);
}

#[tokio::test]
async fn test_tree_stays_consistent_through_mutations() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    let a = h.task(&plan.id, "a").await;
    let b = h.task(&plan.id, "b").await;
    let a1 = h.task(&a.id, "a1").await;
    let a2 = h.task(&a.id, "a2").await;
    h.task(&a1.id, "a1x").await;
    let b1 = h.task(&b.id, "b1").await;

    h.planner.delete_task(&a1.id).await.unwrap();
    h.task(&b1.id, "b1x").await;
    h.planner.delete_task(&b.id).await.unwrap();
    h.task(&a2.id, "a2x").await;

    let tree = h.tree(&plan.id);
    assert!(tree.check_consistency().is_empty());
    assert_eq!(closure(&plan.id, &tree).len(), 4);

    let server = h.server_tree(&plan.id).await;
    assert!(server.check_consistency().is_empty());
    assert_eq!(server.len(), tree.len());
}

#[tokio::test]
async fn test_subscribers_see_changes() {
    let h = Harness::new().await;
    let mut rx = h.planner.subscribe();
    let plan = h.plan("Trip").await;

    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().plan(&plan.id).is_some());

    h.task(&plan.id, "Book flight").await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().plan(&plan.id).unwrap().tree.tasks().len(), 1);
}

#[tokio::test]
async fn test_close_plan_drops_tree() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;

    assert!(h.planner.close_plan(&plan.id));
    assert!(!h.planner.close_plan(&plan.id));
    assert!(matches!(
        h.planner.refresh(&plan.id).await,
        Err(PlannerError::NotFound { .. })
    ));

    let snapshot = h.planner.open_plan(&plan.id).await.unwrap();
    assert_eq!(snapshot.tree.root().title, "Trip");
}

#[tokio::test]
async fn test_show_plan_renders_outline() {
    let h = Harness::new().await;
    let plan = h.plan("Trip").await;
    h.task(&plan.id, "Book flight").await;

    let (tree, outcome) = h.planner.show_plan(&plan.id).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Refreshed { tasks: 1, .. }));
    assert!(tree.to_string().contains("**Book flight**"));
}
