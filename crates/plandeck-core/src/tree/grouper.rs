//! Flat record list to plan forest.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::Record;

/// One plan rebuilt from flat records.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGroup {
    /// The parentless record the group is rooted at
    pub root: Record,
    /// The root followed by every reachable descendant in breadth-first order
    pub tasks: Vec<Record>,
}

impl PlanGroup {
    pub fn id(&self) -> &str {
        self.root.id()
    }
}

/// Partitions `records` into one group per record lacking a `parentId`.
///
/// Descendants are collected breadth-first over `subtaskIds`, following only
/// ids present in the input. Missing ids are skipped, and an id is never
/// visited twice within a group, so cyclic or duplicated child lists neither
/// loop nor duplicate output. When an id occurs more than once in the input
/// its first occurrence wins.
///
/// # Examples
///
/// ```rust
/// use jiff::Timestamp;
/// use plandeck_core::{models::{Record, Task}, tree::group_into_plans};
///
/// let now = Timestamp::now();
/// let mut plan = Task::new("p", "Trip", now);
/// plan.subtask_ids = vec!["a".to_string(), "gone".to_string()];
/// let mut child = Task::new("a", "Book flight", now);
/// child.parent_id = Some("p".to_string());
///
/// let groups = group_into_plans(&[Record::from(child), Record::from(plan)]);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].tasks.len(), 2);
/// ```
pub fn group_into_plans(records: &[Record]) -> Vec<PlanGroup> {
    let mut by_id: HashMap<&str, &Record> = HashMap::with_capacity(records.len());
    for record in records {
        by_id.entry(record.id()).or_insert(record);
    }

    let mut seen_roots = HashSet::new();
    let mut groups = Vec::new();

    for root in records.iter().filter(|r| r.task.parent_id.is_none()) {
        if !seen_roots.insert(root.id()) {
            continue;
        }

        let mut visited: HashSet<&str> = HashSet::from([root.id()]);
        let mut queue: VecDeque<&Record> = VecDeque::from([root]);
        let mut tasks = Vec::new();

        while let Some(record) = queue.pop_front() {
            tasks.push(record.clone());
            for child_id in &record.task.subtask_ids {
                if let Some(child) = by_id.get(child_id.as_str()) {
                    if visited.insert(child.id()) {
                        queue.push_back(child);
                    }
                }
            }
        }

        groups.push(PlanGroup {
            root: root.clone(),
            tasks,
        });
    }

    groups
}
