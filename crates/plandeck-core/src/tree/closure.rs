//! Descendant closure used by cascading deletes.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::Task;

/// Read access to tasks by id.
pub trait TaskLookup {
    fn lookup(&self, id: &str) -> Option<&Task>;
}

impl TaskLookup for BTreeMap<String, Task> {
    fn lookup(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }
}

impl TaskLookup for HashMap<String, Task> {
    fn lookup(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }
}

/// Returns `id` followed by the closure of each child in `subtaskIds` order.
///
/// An id missing from `tasks` contributes only itself, so a lone unknown id
/// yields `[id]`. Ids already emitted are never revisited, which keeps the
/// walk finite on corrupted, cyclic data.
pub fn closure<L: TaskLookup + ?Sized>(id: &str, tasks: &L) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut result = Vec::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        result.push(current.to_string());

        if let Some(task) = tasks.lookup(current) {
            for child in task.subtask_ids.iter().rev() {
                if !visited.contains(child.as_str()) {
                    stack.push(child);
                }
            }
        }
    }

    result
}
