//! Id-indexed task trees.
//!
//! Hierarchy is held as plain id lookups: every [`Task`] names its parent and
//! lists its children by id, and [`PlanTree`] keeps both directions in step.
//! No task ever holds a reference to another, so consistency checks and
//! closures are map operations.
//!
//! - [`grouper`]: rebuilds plans from the flat record list of the store
//! - [`closure`]: computes the ids a cascading delete removes

pub mod closure;
pub mod grouper;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use log::debug;

pub use closure::{closure, TaskLookup};
pub use grouper::{group_into_plans, PlanGroup};

use crate::{
    error::{PlannerError, Result},
    models::{Plan, Record, Task, User, Users},
};

/// In-memory task tree of one open plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTree {
    root: Task,
    tasks: BTreeMap<String, Task>,
    users: Users,
    access_key: Option<String>,
}

/// A violation of the parent/child linkage invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// The parent exists but does not list the task
    Orphaned { task_id: String, parent_id: String },
    /// The task's parent is not in the tree
    MissingParent {
        task_id: String,
        parent_id: Option<String>,
    },
    /// A listed child is not in the tree
    Dangling { parent_id: String, child_id: String },
    /// A listed child names a different parent
    Misparented {
        parent_id: String,
        child_id: String,
        actual_parent: Option<String>,
    },
    /// A child is listed more than once
    Duplicate { parent_id: String, child_id: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::Orphaned { task_id, parent_id } => {
                write!(f, "task {task_id} is not listed by its parent {parent_id}")
            }
            Inconsistency::MissingParent { task_id, parent_id } => match parent_id {
                Some(parent_id) => write!(f, "task {task_id} points to missing parent {parent_id}"),
                None => write!(f, "task {task_id} has no parent"),
            },
            Inconsistency::Dangling {
                parent_id,
                child_id,
            } => write!(f, "{parent_id} lists missing child {child_id}"),
            Inconsistency::Misparented {
                parent_id,
                child_id,
                actual_parent,
            } => write!(
                f,
                "{parent_id} lists {child_id} whose parent is {}",
                actual_parent.as_deref().unwrap_or("unset")
            ),
            Inconsistency::Duplicate {
                parent_id,
                child_id,
            } => write!(f, "{parent_id} lists {child_id} more than once"),
        }
    }
}

impl PlanTree {
    /// A tree holding only the plan itself.
    pub fn new(plan: Plan) -> Self {
        Self {
            root: plan.task,
            tasks: BTreeMap::new(),
            users: plan.users,
            access_key: plan.access_key,
        }
    }

    /// Builds a tree from a plan record and its descendants, ignoring any
    /// descendant that repeats the root id.
    pub fn from_records(root: Record, descendants: impl IntoIterator<Item = Record>) -> Self {
        let mut tree = Self::new(root.into_plan());
        for record in descendants {
            if record.id() != tree.root.id {
                tree.tasks.entry(record.task.id.clone()).or_insert(record.task);
            }
        }
        tree
    }

    pub fn from_group(group: PlanGroup) -> Self {
        Self::from_records(group.root, group.tasks)
    }

    pub fn id(&self) -> &str {
        &self.root.id
    }

    pub fn root(&self) -> &Task {
        &self.root
    }

    /// Descendants of the plan keyed by id, excluding the plan itself.
    pub fn tasks(&self) -> &BTreeMap<String, Task> {
        &self.tasks
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }

    pub fn set_users(&mut self, users: Users) {
        self.users = users;
    }

    pub fn set_access_key(&mut self, access_key: Option<String>) {
        self.access_key = access_key;
    }

    /// The plan record as it would be pushed to the store.
    pub fn plan(&self) -> Plan {
        Plan {
            task: self.root.clone(),
            users: self.users.clone(),
            access_key: self.access_key.clone(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        if id == self.root.id {
            Some(&self.root)
        } else {
            self.tasks.get(id)
        }
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        if id == self.root.id {
            Some(&mut self.root)
        } else {
            self.tasks.get_mut(id)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of tasks including the plan itself.
    pub fn len(&self) -> usize {
        self.tasks.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Inserts `task` and appends it to its parent's child list in one step.
    ///
    /// # Errors
    ///
    /// `NotFound` if the task has no parent in this tree.
    pub fn insert_child(&mut self, task: Task) -> Result<()> {
        let parent_id = task
            .parent_id
            .clone()
            .ok_or_else(|| PlannerError::task_not_found(task.id.clone()))?;
        let parent = self
            .get_mut(&parent_id)
            .ok_or_else(|| PlannerError::task_not_found(parent_id.clone()))?;

        if !parent.subtask_ids.contains(&task.id) {
            parent.subtask_ids.push(task.id.clone());
        }
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Removes every listed descendant and strips the ids from all remaining
    /// child lists. The plan root is never removed here. Returns how many
    /// tasks were actually present.
    pub fn remove_all(&mut self, ids: &[String]) -> usize {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.tasks.len();
        self.tasks.retain(|id, _| !doomed.contains(id.as_str()));

        let strip = |task: &mut Task| {
            task.subtask_ids.retain(|child| !doomed.contains(child.as_str()));
        };
        strip(&mut self.root);
        self.tasks.values_mut().for_each(strip);

        before - self.tasks.len()
    }

    /// Replaces this tree with a fetched one while keeping local-only fields.
    ///
    /// The fetched plan record replaces the plan's own fields and every
    /// descendant is replaced wholesale. The access key always comes from
    /// `access_key`. Users start from the fetched dictionary and keep any
    /// local entry whose id the server does not know.
    pub fn merge_fetched(
        &mut self,
        root: Record,
        descendants: impl IntoIterator<Item = Record>,
        access_key: Option<String>,
    ) {
        let mut fetched = Self::from_records(root, descendants);

        for (id, user) in &self.users {
            if !fetched.users.contains_key(id) {
                fetched.users.insert(id.clone(), user.clone());
            }
        }
        fetched.access_key = access_key;

        *self = fetched;
    }

    /// Lists every violation of the linkage invariant.
    pub fn check_consistency(&self) -> Vec<Inconsistency> {
        let mut problems = Vec::new();

        for task in self.tasks.values() {
            match task.parent_id.as_deref().and_then(|p| self.get(p)) {
                Some(parent) => {
                    if !parent.subtask_ids.contains(&task.id) {
                        problems.push(Inconsistency::Orphaned {
                            task_id: task.id.clone(),
                            parent_id: parent.id.clone(),
                        });
                    }
                }
                None => problems.push(Inconsistency::MissingParent {
                    task_id: task.id.clone(),
                    parent_id: task.parent_id.clone(),
                }),
            }
        }

        for parent in std::iter::once(&self.root).chain(self.tasks.values()) {
            let mut listed = HashSet::new();
            for child_id in &parent.subtask_ids {
                if !listed.insert(child_id.as_str()) {
                    problems.push(Inconsistency::Duplicate {
                        parent_id: parent.id.clone(),
                        child_id: child_id.clone(),
                    });
                    continue;
                }
                match self.tasks.get(child_id) {
                    None => problems.push(Inconsistency::Dangling {
                        parent_id: parent.id.clone(),
                        child_id: child_id.clone(),
                    }),
                    Some(child) if child.parent_id.as_deref() != Some(parent.id.as_str()) => {
                        problems.push(Inconsistency::Misparented {
                            parent_id: parent.id.clone(),
                            child_id: child_id.clone(),
                            actual_parent: child.parent_id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        problems
    }

    /// Re-derives child lists from parent pointers.
    ///
    /// Each list keeps its existing order minus duplicates, missing ids and
    /// children that name another parent. Tasks the parent did not list are
    /// appended in creation order. Tasks still unreachable from the plan
    /// afterwards are dropped. Returns the ids of the tasks whose child list
    /// changed.
    pub fn repair_linkage(&mut self) -> Vec<String> {
        let mut expected: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
        for task in self.tasks.values() {
            if let Some(parent_id) = &task.parent_id {
                expected.entry(parent_id.clone()).or_default().push(task);
            }
        }

        let mut updates: Vec<(String, Vec<String>)> = Vec::new();
        for parent in std::iter::once(&self.root).chain(self.tasks.values()) {
            let mut children = expected.remove(&parent.id).unwrap_or_default();
            children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            let belongs: HashSet<&str> = children.iter().map(|t| t.id.as_str()).collect();

            let mut seen = HashSet::new();
            let mut repaired: Vec<String> = parent
                .subtask_ids
                .iter()
                .filter(|id| belongs.contains(id.as_str()) && seen.insert(id.as_str()))
                .cloned()
                .collect();
            for child in children {
                if seen.insert(child.id.as_str()) {
                    repaired.push(child.id.clone());
                }
            }

            if repaired != parent.subtask_ids {
                updates.push((parent.id.clone(), repaired));
            }
        }

        let changed: Vec<String> = updates.iter().map(|(id, _)| id.clone()).collect();
        for (id, subtask_ids) in updates {
            if let Some(task) = self.get_mut(&id) {
                task.subtask_ids = subtask_ids;
            }
        }

        let reachable: HashSet<String> = closure(&self.root.id, self).into_iter().collect();
        let before = self.tasks.len();
        self.tasks.retain(|id, _| reachable.contains(id));
        if self.tasks.len() < before {
            debug!(
                "Dropped {} unreachable tasks from plan {}",
                before - self.tasks.len(),
                self.root.id
            );
        }

        changed
    }

    /// Tasks in display order with their depth below the plan.
    pub fn walk(&self) -> Vec<(usize, &Task)> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![(0, &self.root)];

        while let Some((depth, task)) = stack.pop() {
            if !visited.insert(task.id.as_str()) {
                continue;
            }
            result.push((depth, task));
            for child_id in task.subtask_ids.iter().rev() {
                if let Some(child) = self.tasks.get(child_id) {
                    stack.push((depth + 1, child));
                }
            }
        }

        result
    }

    /// Tasks, plan included, authored by or assigned to the user.
    pub fn tasks_using_user(&self, user_id: &str) -> Vec<&Task> {
        self.walk()
            .into_iter()
            .map(|(_, task)| task)
            .filter(|task| task.references_user(user_id))
            .collect()
    }
}

impl TaskLookup for PlanTree {
    fn lookup(&self, id: &str) -> Option<&Task> {
        self.get(id)
    }
}
