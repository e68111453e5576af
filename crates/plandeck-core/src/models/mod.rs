//! Data models for plans, tasks and plan users.
//!
//! A [`Plan`] is a [`Task`] without a parent that additionally carries a
//! [`Users`] dictionary and an access key. The remote store only knows flat
//! [`Record`]s; the tree structure is rebuilt locally from `parentId` and
//! `subtaskIds`. Display implementations live in [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use plandeck_core::models::{Plan, Task, TaskStatus, User};
//! use jiff::Timestamp;
//!
//! let mut task = Task::new("p1", "Trip", Timestamp::now());
//! task.author_id = Some("u1".to_string());
//!
//! let plan = Plan {
//!     task,
//!     users: [("u1".to_string(), User::new("Alice"))].into_iter().collect(),
//!     access_key: Some("secret".to_string()),
//! };
//! assert_eq!(plan.title, "Trip");
//! assert_eq!(plan.status, TaskStatus::New);
//! ```

pub mod plan;
pub mod record;
pub mod requests;
pub mod status;
pub mod summary;
pub mod task;
pub mod user;


pub use plan::Plan;
pub use record::Record;
pub use requests::{TaskEdit, TaskPatch};
pub use status::TaskStatus;
pub use summary::PlanSummary;
pub use task::Task;
pub use user::{User, Users};
