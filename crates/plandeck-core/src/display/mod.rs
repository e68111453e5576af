//! Display formatting for models and operation results.
//!
//! Domain models implement `Display` directly; collections and operation
//! outcomes are formatted through newtype wrappers. Everything renders to
//! markdown so the CLI can pass it straight to its terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │    Wrappers     │    │   Formatted     │
//! │  (Plan, Task)   │───▶│ (TaskTree, ...) │───▶│    Markdown     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrappers (PlanSummaries, TaskTree, UserList)
//! - [`results`]: Operation results (CreateResult, UpdateResult, DeleteResult)
//! - [`status`]: One-line feedback (OperationStatus)
//! - [`datetime`]: Date/time formatting utilities
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use plandeck_core::{
//!     display::{CreateResult, OperationStatus},
//!     models::Task,
//! };
//! use jiff::Timestamp;
//!
//! let task = Task::new("t1", "Book flight", Timestamp::now());
//! let output = CreateResult::new(task).to_string();
//! assert!(output.contains("### Book flight (○ New)"));
//!
//! let warning = OperationStatus::warning("Using offline data");
//! assert_eq!(warning.to_string(), "Warning: Using offline data\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{PlanSummaries, TaskTree, UserList};
pub use datetime::{LastSync, LocalDateTime};
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::{OperationStatus, StatusKind};
