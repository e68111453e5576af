//! Core library for Plandeck shared plans.
//!
//! A plan is a tree of tasks shared between several people through a REST
//! record store. The server keeps a flat collection of records; this crate
//! reassembles them into trees, keeps parent and child links consistent
//! through every create, edit and cascading delete, and reconciles local
//! trees with the server through throttled, single-flight refreshes.
//!
//! # Layers
//!
//! - **Models** ([`models`]): Tasks, plans, plan users and the wire records
//! - **Tree** ([`tree`]): Arena-backed plan trees, grouping and closures
//! - **Stores** ([`store`]): The remote [`store::RecordStore`] and the durable
//!   [`store::LocalStore`] holding plan ids and secrets
//! - **Planner** ([`planner`]): The sync engine that owns every open plan
//! - **Display** ([`display`]): Markdown formatting for terminal output
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use plandeck_core::{params::CreatePlan, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_server_url("http://localhost:8123")
//!     .build()
//!     .await?;
//!
//! let report = planner.load_plans().await?;
//! if let Some(warning) = report.warning() {
//!     eprintln!("{warning}");
//! }
//!
//! let plan = planner
//!     .create_plan(&CreatePlan {
//!         title: "Trip".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{plan}");
//!
//! for summary in &planner.list_plans_summary() {
//!     println!("Plan: {}", summary.title);
//! }
//! planner.flush().await;
//! # Ok(())
//! # }
//! ```

pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod planner;
pub mod store;
pub mod tree;

// Re-export commonly used types
pub use display::{
    CreateResult, DeleteResult, LocalDateTime, OperationStatus, PlanSummaries, TaskTree,
    UpdateResult, UserList,
};
pub use error::{PlannerError, Result};
pub use models::{Plan, PlanSummary, Record, Task, TaskEdit, TaskPatch, TaskStatus, User, Users};
pub use params::{CreatePlan, CreateTask, JoinPlan, UpdateTask};
pub use planner::{
    DeleteReport, EditReport, LoadReport, PlanSnapshot, Planner, PlannerBuilder, RefreshOutcome,
    Snapshot,
};
pub use store::{HttpRecordStore, LocalStore, MemoryRecordStore, RecordStore, SqliteLocalStore};
pub use tree::{closure, group_into_plans, Inconsistency, PlanTree};
