use std::sync::Arc;
use std::time::Duration;

use plandeck_core::{MemoryRecordStore, Planner, PlannerBuilder};
use tempfile::TempDir;

/// A client with its own local database, talking to `server`.
pub async fn create_client(server: &Arc<MemoryRecordStore>) -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let planner = PlannerBuilder::new()
        .with_database_path(&db_path)
        .with_record_store(server.clone())
        .with_refresh_interval(Duration::ZERO)
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}
