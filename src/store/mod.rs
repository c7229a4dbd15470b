/// Storage Layer
///
/// The execution engine only talks to storage through the traits below:
/// - `FlowStore`: reads (and, for the API, writes) automations
/// - `ExecutionStore`: run records, created once and updated once per run
/// - `AlertStore`: failure notifications
///
/// `SqliteStore` is the production backend; `MemoryStore` keeps everything in
/// process for tests and embedding.

use crate::flow::Automation;
use anyhow::Result;
use async_trait::async_trait;

// Record type definitions
pub mod types;

// sqlx-backed SQLite persistence
pub mod sqlite;

// In-process maps behind tokio locks
pub mod memory;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{Alert, ExecutionPayload, ExecutionRecord, ExecutionStatus, ExecutionUpdate};

#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Fetch an automation by id, `None` when it does not exist
    async fn get_automation(&self, id: &str) -> Result<Option<Automation>>;

    /// Insert or replace an automation
    async fn save_automation(&self, automation: &Automation) -> Result<()>;

    /// All automations, optionally restricted to one owner
    async fn list_automations(&self, user_id: Option<&str>) -> Result<Vec<Automation>>;
}

#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Persist a new record and return the id it was stored under
    async fn create_execution(&self, record: &ExecutionRecord) -> Result<String>;

    /// Apply a terminal update; errors if the id is unknown
    async fn update_execution(&self, id: &str, update: &ExecutionUpdate) -> Result<()>;

    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRecord>>;

    /// Run history of one automation, newest `started_at` first
    async fn list_executions(&self, automation_id: &str) -> Result<Vec<ExecutionRecord>>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persist an alert and return its id
    async fn create_alert(&self, alert: &Alert) -> Result<String>;

    /// Alerts raised by one execution, newest `sent_at` first
    async fn list_alerts(&self, execution_id: &str) -> Result<Vec<Alert>>;

    /// Returns false when no alert has that id
    async fn mark_alert_read(&self, id: &str) -> Result<bool>;
}
