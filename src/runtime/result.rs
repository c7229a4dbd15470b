/// Caller-facing outcome of one automation run

use crate::runtime::context::ExecutionLog;
use crate::store::ExecutionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Execution id (the stored record's id when the create succeeded)
    pub id: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds between start and end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub logs: Vec<ExecutionLog>,
    /// Output snapshot, present only on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Node ids of every "Processing node" entry, in order
    pub fn processed_nodes(&self) -> Vec<&str> {
        self.logs
            .iter()
            .filter(|entry| entry.message.starts_with("Processing node"))
            .filter_map(|entry| entry.node_id.as_deref())
            .collect()
    }
}
