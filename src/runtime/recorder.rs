/// Execution record bookkeeping
///
/// The recorder owns the persisted view of a run: one `create` in `running`
/// state before any node executes, one terminal `update` at the end. Both go
/// through `best_effort`, so a storage failure is logged and the run goes on.

use crate::runtime::context::ExecutionLog;
use crate::store::{ExecutionPayload, ExecutionRecord, ExecutionStatus, ExecutionStore, ExecutionUpdate};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Await a bookkeeping write whose failure must not affect the run
///
/// Errors are reported through `tracing` and turned into `None`.
pub async fn best_effort<T, F>(what: &str, write: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match write.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("❌ Failed to {}: {:#}", what, e);
            None
        }
    }
}

pub struct ExecutionRecorder {
    store: Arc<dyn ExecutionStore>,
    automation_id: String,
    started_at: DateTime<Utc>,
}

impl ExecutionRecorder {
    pub fn new(store: Arc<dyn ExecutionStore>, automation_id: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            store,
            automation_id: automation_id.to_string(),
            started_at,
        }
    }

    /// Write the initial `running` record; returns the stored id, or `None` if the write failed
    pub async fn create(&self, execution_id: &str, logs: &[ExecutionLog]) -> Option<String> {
        let record = ExecutionRecord {
            id: execution_id.to_string(),
            automation_id: self.automation_id.clone(),
            status: ExecutionStatus::Running,
            started_at: self.started_at,
            finished_at: None,
            duration_ms: None,
            result: ExecutionPayload {
                logs: logs.to_vec(),
                output: None,
            },
        };

        best_effort("create execution record", self.store.create_execution(&record)).await
    }

    /// Write the terminal state; `output` is only kept for successful runs
    pub async fn update(
        &self,
        execution_id: &str,
        status: ExecutionStatus,
        finished_at: DateTime<Utc>,
        logs: &[ExecutionLog],
        output: Option<Value>,
    ) -> bool {
        if !status.is_terminal() {
            tracing::error!("❌ Refusing to finish execution {} with non-terminal status {}", execution_id, status);
            return false;
        }

        let update = ExecutionUpdate {
            status,
            finished_at,
            duration_ms: duration_ms(self.started_at, finished_at),
            result: ExecutionPayload {
                logs: logs.to_vec(),
                output: if status == ExecutionStatus::Success { output } else { None },
            },
        };

        best_effort(
            "update execution record",
            self.store.update_execution(execution_id, &update),
        )
        .await
        .is_some()
    }
}

pub fn duration_ms(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> i64 {
    (finished_at - started_at).num_milliseconds()
}
