/// Persisted run and alert records

use crate::runtime::context::{now_millis, ExecutionLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "running" => Ok(ExecutionStatus::Running),
            "success" => Ok(ExecutionStatus::Success),
            "failed" => Ok(ExecutionStatus::Failed),
            other => Err(anyhow::anyhow!("Unknown execution status: {}", other)),
        }
    }
}

/// Snapshot stored in the record's `result` column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPayload {
    pub logs: Vec<ExecutionLog>,
    pub output: Option<Value>,
}

/// One persisted run of an automation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub automation_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub result: ExecutionPayload,
}

/// Terminal write applied to an existing record
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionUpdate {
    pub status: ExecutionStatus,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub result: ExecutionPayload,
}

impl ExecutionRecord {
    /// Apply a terminal update in place
    pub fn apply(&mut self, update: &ExecutionUpdate) {
        self.status = update.status;
        self.finished_at = Some(update.finished_at);
        self.duration_ms = Some(update.duration_ms);
        self.result = update.result.clone();
    }
}

/// Failure notification attached to an execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub execution_id: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Alert {
    /// New unread error alert for an execution
    pub fn error(execution_id: &str, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type: "error".to_string(),
            message: message.into(),
            execution_id: execution_id.to_string(),
            sent_at: now_millis(),
            is_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        for status in [ExecutionStatus::Running, ExecutionStatus::Success, ExecutionStatus::Failed] {
            assert_eq!(status.as_str().parse::<ExecutionStatus>().unwrap(), status);
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        assert!("cancelled".parse::<ExecutionStatus>().is_err());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
    }

    #[test]
    fn test_error_alert_is_unread() {
        let alert = Alert::error("exec-1", "Failed to load automation");

        assert_eq!(alert.alert_type, "error");
        assert_eq!(alert.execution_id, "exec-1");
        assert!(!alert.is_read);
        assert_eq!(alert.sent_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(serde_json::to_value(&alert).unwrap()["type"], "error");
    }
}
