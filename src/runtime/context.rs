/// Per-run state: the append-only execution log and the walk bookkeeping
///
/// A `RunContext` is owned by exactly one executor for exactly one run and is
/// threaded by `&mut` through the walker and node processor.

use chrono::{DateTime, SubsecRound, Utc};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Wall-clock now, truncated to the millisecond precision records are stored with
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// One entry of a run's log, persisted inside the execution record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLog {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ExecutionLog {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            node_id: None,
            details: None,
        }
    }

    pub fn with_node(mut self, node_id: &str) -> Self {
        self.node_id = Some(node_id.to_string());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Append-only log sequence for one execution
///
/// Every entry is mirrored to `tracing` at the matching level.
#[derive(Debug, Clone)]
pub struct ExecutionLogger {
    execution_id: String,
    entries: Vec<ExecutionLog>,
}

impl ExecutionLogger {
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            entries: Vec::new(),
        }
    }

    /// Re-tag subsequent tracing output after the store assigned the run its id
    pub fn set_execution_id(&mut self, execution_id: impl Into<String>) {
        self.execution_id = execution_id.into();
    }

    pub fn push(&mut self, entry: ExecutionLog) {
        let node_id = entry.node_id.as_deref().unwrap_or("-");
        match entry.level {
            LogLevel::Info => tracing::info!(
                execution_id = %self.execution_id, node_id, "{}", entry.message),
            LogLevel::Warning => tracing::warn!(
                execution_id = %self.execution_id, node_id, "{}", entry.message),
            LogLevel::Error => tracing::error!(
                execution_id = %self.execution_id, node_id, "{}", entry.message),
        }
        self.entries.push(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ExecutionLog::new(LogLevel::Info, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ExecutionLog::new(LogLevel::Error, message));
    }

    pub fn entries(&self) -> &[ExecutionLog] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ExecutionLog> {
        self.entries
    }
}

/// Mutable state of one walk
#[derive(Debug)]
pub struct RunContext {
    pub log: ExecutionLogger,
    /// Nodes on the current depth-first path; re-entering one is a cycle
    path: HashSet<NodeIndex>,
    /// Nodes processed by the walker so far
    steps: usize,
}

impl RunContext {
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            log: ExecutionLogger::new(execution_id),
            path: HashSet::new(),
            steps: 0,
        }
    }

    pub fn on_path(&self, node: NodeIndex) -> bool {
        self.path.contains(&node)
    }

    pub fn enter(&mut self, node: NodeIndex) {
        self.path.insert(node);
    }

    pub fn leave(&mut self, node: NodeIndex) {
        self.path.remove(&node);
    }

    /// Count one more processed node and return the new total
    pub fn step(&mut self) -> usize {
        self.steps += 1;
        self.steps
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}
