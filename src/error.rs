/// Error types for the execution engine
///
/// Every failure inside a run is resolved into one of these variants and then
/// converted into a `failed` result; none of them escape `execute()`.

use thiserror::Error;

/// Why a flow could not be materialized from storage
#[derive(Debug, Error)]
pub enum LoadError {
    /// The flow store itself failed (connection, decoding, ...)
    #[error("Failed to load automation: {0}")]
    Store(#[source] anyhow::Error),

    /// No automation with that id, or it has no schema
    #[error("Automation not found or schema is empty")]
    NotFound,

    /// Schema present but not `{ nodes: [...], edges: [...] }`
    #[error("Invalid automation schema format: {0}")]
    InvalidSchema(String),
}

/// Terminal failure of one automation run
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("No trigger node found in the automation")]
    NoTrigger,

    #[error("Trigger node failed: {0}")]
    TriggerFailed(String),

    #[error("{message}")]
    NodeFailed { node_id: String, message: String },

    #[error("Cycle detected at node {node_id}")]
    CycleDetected { node_id: String },

    #[error("Step budget of {limit} nodes exceeded")]
    StepBudgetExceeded { limit: usize },

    #[error("Run exceeded its time budget of {limit_ms} ms")]
    TimedOut { limit_ms: u64 },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl ExecutionError {
    /// Message of the alert raised for this failure
    pub fn alert_message(&self) -> String {
        match self {
            ExecutionError::Load(_) => "Failed to load automation".to_string(),
            ExecutionError::NoTrigger => "No trigger node found in the automation".to_string(),
            ExecutionError::TriggerFailed(_) => "Automation trigger failed".to_string(),
            ExecutionError::NodeFailed { .. }
            | ExecutionError::CycleDetected { .. }
            | ExecutionError::StepBudgetExceeded { .. }
            | ExecutionError::TimedOut { .. } => {
                format!("Automation execution failed: {}", self)
            }
            ExecutionError::Unexpected(_) => {
                "Automation execution failed with an unhandled error".to_string()
            }
        }
    }

    /// Failures raised while walking past the trigger
    pub fn is_walk_failure(&self) -> bool {
        matches!(
            self,
            ExecutionError::NodeFailed { .. }
                | ExecutionError::CycleDetected { .. }
                | ExecutionError::StepBudgetExceeded { .. }
                | ExecutionError::TimedOut { .. }
        )
    }
}
