/// HTTP API Layer
///
/// This module provides the REST API endpoints around the execution engine:
/// - Automation save/list/get with save-time flow validation
/// - Synchronous execution returning the run result
/// - Execution history and alert reads

// Automation management and execution endpoints
pub mod automations;

// Alert endpoints
pub mod executions;

// Re-export router builders
pub use automations::{create_automation_routes, AppState};
pub use executions::create_execution_routes;
