/// Runtime Execution Engine
///
/// This module runs one automation end to end:
/// - Loading the stored schema into a petgraph arena
/// - Processing trigger, action and output nodes
/// - Depth-first walking with short-circuit on the first failure
/// - Recording the run and raising alerts on failure

// Pluggable integration calls and the built-in simulator
pub mod action;

// Failure notifications
pub mod alerts;

// Per-run log buffer and walk state
pub mod context;

// Orchestrator tying a whole run together
pub mod engine;

// Schema loading and validation of its shape
pub mod loader;

// Per-node-type behavior
pub mod processor;

// Persisted execution record bookkeeping
pub mod recorder;

// Caller-facing outcome
pub mod result;

// Depth-first traversal
pub mod walker;

// Re-export main types
pub use action::{ActionRunner, SimulatedActionRunner};
pub use context::{ExecutionLog, LogLevel};
pub use engine::{execute_automation, AutomationExecutor, Backends, ExecutionOptions};
pub use result::ExecutionResult;
