/// Autoflow: automation flow execution engine
///
/// Runs user-defined automations (a trigger, actions and outputs wired into a
/// directed graph), records every run and raises an alert when one fails.

// Core configuration and setup
pub mod config;

// Typed engine errors
pub mod error;

// Flow data model, graph arena and save-time validation
pub mod flow;

// Persistence traits with SQLite and in-memory backends
pub mod store;

// Execution engine - loading, walking and recording a run
pub mod runtime;

// HTTP API layer - automation management, execution and alert endpoints
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use error::{ExecutionError, LoadError};
pub use flow::{Automation, FlowEdge, FlowNode, FlowSchema, NodeKind};
pub use runtime::{execute_automation, AutomationExecutor, Backends, ExecutionOptions, ExecutionResult};
pub use server::start_server;
