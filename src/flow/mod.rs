/// Flow Model Layer
///
/// This module holds everything about the shape of an automation:
/// - Type definitions (Automation, FlowSchema, FlowNode, FlowEdge)
/// - The id-indexed graph arena used by the walker
/// - Save-time structural validation

// Core flow type definitions
pub mod types;

// petgraph arena with ordered successor lookup
pub mod graph;

// Save-time invariants (one trigger, at least one output, connected nodes)
pub mod validation;

// Re-export commonly used types
pub use graph::FlowGraph;
pub use types::{Automation, FlowEdge, FlowNode, FlowSchema, NodeData, NodeKind, Position};
pub use validation::{validate_flow, FlowValidationError};
