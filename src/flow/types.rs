/// Core flow type definitions
///
/// Defines the persisted automation record and the node/edge graph stored in its
/// `json_schema` column. These types are serialized/deserialized from JSON exactly
/// as the flow editor writes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A persisted automation: metadata plus the raw flow schema
///
/// `json_schema` stays untyped until execution time so that an absent or malformed
/// schema can be reported as a load failure instead of a storage error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    /// Unique automation identifier
    #[serde(default)]
    pub id: String,
    /// Human-readable automation name
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Node/edge graph as written by the editor: `{ "nodes": [...], "edges": [...] }`
    #[serde(default)]
    pub json_schema: Option<Value>,
    /// Owner reference
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Typed view of an automation's `json_schema`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSchema {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// A single node in the flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Unique node identifier within the flow
    pub id: String,
    /// Determines execution behavior
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub data: NodeData,
    /// Editor canvas coordinate, irrelevant to execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl FlowNode {
    pub fn label(&self) -> &str {
        &self.data.label
    }
}

/// Node payload written by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Human-readable description, used in execution logs
    #[serde(default)]
    pub label: String,
    /// Integration-specific settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Node types understood by the execution engine
///
/// The set is closed, but unrecognised type strings still deserialize into
/// `Other` so a flow containing them can be loaded; the node processor reports
/// them as a warning and fails the branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Entry point of a flow; passes the run's input data through
    Trigger,
    /// Call to an external system through the action runner
    Action,
    /// Terminal step of a branch
    Output,
    /// Anything else found in a stored schema
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Action => "action",
            NodeKind::Output => "output",
            NodeKind::Other(raw) => raw,
        }
    }
}

impl From<String> for NodeKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "trigger" => NodeKind::Trigger,
            "action" => NodeKind::Action,
            "output" => NodeKind::Output,
            _ => NodeKind::Other(raw),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed connection between two nodes; always followed unconditionally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    #[serde(default)]
    pub id: String,
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
}
