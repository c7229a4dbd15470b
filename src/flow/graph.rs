/// Id-indexed flow graph built once per run
///
/// Converts a `FlowSchema` into a petgraph arena so successor lookup during the
/// walk is an adjacency read instead of a scan over the edge list.

use crate::flow::types::{FlowNode, FlowSchema, NodeKind};
use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Flow graph arena
///
/// Node indices follow the order of `schema.nodes`; each edge carries its
/// position in `schema.edges` so successors come back in editor order.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    graph: DiGraph<FlowNode, usize>,
    node_id_to_index: HashMap<String, NodeIndex>,
}

impl FlowGraph {
    /// Build the arena from a loaded schema
    ///
    /// Edges whose source or target is not a known node are dropped.
    /// Fails when two nodes share an id, since the arena is keyed by id.
    pub fn build(schema: &FlowSchema) -> Result<Self> {
        tracing::debug!("🏗️ Building flow graph with {} nodes and {} edges",
            schema.nodes.len(), schema.edges.len());

        let mut graph = DiGraph::with_capacity(schema.nodes.len(), schema.edges.len());
        let mut node_id_to_index = HashMap::with_capacity(schema.nodes.len());

        for node in &schema.nodes {
            if node_id_to_index.contains_key(&node.id) {
                return Err(anyhow::anyhow!("Duplicate node id in flow: {}", node.id));
            }
            let index = graph.add_node(node.clone());
            node_id_to_index.insert(node.id.clone(), index);
        }

        for (position, edge) in schema.edges.iter().enumerate() {
            match (node_id_to_index.get(&edge.source), node_id_to_index.get(&edge.target)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, position);
                }
                _ => {
                    tracing::debug!("  ✂️ Dropping dangling edge '{}': {} → {}",
                        edge.id, edge.source, edge.target);
                }
            }
        }

        Ok(Self { graph, node_id_to_index })
    }

    pub fn node(&self, index: NodeIndex) -> &FlowNode {
        &self.graph[index]
    }

    pub fn index_of(&self, node_id: &str) -> Option<NodeIndex> {
        self.node_id_to_index.get(node_id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Direct successors of a node, in the order their edges appear in the schema
    pub fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut outgoing: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect();
        outgoing.sort_by_key(|(position, _)| *position);
        outgoing.into_iter().map(|(_, target)| target).collect()
    }

    /// All trigger nodes in schema order
    pub fn triggers(&self) -> Vec<NodeIndex> {
        self.nodes_of_kind(&NodeKind::Trigger)
    }

    /// All output nodes in schema order
    pub fn outputs(&self) -> Vec<NodeIndex> {
        self.nodes_of_kind(&NodeKind::Output)
    }

    fn nodes_of_kind(&self, kind: &NodeKind) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&index| &self.graph[index].kind == kind)
            .collect()
    }
}
