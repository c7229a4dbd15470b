/// Depth-first flow walker
///
/// Starting from a node whose output is known, processes every successor and
/// recurses into it with that successor's own output. The first failure stops
/// the whole walk; siblings not yet started never run.

use crate::error::ExecutionError;
use crate::flow::FlowGraph;
use crate::runtime::context::{ExecutionLog, LogLevel, RunContext};
use crate::runtime::processor::{NodeOutcome, NodeProcessor};
use petgraph::graph::NodeIndex;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExecutionError>> + Send + 'a>>;

pub struct FlowWalker<'a> {
    graph: &'a FlowGraph,
    processor: &'a NodeProcessor,
    /// Maximum number of nodes processed past the start node
    max_steps: Option<usize>,
}

impl<'a> FlowWalker<'a> {
    pub fn new(graph: &'a FlowGraph, processor: &'a NodeProcessor, max_steps: Option<usize>) -> Self {
        Self { graph, processor, max_steps }
    }

    /// Walk everything reachable from `start`, seeding its successors with `data`
    ///
    /// A node with no successors ends its branch successfully.
    pub async fn walk(&self, start: NodeIndex, data: Value, ctx: &mut RunContext) -> Result<(), ExecutionError> {
        ctx.enter(start);
        let result = self.walk_from(start, data, ctx).await;
        ctx.leave(start);
        result
    }

    fn walk_from<'b>(&'b self, current: NodeIndex, data: Value, ctx: &'b mut RunContext) -> WalkFuture<'b> {
        Box::pin(async move {
            let successors = self.graph.successors(current);

            for next in successors {
                let node = self.graph.node(next);

                if ctx.on_path(next) {
                    ctx.log.push(
                        ExecutionLog::new(LogLevel::Error, format!("Cycle detected at node: {}", node.id))
                            .with_node(&node.id),
                    );
                    return Err(ExecutionError::CycleDetected { node_id: node.id.clone() });
                }

                let steps = ctx.step();
                if let Some(limit) = self.max_steps {
                    if steps > limit {
                        ctx.log.error(format!("Step budget of {} nodes exceeded", limit));
                        return Err(ExecutionError::StepBudgetExceeded { limit });
                    }
                }

                // siblings share the predecessor's output
                let output = match self.processor.process(node, data.clone(), &mut ctx.log).await {
                    NodeOutcome::Completed { output } => output,
                    NodeOutcome::Failed { error } => {
                        return Err(ExecutionError::NodeFailed {
                            node_id: node.id.clone(),
                            message: error,
                        });
                    }
                };

                ctx.enter(next);
                let result = self.walk_from(next, output, ctx).await;
                ctx.leave(next);
                result?;
            }

            Ok(())
        })
    }
}
