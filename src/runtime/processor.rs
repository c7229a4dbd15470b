/// Node execution handlers for the three flow node types
///
/// This module contains the execution logic for each node type:
/// - trigger: pass-through of the run's input data
/// - action: delegated to the configured `ActionRunner`
/// - output: logs the data that reached the end of the branch
///
/// Failures are returned as data (`NodeOutcome::Failed`), never as errors.

use crate::flow::{FlowNode, NodeKind};
use crate::runtime::action::ActionRunner;
use crate::runtime::context::{ExecutionLog, ExecutionLogger, LogLevel};
use futures::FutureExt;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Result of executing a single node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    /// Output flows to the node's successors
    Completed { output: Value },
    /// The branch, and with it the run, stops here
    Failed { error: String },
}

impl NodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, NodeOutcome::Completed { .. })
    }
}

/// Dispatches a node to the handler for its type
pub struct NodeProcessor {
    actions: Arc<dyn ActionRunner>,
}

impl NodeProcessor {
    pub fn new(actions: Arc<dyn ActionRunner>) -> Self {
        Self { actions }
    }

    /// Execute one node with the data produced by its predecessor
    pub async fn process(&self, node: &FlowNode, input: Value, log: &mut ExecutionLogger) -> NodeOutcome {
        log.push(
            ExecutionLog::new(LogLevel::Info, format!("Processing node: {}", node.label()))
                .with_node(&node.id),
        );
        let start_time = std::time::Instant::now();

        let outcome = match &node.kind {
            NodeKind::Trigger => {
                log.push(
                    ExecutionLog::new(LogLevel::Info, format!("Trigger activated: {}", node.label()))
                        .with_node(&node.id),
                );
                let output = if input.is_null() { json!({}) } else { input };
                NodeOutcome::Completed { output }
            }
            NodeKind::Action => self.execute_action(node, input, log).await,
            NodeKind::Output => {
                log.push(
                    ExecutionLog::new(LogLevel::Info, format!("Output reached: {}", node.label()))
                        .with_node(&node.id)
                        .with_details(input.clone()),
                );
                NodeOutcome::Completed { output: input }
            }
            NodeKind::Other(raw) => {
                log.push(
                    ExecutionLog::new(LogLevel::Warning, format!("Unknown node type: {}", raw))
                        .with_node(&node.id),
                );
                NodeOutcome::Failed { error: "Unknown node type".to_string() }
            }
        };

        tracing::debug!("⏱️ Node '{}' ({}) finished in {:?} - success: {}",
            node.id, node.kind, start_time.elapsed(), outcome.is_success());

        outcome
    }

    async fn execute_action(&self, node: &FlowNode, input: Value, log: &mut ExecutionLogger) -> NodeOutcome {
        log.push(
            ExecutionLog::new(LogLevel::Info, format!("Executing action: {}", node.label()))
                .with_node(&node.id)
                .with_details(json!({ "input": input })),
        );

        // a panicking runner fails the node instead of unwinding out of the run
        let result = match AssertUnwindSafe(self.actions.run(node, &input)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log.push(
                    ExecutionLog::new(
                        LogLevel::Error,
                        format!("Error processing node {}: {}", node.id, message),
                    )
                    .with_node(&node.id),
                );
                return NodeOutcome::Failed { error: message };
            }
        };

        match result {
            Ok(output) => {
                log.push(
                    ExecutionLog::new(
                        LogLevel::Info,
                        format!("Action completed successfully: {}", node.label()),
                    )
                    .with_node(&node.id),
                );
                NodeOutcome::Completed { output }
            }
            Err(error) => {
                log.push(ExecutionLog::new(LogLevel::Error, error.clone()).with_node(&node.id));
                NodeOutcome::Failed { error }
            }
        }
    }
}

/// Text of a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::NodeData;
    use async_trait::async_trait;

    struct EchoRunner;

    #[async_trait]
    impl ActionRunner for EchoRunner {
        async fn run(&self, _node: &FlowNode, input: &Value) -> Result<Value, String> {
            Ok(json!({ "echo": input }))
        }
    }

    struct RefusingRunner;

    #[async_trait]
    impl ActionRunner for RefusingRunner {
        async fn run(&self, node: &FlowNode, _input: &Value) -> Result<Value, String> {
            Err(format!("Action failed: {}", node.label()))
        }
    }

    struct BrokenRunner;

    #[async_trait]
    impl ActionRunner for BrokenRunner {
        async fn run(&self, _node: &FlowNode, _input: &Value) -> Result<Value, String> {
            panic!("integration bug");
        }
    }

    fn node(id: &str, kind: NodeKind) -> FlowNode {
        FlowNode {
            id: id.to_string(),
            kind,
            data: NodeData { label: format!("{} label", id), config: None },
            position: None,
        }
    }

    #[tokio::test]
    async fn test_trigger_defaults_to_empty_object() {
        let processor = NodeProcessor::new(Arc::new(EchoRunner));
        let mut log = ExecutionLogger::new("exec");

        let outcome = processor.process(&node("t", NodeKind::Trigger), Value::Null, &mut log).await;

        assert_eq!(outcome, NodeOutcome::Completed { output: json!({}) });
        let messages: Vec<&str> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["Processing node: t label", "Trigger activated: t label"]);
    }

    #[tokio::test]
    async fn test_trigger_passes_input_through() {
        let processor = NodeProcessor::new(Arc::new(EchoRunner));
        let mut log = ExecutionLogger::new("exec");

        let outcome = processor
            .process(&node("t", NodeKind::Trigger), json!({ "lead": 7 }), &mut log)
            .await;

        assert_eq!(outcome, NodeOutcome::Completed { output: json!({ "lead": 7 }) });
    }

    #[tokio::test]
    async fn test_action_uses_runner_output() {
        let processor = NodeProcessor::new(Arc::new(EchoRunner));
        let mut log = ExecutionLogger::new("exec");

        let outcome = processor.process(&node("a", NodeKind::Action), json!(1), &mut log).await;

        assert_eq!(outcome, NodeOutcome::Completed { output: json!({ "echo": 1 }) });
        assert_eq!(log.entries()[1].details, Some(json!({ "input": 1 })));
        assert_eq!(log.entries()[2].message, "Action completed successfully: a label");
    }

    #[tokio::test]
    async fn test_action_failure_is_logged_as_error() {
        let processor = NodeProcessor::new(Arc::new(RefusingRunner));
        let mut log = ExecutionLogger::new("exec");

        let outcome = processor.process(&node("a", NodeKind::Action), json!({}), &mut log).await;

        assert_eq!(outcome, NodeOutcome::Failed { error: "Action failed: a label".to_string() });
        let last = log.entries().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.node_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_output_is_unchanged_input() {
        let processor = NodeProcessor::new(Arc::new(EchoRunner));
        let mut log = ExecutionLogger::new("exec");
        let data = json!({ "processed": true });

        let outcome = processor.process(&node("o", NodeKind::Output), data.clone(), &mut log).await;

        assert_eq!(outcome, NodeOutcome::Completed { output: data.clone() });
        assert_eq!(log.entries()[1].details, Some(data));
    }

    #[tokio::test]
    async fn test_unknown_type_warns_and_fails() {
        let processor = NodeProcessor::new(Arc::new(EchoRunner));
        let mut log = ExecutionLogger::new("exec");

        let outcome = processor
            .process(&node("x", NodeKind::Other("foo".into())), json!({}), &mut log)
            .await;

        assert!(!outcome.is_success());
        let last = log.entries().last().unwrap();
        assert_eq!(last.level, LogLevel::Warning);
        assert_eq!(last.message, "Unknown node type: foo");
    }

    #[tokio::test]
    async fn test_panicking_runner_fails_the_node() {
        let processor = NodeProcessor::new(Arc::new(BrokenRunner));
        let mut log = ExecutionLogger::new("exec");

        let outcome = processor.process(&node("a", NodeKind::Action), json!({}), &mut log).await;

        assert_eq!(outcome, NodeOutcome::Failed { error: "integration bug".to_string() });
        let last = log.entries().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.message, "Error processing node a: integration bug");
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
