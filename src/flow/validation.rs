/// Save-time structural checks for a flow
///
/// Enforced when an automation is saved, never at execution time.

use crate::flow::types::{FlowSchema, NodeKind};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowValidationError {
    #[error("flow needs a trigger")]
    MissingTrigger,

    #[error("flow can only have one trigger (found {count})")]
    MultipleTriggers { count: usize },

    #[error("flow needs at least one output")]
    MissingOutput,

    #[error("node \"{label}\" is not connected")]
    Disconnected { node_id: String, label: String },
}

/// Check a flow against the save-time invariants
///
/// Reports every violation rather than stopping at the first one.
pub fn validate_flow(schema: &FlowSchema) -> Result<(), Vec<FlowValidationError>> {
    let mut errors = Vec::new();

    let triggers = schema.nodes.iter().filter(|node| node.kind == NodeKind::Trigger).count();
    match triggers {
        0 => errors.push(FlowValidationError::MissingTrigger),
        1 => {}
        count => errors.push(FlowValidationError::MultipleTriggers { count }),
    }

    if !schema.nodes.iter().any(|node| node.kind == NodeKind::Output) {
        errors.push(FlowValidationError::MissingOutput);
    }

    let targets: HashSet<&str> = schema.edges.iter().map(|edge| edge.target.as_str()).collect();
    for node in &schema.nodes {
        if node.kind != NodeKind::Trigger && !targets.contains(node.id.as_str()) {
            errors.push(FlowValidationError::Disconnected {
                node_id: node.id.clone(),
                label: node.label().to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> FlowSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_linear_flow_is_valid() {
        let flow = schema(json!({
            "nodes": [
                { "id": "t", "type": "trigger", "data": { "label": "Nova Lead" } },
                { "id": "a", "type": "action", "data": { "label": "Enviar Email" } },
                { "id": "o", "type": "output", "data": { "label": "Salvar no Banco" } }
            ],
            "edges": [
                { "id": "e1", "source": "t", "target": "a" },
                { "id": "e2", "source": "a", "target": "o" }
            ]
        }));

        assert_eq!(validate_flow(&flow), Ok(()));
    }

    #[test]
    fn test_all_violations_reported() {
        let flow = schema(json!({
            "nodes": [
                { "id": "t1", "type": "trigger", "data": { "label": "Webhook" } },
                { "id": "t2", "type": "trigger", "data": { "label": "Agendamento" } },
                { "id": "a", "type": "action", "data": { "label": "Atualizar CRM" } }
            ],
            "edges": []
        }));

        let errors = validate_flow(&flow).unwrap_err();
        assert_eq!(errors, vec![
            FlowValidationError::MultipleTriggers { count: 2 },
            FlowValidationError::MissingOutput,
            FlowValidationError::Disconnected {
                node_id: "a".to_string(),
                label: "Atualizar CRM".to_string(),
            },
        ]);
    }

    #[test]
    fn test_outgoing_edge_alone_does_not_connect() {
        let flow = schema(json!({
            "nodes": [
                { "id": "t", "type": "trigger" },
                { "id": "a", "type": "action", "data": { "label": "Orphan" } },
                { "id": "o", "type": "output" }
            ],
            "edges": [
                { "id": "e1", "source": "a", "target": "o" }
            ]
        }));

        let errors = validate_flow(&flow).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "node \"Orphan\" is not connected");
    }

    #[test]
    fn test_empty_flow() {
        let errors = validate_flow(&FlowSchema::default()).unwrap_err();
        assert_eq!(errors, vec![
            FlowValidationError::MissingTrigger,
            FlowValidationError::MissingOutput,
        ]);
    }
}
