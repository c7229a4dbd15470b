/// Flow loader
///
/// Fetches an automation and materializes its `json_schema` into a typed
/// `FlowSchema`. A single implicit schema shape is assumed: an object with a
/// `nodes` array and an `edges` array.

use crate::error::LoadError;
use crate::flow::FlowSchema;
use crate::store::FlowStore;
use serde_json::Value;

/// A flow ready to be turned into a graph
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFlow {
    pub name: String,
    pub schema: FlowSchema,
}

pub async fn load_flow(store: &dyn FlowStore, automation_id: &str) -> Result<LoadedFlow, LoadError> {
    tracing::debug!("🔍 Loading automation: {}", automation_id);

    let automation = store
        .get_automation(automation_id)
        .await
        .map_err(LoadError::Store)?
        .ok_or(LoadError::NotFound)?;

    let raw_schema = match automation.json_schema {
        None | Some(Value::Null) => return Err(LoadError::NotFound),
        Some(raw) => raw,
    };

    let schema = parse_schema(raw_schema)?;
    tracing::debug!("📦 Loaded '{}' with {} nodes and {} edges",
        automation.name, schema.nodes.len(), schema.edges.len());

    Ok(LoadedFlow {
        name: automation.name,
        schema,
    })
}

fn parse_schema(raw: Value) -> Result<FlowSchema, LoadError> {
    let object = raw
        .as_object()
        .ok_or_else(|| LoadError::InvalidSchema("schema is not an object".to_string()))?;

    for key in ["nodes", "edges"] {
        if !object.get(key).is_some_and(Value::is_array) {
            return Err(LoadError::InvalidSchema(format!("missing '{}' array", key)));
        }
    }

    serde_json::from_value(raw).map_err(|e| LoadError::InvalidSchema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Automation;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn store_with(schema: Option<Value>) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .save_automation(&Automation {
                id: "a1".to_string(),
                name: "Lead follow-up".to_string(),
                description: None,
                is_active: true,
                json_schema: schema,
                user_id: None,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_load_valid_schema() {
        let store = store_with(Some(json!({
            "nodes": [{ "id": "t", "type": "trigger", "data": { "label": "Webhook" } }],
            "edges": []
        })))
        .await;

        let flow = load_flow(&store, "a1").await.unwrap();
        assert_eq!(flow.name, "Lead follow-up");
        assert_eq!(flow.schema.nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let store = store_with(Some(json!({
            "nodes": [
                { "id": "t", "type": "trigger" },
                { "id": "o", "type": "output" }
            ],
            "edges": [{ "id": "e", "source": "t", "target": "o" }]
        })))
        .await;

        let first = load_flow(&store, "a1").await.unwrap();
        let second = load_flow(&store, "a1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_automation() {
        let store = MemoryStore::new();
        assert!(matches!(load_flow(&store, "nope").await, Err(LoadError::NotFound)));
    }

    #[tokio::test]
    async fn test_missing_schema() {
        let store = store_with(None).await;
        assert!(matches!(load_flow(&store, "a1").await, Err(LoadError::NotFound)));
    }

    #[tokio::test]
    async fn test_schema_without_edges() {
        let store = store_with(Some(json!({ "nodes": [] }))).await;
        let err = load_flow(&store, "a1").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid automation schema format: missing 'edges' array");
    }

    #[tokio::test]
    async fn test_schema_with_non_array_nodes() {
        let store = store_with(Some(json!({ "nodes": {}, "edges": [] }))).await;
        assert!(matches!(load_flow(&store, "a1").await, Err(LoadError::InvalidSchema(_))));
    }

    #[tokio::test]
    async fn test_schema_with_malformed_node() {
        let store = store_with(Some(json!({ "nodes": [{ "type": "trigger" }], "edges": [] }))).await;
        assert!(matches!(load_flow(&store, "a1").await, Err(LoadError::InvalidSchema(_))));
    }
}
