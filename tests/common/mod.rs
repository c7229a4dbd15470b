//! Shared fixtures for the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use autoflow::config::ExecutorConfig;
use autoflow::runtime::{ActionRunner, Backends};
use autoflow::store::{
    Alert, AlertStore, ExecutionRecord, ExecutionStore, ExecutionUpdate, FlowStore, MemoryStore,
};
use autoflow::{Automation, FlowNode};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Deterministic action runner: succeeds unless the node id is listed in `fail_on`
///
/// Every call is recorded with the input it received.
#[derive(Default)]
pub struct ScriptedRunner {
    fail_on: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedRunner {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            fail_on: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionRunner for ScriptedRunner {
    async fn run(&self, node: &FlowNode, input: &Value) -> Result<Value, String> {
        self.calls.lock().unwrap().push((node.id.clone(), input.clone()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_on.contains(&node.id) {
            return Err(format!("Action failed: {}", node.label()));
        }
        Ok(json!({ "from": node.id, "input": input }))
    }
}

/// Action runner with a bug: every call panics
pub struct PanickingRunner;

#[async_trait]
impl ActionRunner for PanickingRunner {
    async fn run(&self, _node: &FlowNode, _input: &Value) -> Result<Value, String> {
        panic!("integration bug");
    }
}

/// Flow store whose lookups panic
pub struct PanickingFlowStore;

#[async_trait]
impl FlowStore for PanickingFlowStore {
    async fn get_automation(&self, _id: &str) -> Result<Option<Automation>> {
        panic!("flow store bug");
    }

    async fn save_automation(&self, _automation: &Automation) -> Result<()> {
        Ok(())
    }

    async fn list_automations(&self, _user_id: Option<&str>) -> Result<Vec<Automation>> {
        Ok(Vec::new())
    }
}

/// Execution store whose every write fails
pub struct BrokenExecutionStore;

#[async_trait]
impl ExecutionStore for BrokenExecutionStore {
    async fn create_execution(&self, _record: &ExecutionRecord) -> Result<String> {
        Err(anyhow!("database is locked"))
    }

    async fn update_execution(&self, _id: &str, _update: &ExecutionUpdate) -> Result<()> {
        Err(anyhow!("database is locked"))
    }

    async fn get_execution(&self, _id: &str) -> Result<Option<ExecutionRecord>> {
        Ok(None)
    }

    async fn list_executions(&self, _automation_id: &str) -> Result<Vec<ExecutionRecord>> {
        Ok(Vec::new())
    }
}

/// Alert store whose every write fails
pub struct BrokenAlertStore;

#[async_trait]
impl AlertStore for BrokenAlertStore {
    async fn create_alert(&self, _alert: &Alert) -> Result<String> {
        Err(anyhow!("alerts table missing"))
    }

    async fn list_alerts(&self, _execution_id: &str) -> Result<Vec<Alert>> {
        Ok(Vec::new())
    }

    async fn mark_alert_read(&self, _id: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Flow store that cannot be reached
pub struct UnreachableFlowStore;

#[async_trait]
impl FlowStore for UnreachableFlowStore {
    async fn get_automation(&self, _id: &str) -> Result<Option<Automation>> {
        Err(anyhow!("connection refused"))
    }

    async fn save_automation(&self, _automation: &Automation) -> Result<()> {
        Err(anyhow!("connection refused"))
    }

    async fn list_automations(&self, _user_id: Option<&str>) -> Result<Vec<Automation>> {
        Err(anyhow!("connection refused"))
    }
}

pub fn config() -> ExecutorConfig {
    ExecutorConfig {
        action_delay_ms: 0,
        action_success_rate: 1.0,
        action_seed: Some(42),
        max_steps: Some(1_000),
        max_run_ms: None,
    }
}

pub fn node(id: &str, kind: &str, label: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "data": { "label": label },
        "position": { "x": 0.0, "y": 0.0 }
    })
}

pub fn edge(source: &str, target: &str) -> Value {
    json!({ "id": format!("{}-{}", source, target), "source": source, "target": target })
}

pub fn schema(nodes: Vec<Value>, edges: Vec<Value>) -> Value {
    json!({ "nodes": nodes, "edges": edges })
}

pub fn automation(id: &str, json_schema: Option<Value>) -> Automation {
    Automation {
        id: id.to_string(),
        name: format!("Automation {}", id),
        description: None,
        is_active: true,
        json_schema,
        user_id: Some("user-1".to_string()),
    }
}

/// A memory store holding one automation, plus backends over it
pub async fn seeded(
    id: &str,
    json_schema: Option<Value>,
    runner: Arc<ScriptedRunner>,
) -> (Arc<MemoryStore>, Backends) {
    let store = Arc::new(MemoryStore::new());
    store.save_automation(&automation(id, json_schema)).await.unwrap();
    let backends = Backends::with_store(store.clone(), runner);
    (store, backends)
}
