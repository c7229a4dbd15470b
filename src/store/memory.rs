/// In-process store for tests and embedding

use crate::flow::Automation;
use crate::store::types::{Alert, ExecutionRecord, ExecutionUpdate};
use crate::store::{AlertStore, ExecutionStore, FlowStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    automations: RwLock<HashMap<String, Automation>>,
    /// Insertion-ordered run records
    executions: RwLock<Vec<ExecutionRecord>>,
    /// Insertion-ordered alerts
    alerts: RwLock<Vec<Alert>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every alert raised so far, oldest first
    pub async fn all_alerts(&self) -> Vec<Alert> {
        self.alerts.read().await.clone()
    }
}

#[async_trait]
impl FlowStore for MemoryStore {
    async fn get_automation(&self, id: &str) -> Result<Option<Automation>> {
        Ok(self.automations.read().await.get(id).cloned())
    }

    async fn save_automation(&self, automation: &Automation) -> Result<()> {
        self.automations
            .write()
            .await
            .insert(automation.id.clone(), automation.clone());
        Ok(())
    }

    async fn list_automations(&self, user_id: Option<&str>) -> Result<Vec<Automation>> {
        let mut automations: Vec<Automation> = self
            .automations
            .read()
            .await
            .values()
            .filter(|a| user_id.is_none() || a.user_id.as_deref() == user_id)
            .cloned()
            .collect();
        automations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(automations)
    }
}

#[async_trait]
impl ExecutionStore for MemoryStore {
    async fn create_execution(&self, record: &ExecutionRecord) -> Result<String> {
        let mut executions = self.executions.write().await;
        if executions.iter().any(|existing| existing.id == record.id) {
            return Err(anyhow::anyhow!("Execution already exists: {}", record.id));
        }
        executions.push(record.clone());
        Ok(record.id.clone())
    }

    async fn update_execution(&self, id: &str, update: &ExecutionUpdate) -> Result<()> {
        let mut executions = self.executions.write().await;
        let record = executions
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| anyhow::anyhow!("Execution not found: {}", id))?;
        record.apply(update);
        Ok(())
    }

    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRecord>> {
        Ok(self
            .executions
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn list_executions(&self, automation_id: &str) -> Result<Vec<ExecutionRecord>> {
        let mut history: Vec<ExecutionRecord> = self
            .executions
            .read()
            .await
            .iter()
            .filter(|record| record.automation_id == automation_id)
            .cloned()
            .collect();
        // equal timestamps: most recently inserted first
        history.sort_by_key(|record| record.started_at);
        history.reverse();
        Ok(history)
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn create_alert(&self, alert: &Alert) -> Result<String> {
        self.alerts.write().await.push(alert.clone());
        Ok(alert.id.clone())
    }

    async fn list_alerts(&self, execution_id: &str) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .read()
            .await
            .iter()
            .filter(|alert| alert.execution_id == execution_id)
            .cloned()
            .collect();
        alerts.sort_by_key(|alert| alert.sent_at);
        alerts.reverse();
        Ok(alerts)
    }

    async fn mark_alert_read(&self, id: &str) -> Result<bool> {
        let mut alerts = self.alerts.write().await;
        match alerts.iter_mut().find(|alert| alert.id == id) {
            Some(alert) => {
                alert.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
