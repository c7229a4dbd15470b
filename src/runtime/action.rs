/// Action runners: the integration boundary of `action` nodes
///
/// The node processor hands every action node to an `ActionRunner`. The
/// production default is `SimulatedActionRunner`, a stand-in for an external
/// automation platform call; real integrations implement the same trait.

use crate::config::{sanitize_success_rate, ExecutorConfig};
use crate::flow::FlowNode;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

/// Executes the side effect of one action node
///
/// `Ok` carries the data forwarded to the node's successors; `Err` carries the
/// failure message recorded for the run.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn run(&self, node: &FlowNode, input: &Value) -> Result<Value, String>;
}

/// Simulated integration call
///
/// Sleeps for the configured delay, then succeeds with the configured
/// probability. On success the input is forwarded with `processed: true` and a
/// `timestamp`; a non-object input is wrapped as `{ "input": ... }` first.
#[derive(Debug)]
pub struct SimulatedActionRunner {
    delay: Duration,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedActionRunner {
    pub fn new(delay: Duration, success_rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            delay,
            success_rate: sanitize_success_rate(success_rate),
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.action_delay(), config.action_success_rate, config.action_seed)
    }

    fn roll(&self) -> bool {
        match self.rng.lock() {
            Ok(mut rng) => rng.random_bool(self.success_rate),
            // a poisoned lock still holds a usable generator
            Err(poisoned) => poisoned.into_inner().random_bool(self.success_rate),
        }
    }
}

#[async_trait]
impl ActionRunner for SimulatedActionRunner {
    async fn run(&self, node: &FlowNode, input: &Value) -> Result<Value, String> {
        tokio::time::sleep(self.delay).await;

        if !self.roll() {
            return Err(format!("Action failed: {}", node.label()));
        }

        let mut output = match input {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("input".to_string(), other.clone());
                map
            }
        };
        output.insert("processed".to_string(), json!(true));
        output.insert("timestamp".to_string(), json!(chrono::Utc::now().to_rfc3339()));
        Ok(Value::Object(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{NodeData, NodeKind};

    fn action(label: &str) -> FlowNode {
        FlowNode {
            id: "a".to_string(),
            kind: NodeKind::Action,
            data: NodeData { label: label.to_string(), config: None },
            position: None,
        }
    }

    #[tokio::test]
    async fn test_success_merges_input() {
        let runner = SimulatedActionRunner::new(Duration::ZERO, 1.0, None);
        let output = runner
            .run(&action("Enviar Email"), &json!({ "lead": "ana@example.com" }))
            .await
            .unwrap();

        assert_eq!(output["lead"], "ana@example.com");
        assert_eq!(output["processed"], true);
        assert!(output["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_non_object_input_is_wrapped() {
        let runner = SimulatedActionRunner::new(Duration::ZERO, 1.0, None);
        let output = runner.run(&action("Notificação"), &json!([1, 2])).await.unwrap();

        assert_eq!(output["input"], json!([1, 2]));
        assert_eq!(output["processed"], true);
    }

    #[tokio::test]
    async fn test_zero_success_rate_always_fails() {
        let runner = SimulatedActionRunner::new(Duration::ZERO, 0.0, Some(1));
        let err = runner.run(&action("Atualizar CRM"), &json!({})).await.unwrap_err();

        assert_eq!(err, "Action failed: Atualizar CRM");
    }

    #[tokio::test]
    async fn test_same_seed_same_outcomes() {
        let outcomes = |seed| async move {
            let runner = SimulatedActionRunner::new(Duration::ZERO, 0.5, Some(seed));
            let mut results = Vec::new();
            for _ in 0..16 {
                results.push(runner.run(&action("x"), &json!({})).await.is_ok());
            }
            results
        };

        assert_eq!(outcomes(42).await, outcomes(42).await);
    }

    #[test]
    fn test_success_rate_is_clamped() {
        let runner = SimulatedActionRunner::new(Duration::ZERO, 7.5, None);
        assert_eq!(runner.success_rate, 1.0);
    }

    #[tokio::test]
    async fn test_nan_success_rate_falls_back_to_default() {
        let runner = SimulatedActionRunner::new(Duration::ZERO, f64::NAN, Some(1));
        assert_eq!(runner.success_rate, crate::config::DEFAULT_ACTION_SUCCESS_RATE);

        // rolls without panicking
        for _ in 0..8 {
            let _ = runner.run(&action("Enviar Email"), &json!({})).await;
        }
    }
}
