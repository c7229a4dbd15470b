/// Automation executor: one end-to-end run of a stored flow
///
/// Ties the loader, node processor, walker, recorder and alert emitter
/// together. `execute()` never fails: every error is logged, recorded and
/// turned into a `failed` result.

use crate::config::ExecutorConfig;
use crate::error::ExecutionError;
use crate::flow::FlowGraph;
use crate::runtime::action::ActionRunner;
use crate::runtime::alerts::AlertEmitter;
use crate::runtime::context::{now_millis, ExecutionLog, LogLevel, RunContext};
use crate::runtime::loader::load_flow;
use crate::runtime::processor::{panic_message, NodeOutcome, NodeProcessor};
use crate::runtime::recorder::{duration_ms, ExecutionRecorder};
use crate::runtime::result::ExecutionResult;
use crate::runtime::walker::FlowWalker;
use crate::store::{AlertStore, ExecutionStatus, ExecutionStore, FlowStore};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde_json::{json, Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Input of one run
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    pub automation_id: String,
    pub user_id: Option<String>,
    /// Seed data handed to the trigger; `None` becomes `{}`
    pub input_data: Option<Value>,
}

impl ExecutionOptions {
    pub fn new(automation_id: impl Into<String>) -> Self {
        Self {
            automation_id: automation_id.into(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, input_data: Value) -> Self {
        self.input_data = Some(input_data);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// External collaborators of the executor
#[derive(Clone)]
pub struct Backends {
    pub flows: Arc<dyn FlowStore>,
    pub executions: Arc<dyn ExecutionStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub actions: Arc<dyn ActionRunner>,
}

impl Backends {
    /// Use one store for flows, executions and alerts
    pub fn with_store<S>(store: Arc<S>, actions: Arc<dyn ActionRunner>) -> Self
    where
        S: FlowStore + ExecutionStore + AlertStore + 'static,
    {
        Self {
            flows: store.clone(),
            executions: store.clone(),
            alerts: store,
            actions,
        }
    }
}

pub struct AutomationExecutor {
    options: ExecutionOptions,
    backends: Backends,
    processor: NodeProcessor,
    max_steps: Option<usize>,
    max_run_duration: Option<Duration>,
    execution_id: String,
    started_at: DateTime<Utc>,
    ctx: RunContext,
}

impl AutomationExecutor {
    /// Prepare a run: a fresh execution id and the wall-clock start time
    pub fn new(options: ExecutionOptions, backends: Backends, config: &ExecutorConfig) -> Self {
        let execution_id = uuid::Uuid::new_v4().to_string();
        Self {
            processor: NodeProcessor::new(Arc::clone(&backends.actions)),
            options,
            backends,
            max_steps: config.max_steps,
            max_run_duration: config.max_run_duration(),
            ctx: RunContext::new(execution_id.clone()),
            execution_id,
            started_at: now_millis(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Run the automation to completion
    pub async fn execute(mut self) -> ExecutionResult {
        let recorder = ExecutionRecorder::new(
            Arc::clone(&self.backends.executions),
            &self.options.automation_id,
            self.started_at,
        );
        let alerts = AlertEmitter::new(Arc::clone(&self.backends.alerts));

        // a failed create leaves the locally generated id in place
        if let Some(stored_id) = recorder.create(&self.execution_id, self.ctx.log.entries()).await {
            if stored_id != self.execution_id {
                self.ctx.log.set_execution_id(stored_id.clone());
                self.execution_id = stored_id;
            }
        }

        tracing::info!("🚀 Starting execution {} of automation {} (user: {})",
            self.execution_id,
            self.options.automation_id,
            self.options.user_id.as_deref().unwrap_or("-"));
        self.ctx.log.info("Starting automation execution");

        let outcome = match AssertUnwindSafe(self.run()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(ExecutionError::Unexpected(anyhow::anyhow!(
                "panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        let (status, output, alert) = match outcome {
            Ok(output) => {
                self.ctx.log.info("Automation execution completed successfully");
                (ExecutionStatus::Success, Some(output), None)
            }
            Err(error) => {
                match &error {
                    ExecutionError::Unexpected(e) => {
                        self.ctx.log.error(format!("Unhandled error during execution: {:#}", e));
                    }
                    e if e.is_walk_failure() => self.ctx.log.info("Automation execution failed"),
                    _ => {}
                }
                (ExecutionStatus::Failed, None, Some(error.alert_message()))
            }
        };

        let finished_at = now_millis();
        recorder
            .update(&self.execution_id, status, finished_at, self.ctx.log.entries(), output.clone())
            .await;

        if let Some(message) = alert {
            alerts.emit(&self.execution_id, &message).await;
        }

        let duration = duration_ms(self.started_at, finished_at);
        tracing::info!("🏁 Execution {} finished: {} in {} ms", self.execution_id, status, duration);

        ExecutionResult {
            id: self.execution_id,
            status,
            start_time: self.started_at,
            end_time: Some(finished_at),
            duration: Some(duration),
            logs: self.ctx.log.into_entries(),
            output,
        }
    }

    /// Load, trigger and walk; returns the output snapshot on success
    async fn run(&mut self) -> Result<Value, ExecutionError> {
        let flow = match load_flow(self.backends.flows.as_ref(), &self.options.automation_id).await {
            Ok(flow) => flow,
            Err(e) => {
                self.ctx.log.error(e.to_string());
                return Err(e.into());
            }
        };
        self.ctx.log.info(format!("Loaded automation: {}", flow.name));

        let graph = FlowGraph::build(&flow.schema)?;
        tracing::debug!("🧩 Flow graph ready: {} nodes", graph.node_count());

        let triggers = graph.triggers();
        let trigger = match triggers.first() {
            Some(&trigger) => trigger,
            None => {
                let error = ExecutionError::NoTrigger;
                self.ctx.log.error(error.to_string());
                return Err(error);
            }
        };
        if triggers.len() > 1 {
            self.ctx.log.push(
                ExecutionLog::new(
                    LogLevel::Warning,
                    format!("Multiple trigger nodes found; using the first one: {}", graph.node(trigger).id),
                )
                .with_node(&graph.node(trigger).id),
            );
        }

        let seed = self.options.input_data.clone().unwrap_or(Value::Null);
        let trigger_output = match self.processor.process(graph.node(trigger), seed, &mut self.ctx.log).await {
            NodeOutcome::Completed { output } => output,
            NodeOutcome::Failed { error } => {
                self.ctx.log.push(
                    ExecutionLog::new(LogLevel::Error, "Trigger node failed").with_details(json!(error)),
                );
                return Err(ExecutionError::TriggerFailed(error));
            }
        };

        let walker = FlowWalker::new(&graph, &self.processor, self.max_steps);
        let walk = walker.walk(trigger, trigger_output, &mut self.ctx);
        let walked = match self.max_run_duration {
            Some(limit) => match tokio::time::timeout(limit, walk).await {
                Ok(walked) => walked,
                Err(_) => {
                    let limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    let error = ExecutionError::TimedOut { limit_ms };
                    self.ctx.log.error(error.to_string());
                    Err(error)
                }
            },
            None => walk.await,
        };
        walked?;

        Ok(output_snapshot(&graph))
    }
}

/// Output object of a successful run: output node id → `{ label, executed }`
fn output_snapshot(graph: &FlowGraph) -> Value {
    let outputs = graph.outputs();
    if outputs.is_empty() {
        return json!({ "result": "No output nodes found" });
    }

    let mut snapshot = Map::new();
    for index in outputs {
        let node = graph.node(index);
        snapshot.insert(node.id.clone(), json!({ "label": node.label(), "executed": true }));
    }
    Value::Object(snapshot)
}

/// Run one automation with a fresh executor
pub async fn execute_automation(
    options: ExecutionOptions,
    backends: Backends,
    config: &ExecutorConfig,
) -> ExecutionResult {
    AutomationExecutor::new(options, backends, config).execute().await
}
