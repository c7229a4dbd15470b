/// Automation management and execution endpoints
///
/// Saving an automation validates its flow first; executing one runs the
/// engine synchronously and hands back the `ExecutionResult`.

use crate::{
    config::ExecutorConfig,
    flow::{validate_flow, Automation, FlowSchema},
    runtime::{AutomationExecutor, Backends, ExecutionOptions, ExecutionResult},
    store::ExecutionRecord,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Stores and the action runner used by every run
    pub backends: Backends,
    /// Per-run limits and simulator tuning
    pub executor: ExecutorConfig,
}

/// Response for automation save operations
#[derive(Debug, Serialize)]
pub struct AutomationResponse {
    pub id: String,
    pub message: String,
}

/// Request body for automation creation
#[derive(Debug, Deserialize)]
pub struct SaveAutomationRequest {
    pub automation: Automation,
}

/// Request body for a manual run
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub input_data: Option<Value>,
}

pub fn create_automation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/automations", post(save_automation).get(list_automations))
        .route("/api/automations/{id}", get(get_automation))
        .route("/api/automations/{id}/execute", post(execute))
        .route("/api/automations/{id}/executions", get(list_executions))
}

/// Create or replace an automation
///
/// POST /api/automations
/// Body: { "automation": { "id"?: "...", "name": "...", "json_schema": { "nodes": [...], "edges": [...] } } }
pub async fn save_automation(
    State(state): State<AppState>,
    Json(payload): Json<SaveAutomationRequest>,
) -> Result<Json<AutomationResponse>, (StatusCode, Json<Value>)> {
    let mut automation = payload.automation;

    if automation.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "name is required" }))));
    }

    if let Some(raw) = &automation.json_schema {
        let schema: FlowSchema = serde_json::from_value(raw.clone()).map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("Invalid automation schema format: {}", e) })),
            )
        })?;

        if let Err(errors) = validate_flow(&schema) {
            tracing::warn!("❌ Rejected automation '{}': {} validation errors", automation.name, errors.len());
            return Err((StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))));
        }
    }

    if automation.id.is_empty() {
        automation.id = uuid::Uuid::new_v4().to_string();
    }

    if let Err(e) = state.backends.flows.save_automation(&automation).await {
        tracing::error!("Failed to save automation: {}", e);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "failed to save automation" }))));
    }

    tracing::info!("💾 Saved automation: {} ({})", automation.id, automation.name);

    Ok(Json(AutomationResponse {
        message: format!("Automation '{}' saved successfully", automation.name),
        id: automation.id,
    }))
}

/// List automations
///
/// GET /api/automations
pub async fn list_automations(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    match state.backends.flows.list_automations(None).await {
        Ok(automations) => Ok(Json(json!({ "automations": automations }))),
        Err(e) => {
            tracing::error!("Failed to list automations: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/automations/{id}
pub async fn get_automation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Automation>, StatusCode> {
    match state.backends.flows.get_automation(&id).await {
        Ok(Some(automation)) => Ok(Json(automation)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get automation {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Run an automation now
///
/// POST /api/automations/{id}/execute
/// Body (optional): { "user_id"?: "...", "input_data"?: {...} }
/// Always answers 200; a failed run is reported in the body's `status`.
pub async fn execute(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<ExecuteRequest>>,
) -> Json<ExecutionResult> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let mut options = ExecutionOptions::new(id);
    options.user_id = payload.user_id;
    options.input_data = payload.input_data;

    let executor = AutomationExecutor::new(options, state.backends.clone(), &state.executor);
    tracing::info!("📥 Execution {} requested", executor.execution_id());

    Json(executor.execute().await)
}

/// Run history, newest first
///
/// GET /api/automations/{id}/executions
pub async fn list_executions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ExecutionRecord>>, StatusCode> {
    match state.backends.executions.list_executions(&id).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("Failed to list executions of {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
