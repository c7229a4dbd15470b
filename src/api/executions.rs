/// Execution and alert read endpoints
///
/// Back the run history and alert panels: alerts per execution and the
/// read flag on a single alert.

use crate::{api::automations::AppState, store::Alert};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

pub fn create_execution_routes() -> Router<AppState> {
    Router::new()
        .route("/api/executions/{id}/alerts", get(list_alerts))
        .route("/api/alerts/{id}/read", post(mark_alert_read))
}

/// Alerts raised by one execution, newest first
///
/// GET /api/executions/{id}/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<Vec<Alert>>, StatusCode> {
    match state.backends.alerts.list_alerts(&execution_id).await {
        Ok(alerts) => Ok(Json(alerts)),
        Err(e) => {
            tracing::error!("Failed to list alerts of execution {}: {}", execution_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/alerts/{id}/read
pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    match state.backends.alerts.mark_alert_read(&id).await {
        Ok(true) => Ok(Json(json!({ "message": "Alert marked as read" }))),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to mark alert {} as read: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
