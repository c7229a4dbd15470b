/// Failure notifications
///
/// Raised only on failure paths, at most once per run. Fire-and-forget: a failed
/// alert write is logged and otherwise ignored.

use crate::runtime::recorder::best_effort;
use crate::store::{Alert, AlertStore};
use std::sync::Arc;

pub struct AlertEmitter {
    store: Arc<dyn AlertStore>,
}

impl AlertEmitter {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    pub async fn emit(&self, execution_id: &str, message: &str) {
        tracing::warn!("🚨 Raising alert for execution {}: {}", execution_id, message);
        let alert = Alert::error(execution_id, message);
        best_effort("create alert", self.store.create_alert(&alert)).await;
    }
}
