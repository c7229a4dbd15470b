/// SQLite persistence layer for automations, executions, and alerts
///
/// JSON payloads (flow schema, run logs/output) are stored as text columns,
/// timestamps as RFC 3339 text with millisecond precision.

use crate::flow::Automation;
use crate::store::types::{Alert, ExecutionPayload, ExecutionRecord, ExecutionUpdate};
use crate::store::{AlertStore, ExecutionStore, FlowStore};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;

/// SQLite-backed store implementing all three storage traits
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// SQLite connection pool
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool; call `init_schema` before use
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) `{data_dir}/autoflow.db` and initialize the schema
    pub async fn open(data_dir: &str) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))?;
        let db_path = Path::new(data_dir).join("autoflow.db");

        tracing::info!("🗄️ Opening database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Private in-memory database, used by tests
    ///
    /// Pinned to one connection: every SQLite `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Create tables and indexes
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS automations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                json_schema TEXT,
                user_id TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS executions (
                id TEXT PRIMARY KEY,
                automation_id TEXT NOT NULL,
                status TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT,
                duration_ms INTEGER,
                result TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                type TEXT NOT NULL,
                message TEXT NOT NULL,
                execution_id TEXT NOT NULL,
                sent_at TEXT NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_automations_user ON automations(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_executions_automation ON executions(automation_id, started_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_execution ON alerts(execution_id, sent_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| anyhow::anyhow!("Invalid timestamp '{}': {}", raw, e))?
        .with_timezone(&Utc))
}

fn automation_from_row(row: &SqliteRow) -> Result<Automation> {
    let json_schema: Option<String> = row.try_get("json_schema")?;
    Ok(Automation {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        json_schema: json_schema.map(|raw| serde_json::from_str(&raw)).transpose()?,
        user_id: row.try_get("user_id")?,
    })
}

fn execution_from_row(row: &SqliteRow) -> Result<ExecutionRecord> {
    let status: String = row.try_get("status")?;
    let started_at: String = row.try_get("started_at")?;
    let finished_at: Option<String> = row.try_get("finished_at")?;
    let result: String = row.try_get("result")?;

    Ok(ExecutionRecord {
        id: row.try_get("id")?,
        automation_id: row.try_get("automation_id")?,
        status: status.parse()?,
        started_at: parse_timestamp(&started_at)?,
        finished_at: finished_at.as_deref().map(parse_timestamp).transpose()?,
        duration_ms: row.try_get("duration_ms")?,
        result: serde_json::from_str::<ExecutionPayload>(&result)?,
    })
}

fn alert_from_row(row: &SqliteRow) -> Result<Alert> {
    let sent_at: String = row.try_get("sent_at")?;
    Ok(Alert {
        id: row.try_get("id")?,
        alert_type: row.try_get("type")?,
        message: row.try_get("message")?,
        execution_id: row.try_get("execution_id")?,
        sent_at: parse_timestamp(&sent_at)?,
        is_read: row.try_get("is_read")?,
    })
}

#[async_trait]
impl FlowStore for SqliteStore {
    async fn get_automation(&self, id: &str) -> Result<Option<Automation>> {
        let row = sqlx::query(
            "SELECT id, name, description, is_active, json_schema, user_id FROM automations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(automation_from_row).transpose()
    }

    /// Uses UPSERT to handle both create and update operations atomically.
    async fn save_automation(&self, automation: &Automation) -> Result<()> {
        let json_schema = automation
            .json_schema
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO automations (id, name, description, is_active, json_schema, user_id, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                is_active = excluded.is_active,
                json_schema = excluded.json_schema,
                user_id = excluded.user_id,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&automation.id)
        .bind(&automation.name)
        .bind(&automation.description)
        .bind(automation.is_active)
        .bind(json_schema)
        .bind(&automation.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_automations(&self, user_id: Option<&str>) -> Result<Vec<Automation>> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(
                    "SELECT id, name, description, is_active, json_schema, user_id FROM automations WHERE user_id = ? ORDER BY name",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, description, is_active, json_schema, user_id FROM automations ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(automation_from_row).collect()
    }
}

#[async_trait]
impl ExecutionStore for SqliteStore {
    async fn create_execution(&self, record: &ExecutionRecord) -> Result<String> {
        let result_json = serde_json::to_string(&record.result)?;

        sqlx::query(
            r#"
            INSERT INTO executions (id, automation_id, status, started_at, finished_at, duration_ms, result)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.automation_id)
        .bind(record.status.as_str())
        .bind(format_timestamp(&record.started_at))
        .bind(record.finished_at.as_ref().map(format_timestamp))
        .bind(record.duration_ms)
        .bind(&result_json)
        .execute(&self.pool)
        .await?;

        Ok(record.id.clone())
    }

    async fn update_execution(&self, id: &str, update: &ExecutionUpdate) -> Result<()> {
        let result_json = serde_json::to_string(&update.result)?;

        let result = sqlx::query(
            r#"
            UPDATE executions
            SET status = ?, finished_at = ?, duration_ms = ?, result = ?
            WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(format_timestamp(&update.finished_at))
        .bind(update.duration_ms)
        .bind(&result_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Execution not found: {}", id));
        }

        Ok(())
    }

    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRecord>> {
        let row = sqlx::query(
            "SELECT id, automation_id, status, started_at, finished_at, duration_ms, result FROM executions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(execution_from_row).transpose()
    }

    async fn list_executions(&self, automation_id: &str) -> Result<Vec<ExecutionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, automation_id, status, started_at, finished_at, duration_ms, result
            FROM executions
            WHERE automation_id = ?
            ORDER BY started_at DESC
            "#,
        )
        .bind(automation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(execution_from_row).collect()
    }
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn create_alert(&self, alert: &Alert) -> Result<String> {
        sqlx::query(
            r#"
            INSERT INTO alerts (id, type, message, execution_id, sent_at, is_read)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.alert_type)
        .bind(&alert.message)
        .bind(&alert.execution_id)
        .bind(format_timestamp(&alert.sent_at))
        .bind(alert.is_read)
        .execute(&self.pool)
        .await?;

        Ok(alert.id.clone())
    }

    async fn list_alerts(&self, execution_id: &str) -> Result<Vec<Alert>> {
        let rows = sqlx::query(
            r#"
            SELECT id, type, message, execution_id, sent_at, is_read
            FROM alerts
            WHERE execution_id = ?
            ORDER BY sent_at DESC
            "#,
        )
        .bind(execution_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn mark_alert_read(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE alerts SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
