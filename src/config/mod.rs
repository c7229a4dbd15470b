/// Configuration management for the Autoflow service
///
/// Handles server configuration, database location, and execution engine tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Execution engine configuration
    pub executor: ExecutorConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the SQLite database file (default: "data")
    /// Creates: {data_dir}/autoflow.db
    pub data_dir: String,
}

/// Tuning for a single automation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Artificial latency of the simulated integration call
    pub action_delay_ms: u64,
    /// Probability that a simulated action succeeds, within [0, 1]
    pub action_success_rate: f64,
    /// Fixed seed for the simulator; `None` seeds from the OS
    pub action_seed: Option<u64>,
    /// Maximum number of nodes the walker may process in one run
    pub max_steps: Option<usize>,
    /// Wall-clock budget for the walk
    pub max_run_ms: Option<u64>,
}

/// Success probability of a simulated action when none is configured
pub const DEFAULT_ACTION_SUCCESS_RATE: f64 = 0.8;

/// Clamp a success probability into [0, 1]; NaN and infinities fall back to the default
pub fn sanitize_success_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        DEFAULT_ACTION_SUCCESS_RATE
    }
}

impl ExecutorConfig {
    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    pub fn max_run_duration(&self) -> Option<Duration> {
        self.max_run_ms.map(Duration::from_millis)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: env_parse("AUTOFLOW_ACTION_DELAY_MS").unwrap_or(500),
            action_success_rate: env_parse::<f64>("AUTOFLOW_ACTION_SUCCESS_RATE")
                .filter(|rate| rate.is_finite())
                .map(sanitize_success_rate)
                .unwrap_or(DEFAULT_ACTION_SUCCESS_RATE),
            action_seed: env_parse("AUTOFLOW_ACTION_SEED"),
            // 0 disables the budget
            max_steps: match env_parse::<usize>("AUTOFLOW_MAX_STEPS") {
                Some(0) => None,
                Some(limit) => Some(limit),
                None => Some(10_000),
            },
            max_run_ms: env_parse("AUTOFLOW_MAX_RUN_MS"),
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("AUTOFLOW_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_parse("AUTOFLOW_PORT").unwrap_or(3004),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("AUTOFLOW_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
            },
            executor: ExecutorConfig::default(),
        }
    }
}

/// Read and parse an environment variable, ignoring unset or malformed values
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}
