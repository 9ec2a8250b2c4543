//! TOML-based configuration for reportflow.
//!
//! Supports a config file (reportflow.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.warehouse]
//! dialect = "mssql"
//! host = "sql01.internal"
//! database = "dw"
//! username = "report_reader"
//! password = "${WAREHOUSE_PASSWORD}"
//!
//! [worker]
//! path = "./reportflow-worker"
//! timeout_secs = 60
//!
//! [resolver]
//! max_depth = 5
//!
//! [executor]
//! default_limit = 5000
//!
//! [chart]
//! palette = ["#5470c6", "#91cc75", "#fac858"]
//! grid_left = "10%"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::connection::DataSourceConnection;
use crate::chart::ChartDefaults;
use crate::sql::dialect::Dialect;
use crate::sql::template::DepthGuard;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported database type: {0}")]
    UnsupportedDialect(String),

    #[error("Worker binary not found. Set worker.path in config or REPORTFLOW_WORKER")]
    WorkerNotFound,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named data source connections.
    pub connections: BTreeMap<String, ConnectionSettings>,

    /// Database worker configuration.
    pub worker: WorkerSettings,

    /// Template resolver configuration.
    pub resolver: ResolverSettings,

    /// Query executor configuration.
    pub executor: ExecutorSettings,

    /// Chart builder defaults.
    pub chart: ChartDefaults,
}

/// Connection configuration. String fields support `${ENV_VAR}` expansion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database type (mssql, mysql, postgresql, oracle).
    #[serde(alias = "db_type", alias = "driver")]
    pub dialect: String,

    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub database: String,

    #[serde(default, alias = "user")]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl ConnectionSettings {
    /// Get the dialect.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        self.dialect
            .parse()
            .map_err(|_| SettingsError::UnsupportedDialect(self.dialect.clone()))
    }

    /// Build the connection with environment variables expanded.
    pub fn resolve(&self) -> Result<DataSourceConnection, SettingsError> {
        Ok(DataSourceConnection {
            dialect: self.dialect()?,
            host: expand_env_vars(&self.host)?,
            port: self.port,
            database: expand_env_vars(&self.database)?,
            username: expand_env_vars(&self.username)?,
            password: expand_env_vars(&self.password)?,
        })
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to the worker binary.
    pub path: Option<String>,

    /// Extra command-line arguments for the worker.
    pub args: Vec<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            args: Vec::new(),
            timeout_secs: 30,
        }
    }
}

impl WorkerSettings {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Template resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Deepest nested dataset level that is still expanded.
    pub max_depth: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: DepthGuard::DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolverSettings {
    pub fn guard(&self) -> DepthGuard {
        DepthGuard::new(self.max_depth)
    }
}

/// Query executor configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Row limit applied when a chart does not set one.
    pub default_limit: Option<u64>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `REPORTFLOW_CONFIG`
    /// 2. `./reportflow.toml`
    /// 3. `~/.config/reportflow/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("REPORTFLOW_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("reportflow.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("reportflow").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name, with environment variables expanded.
    pub fn connection(&self, name: &str) -> Result<DataSourceConnection, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))?
            .resolve()
    }

    /// Get the worker binary path.
    ///
    /// Checks `worker.path`, then `REPORTFLOW_WORKER`, then `./reportflow-worker`.
    pub fn worker_path(&self) -> Result<PathBuf, SettingsError> {
        if let Some(path) = &self.worker.path {
            return Ok(PathBuf::from(expand_env_vars(path)?));
        }

        if let Ok(path) = env::var("REPORTFLOW_WORKER") {
            return Ok(PathBuf::from(path));
        }

        let local = PathBuf::from("./reportflow-worker");
        if local.exists() {
            return Ok(local);
        }

        Err(SettingsError::WorkerNotFound)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
