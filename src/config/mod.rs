//! Configuration module for reportflow.
//!
//! Handles data source connections, environment variables, and settings.

mod connection;
mod settings;

pub use connection::{ConnectionConfigError, DataSourceConnection};
pub use settings::{
    expand_env_vars, ConnectionSettings, ExecutorSettings, ResolverSettings, Settings,
    SettingsError, WorkerSettings,
};
