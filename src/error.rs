//! Crate-level error aggregating the per-module errors, used by the CLI.

use thiserror::Error;

use crate::chart::ChartError;
use crate::config::{ConnectionConfigError, SettingsError};
use crate::connector::ConnectionError;
use crate::dataset::DatasetError;
use crate::execute::ExecuteError;
use crate::worker::WorkerError;

pub type Result<T> = std::result::Result<T, ReportflowError>;

#[derive(Error, Debug)]
pub enum ReportflowError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    ConnectionConfig(#[from] ConnectionConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportflowError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}
