//! [`Driver`] implementation backed by the worker process.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::client::WorkerClient;
use crate::connector::{Connection, ConnectionResult, Driver, QueryError, QueryResult};
use crate::data::ResultSet;
use crate::sql::dialect::{Dialect, SqlDialect};

/// Opens connections through a shared [`WorkerClient`].
#[derive(Clone)]
pub struct WorkerDriver {
    client: Arc<WorkerClient>,
}

impl WorkerDriver {
    pub fn new(client: Arc<WorkerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Driver for WorkerDriver {
    async fn open(&self, dialect: Dialect, target: &str) -> ConnectionResult<Box<dyn Connection>> {
        let handle = self
            .client
            .open_connection(dialect.driver_name(), target)
            .await?;
        debug!(%dialect, %handle, "worker connection opened");
        Ok(Box::new(WorkerConnection {
            client: self.client.clone(),
            handle,
            closed: false,
        }))
    }
}

/// A connection held open inside the worker.
pub struct WorkerConnection {
    client: Arc<WorkerClient>,
    handle: String,
    closed: bool,
}

#[async_trait]
impl Connection for WorkerConnection {
    async fn query(&mut self, sql: &str) -> QueryResult<ResultSet> {
        if self.closed {
            return Err(QueryError::Driver(format!(
                "connection {} already closed",
                self.handle
            )));
        }
        let resp = self.client.execute_query(&self.handle, sql).await?;
        let width = resp.columns.len();
        if let Some(bad) = resp.rows.iter().position(|r| r.len() != width) {
            return Err(QueryError::Malformed(format!(
                "row {} has {} values for {} columns",
                bad,
                resp.rows[bad].len(),
                width
            )));
        }
        Ok(resp.into())
    }

    async fn close(&mut self) -> ConnectionResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client.close_connection(&self.handle).await?;
        debug!(handle = %self.handle, "worker connection closed");
        Ok(())
    }
}

impl Drop for WorkerConnection {
    fn drop(&mut self) {
        if !self.closed {
            warn!(handle = %self.handle, "worker connection dropped without close");
        }
    }
}
