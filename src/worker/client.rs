//! Async client for the database worker process.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, info, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, CloseConnectionParams, ErrorInfo, ExecuteQueryParams, ExecuteQueryResponse,
    OpenConnectionParams, OpenConnectionResponse, RequestEnvelope, ResponseEnvelope,
};
use crate::config::Settings;

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Async client for the database worker.
///
/// The client spawns the worker as a child process and communicates via
/// NDJSON over stdin/stdout. Each request has a unique ID for correlation
/// with responses, enabling concurrent requests from several charts.
///
/// # Example
///
/// ```ignore
/// use reportflow::worker::WorkerClient;
///
/// let client = WorkerClient::spawn("./reportflow-worker").await?;
/// let handle = client.open_connection("postgres", "postgres://db:5432/app").await?;
/// let rows = client.execute_query(&handle, "SELECT 1").await?;
/// client.close_connection(&handle).await?;
/// ```
pub struct WorkerClient {
    /// Writer for sending requests to worker stdin.
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Map of pending request IDs to response channels.
    pending: PendingMap,

    /// Handle to the worker child process.
    _child: Child,

    /// Handle to the background reader task.
    reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,
}

impl WorkerClient {
    /// Spawn a new worker process with the default timeout.
    pub async fn spawn<P: AsRef<Path>>(worker_path: P) -> WorkerResult<Self> {
        Self::spawn_with_args_and_timeout(
            worker_path,
            &[],
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }

    /// Spawn a worker using the `[worker]` section of the settings.
    pub async fn spawn_with_settings(settings: &Settings) -> WorkerResult<Self> {
        let worker_path = settings.worker_path().map_err(|e| {
            WorkerError::SpawnFailed(io::Error::new(io::ErrorKind::NotFound, e.to_string()))
        })?;
        Self::spawn_with_args_and_timeout(
            &worker_path,
            &settings.worker.args,
            settings.worker.timeout(),
        )
        .await
    }

    /// Spawn a worker with arguments and custom timeout.
    pub async fn spawn_with_args_and_timeout<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let mut child = Command::new(worker_path.as_ref())
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WorkerError::SpawnFailed(io::Error::other("stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WorkerError::SpawnFailed(io::Error::other("stdout not captured")))?;

        info!(worker = %worker_path.as_ref().display(), "spawned database worker");

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        Ok(Self {
            stdin: Arc::new(Mutex::new(BufWriter::new(stdin))),
            pending,
            _child: child,
            reader_task,
            timeout,
        })
    }

    /// Spawn the background task that reads responses from the worker.
    fn spawn_reader_task(stdout: ChildStdout, pending: PendingMap) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    // EOF - worker exited
                    Ok(0) => break,
                    Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(resp) => {
                            if let Some(tx) = pending.lock().await.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to parse worker response");
                        }
                    },
                    Err(e) => {
                        error!(error = %e, "worker read error");
                        break;
                    }
                }
            }

            // Worker exited - fail every pending request
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let _ = tx.send(ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(ErrorInfo {
                        code: "WORKER_EXITED".to_string(),
                        message: "Worker process exited unexpectedly".to_string(),
                    }),
                });
            }
        })
    }

    /// Send a request to the worker and wait for a response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serialization fails
    /// - Writing to the worker fails
    /// - The request times out
    /// - The worker returns an error response
    /// - Deserialization of the response fails
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        {
            let mut stdin = self.stdin.lock().await;
            let line =
                serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)? + "\n";
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(WorkerError::WriteFailed)?;
            stdin.flush().await.map_err(WorkerError::WriteFailed)?;
        }
        debug!(%id, method, "sent worker request");

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => return Err(WorkerError::ChannelClosed),
            Err(_) => {
                // Timeout - clean up pending request to prevent memory leak
                self.pending.lock().await.remove(&id);
                return Err(WorkerError::Timeout(self.timeout.as_secs()));
            }
        };

        if response.success {
            let result = response.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
        } else {
            let error = response.error.unwrap_or_else(|| ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(classify_error(&error.code, &error.message))
        }
    }

    /// Check if the worker is still running.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    /// Get the current request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// Convenience methods for the connection lifecycle
impl WorkerClient {
    /// Open a connection; returns the worker's handle for it.
    pub async fn open_connection(&self, driver: &str, connection_string: &str) -> WorkerResult<String> {
        let resp: OpenConnectionResponse = self
            .request(
                methods::OPEN_CONNECTION,
                OpenConnectionParams {
                    driver: driver.to_string(),
                    connection_string: connection_string.to_string(),
                },
            )
            .await?;
        Ok(resp.handle)
    }

    /// Execute a SQL query on an open connection.
    pub async fn execute_query(&self, handle: &str, sql: &str) -> WorkerResult<ExecuteQueryResponse> {
        self.request(
            methods::EXECUTE_QUERY,
            ExecuteQueryParams {
                handle: handle.to_string(),
                sql: sql.to_string(),
            },
        )
        .await
    }

    /// Close an open connection.
    pub async fn close_connection(&self, handle: &str) -> WorkerResult<()> {
        let _: serde_json::Value = self
            .request(
                methods::CLOSE_CONNECTION,
                CloseConnectionParams {
                    handle: handle.to_string(),
                },
            )
            .await?;
        Ok(())
    }
}

/// Classify a worker error code into a more specific error type.
fn classify_error(code: &str, message: &str) -> WorkerError {
    match code {
        "DRIVER_NOT_FOUND" => WorkerError::DriverNotFound(message.to_string()),
        "CONNECTION_FAILED" => WorkerError::ConnectionFailed(message.to_string()),
        "QUERY_FAILED" => WorkerError::QueryFailed(message.to_string()),
        "UNKNOWN_HANDLE" => WorkerError::UnknownHandle(message.to_string()),
        "INVALID_REQUEST" => WorkerError::InvalidRequest(message.to_string()),
        "METHOD_NOT_FOUND" => WorkerError::MethodNotFound(message.to_string()),
        "WORKER_EXITED" => WorkerError::WorkerExited,
        _ => WorkerError::remote(code, message),
    }
}
