//! Protocol types for worker communication.
//!
//! One JSON object per line in each direction. Requests carry an id that the
//! worker echoes back, so several requests may be in flight at once.

use serde::{Deserialize, Serialize};

use crate::data::ResultSet;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "query.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Connection Lifecycle
// ============================================================================

/// Parameters for `connection.open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenConnectionParams {
    /// Database driver name (e.g., "mssql", "postgres").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

/// Response from `connection.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenConnectionResponse {
    /// Opaque handle naming the open connection.
    pub handle: String,
}

/// Parameters for `connection.close`.
#[derive(Debug, Clone, Serialize)]
pub struct CloseConnectionParams {
    pub handle: String,
}

// ============================================================================
// Query Execution
// ============================================================================

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    /// Handle from `connection.open`.
    pub handle: String,
    /// SQL query to execute.
    pub sql: String,
}

/// A column in query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Database-specific type.
    #[serde(default)]
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryResponse {
    /// Result column descriptions.
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    #[serde(default)]
    pub row_count: i64,
}

impl From<ExecuteQueryResponse> for ResultSet {
    fn from(resp: ExecuteQueryResponse) -> Self {
        ResultSet::new(
            resp.columns.into_iter().map(|c| c.name).collect(),
            resp.rows,
        )
    }
}

// ============================================================================
// Method Names
// ============================================================================

/// Method name constants.
pub mod methods {
    pub const OPEN_CONNECTION: &str = "connection.open";
    pub const CLOSE_CONNECTION: &str = "connection.close";
    pub const EXECUTE_QUERY: &str = "query.execute";
}
