//! Database worker bridge.
//!
//! Real database drivers live in a separate worker process. This module
//! spawns it and speaks NDJSON over its stdin/stdout, and exposes it to the
//! pipeline as a [`crate::connector::Driver`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 reportflow (Rust + Tokio)                       │
//! │  Connector ──► WorkerDriver ──► WorkerClient (async)            │
//! │                                 - request ids for correlation   │
//! │                                 - per-request timeout           │
//! └─────────────────────────────────────────────────────────────────┘
//!                 stdin (NDJSON) │ ▲ stdout (NDJSON)
//!                                ▼ │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        Worker process: connection.open / query.execute /        │
//! │        connection.close against SQL Server, MySQL,              │
//! │        PostgreSQL and Oracle                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod driver;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use driver::{WorkerConnection, WorkerDriver};
pub use error::{WorkerError, WorkerResult};
