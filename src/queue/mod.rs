//! Database side of the debugger: the `__pogo_debugger_queue` table and breakpoint procedures.
//!
//! Pages insert a row with a request into the queue, notify the debugger and poll
//! the row until a response appears. The debugger reads requests, writes responses
//! and delegates breakpoint verification to the database.

pub mod memory;
pub mod postgres;

pub use memory::MemoryQueue;
pub use postgres::PgQueue;

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("debugger queue row `{0}` not found")]
    RowNotFound(String),
    #[error("database rejected the call: {0}")]
    Rejected(String),
}

/// Access to the debugger queue and the breakpoint procedures.
#[async_trait]
pub trait DebuggerQueue: Send + Sync {
    /// Return the request stored in the queue row.
    async fn fetch_request(&self, hash: &str) -> Result<Value, QueueError>;

    /// Write a response into the queue row, releasing the waiting page.
    async fn respond(&self, hash: &str, response: &Value) -> Result<(), QueueError>;

    /// Return true if the queue row exists and has no response yet.
    async fn is_pending(&self, hash: &str) -> Result<bool, QueueError>;

    /// Call `__pogo_break_points_verify` and return its result.
    async fn verify_breakpoints(&self, request: &Value) -> Result<Value, QueueError>;

    /// Call `__pogo_break_points_set` with a page -> line -> true map.
    async fn install_breakpoints(&self, breakpoints: &Value) -> Result<(), QueueError>;
}
