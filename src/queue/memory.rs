use crate::queue::{DebuggerQueue, QueueError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type Verifier = Box<dyn Fn(&Value) -> Result<Value, QueueError> + Send + Sync>;

#[derive(Debug, Clone)]
struct Row {
    request: Value,
    response: Option<Value>,
}

/// In-process debugger queue. Stands in for the database in tests and local experiments.
///
/// Breakpoint verification accepts every requested breakpoint unless another verifier is set.
pub struct MemoryQueue {
    rows: Mutex<HashMap<String, Row>>,
    verifier: Verifier,
    installed: Mutex<Vec<Value>>,
    fail_writes: AtomicBool,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self {
            rows: Mutex::default(),
            verifier: Box::new(|request| Ok(request.clone())),
            installed: Mutex::default(),
            fail_writes: AtomicBool::new(false),
        }
    }
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verifier(
        verifier: impl Fn(&Value) -> Result<Value, QueueError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            verifier: Box::new(verifier),
            ..Self::default()
        }
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<String, Row>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a pending row, as a page does before notifying the debugger.
    pub fn push(&self, hash: &str, request: Value) {
        self.rows().insert(
            hash.to_string(),
            Row {
                request,
                response: None,
            },
        );
    }

    /// Write a response bypassing the debugger.
    pub fn set_response(&self, hash: &str, response: Value) {
        if let Some(row) = self.rows().get_mut(hash) {
            row.response = Some(response);
        }
    }

    pub fn response(&self, hash: &str) -> Option<Value> {
        self.rows().get(hash).and_then(|row| row.response.clone())
    }

    /// Make every subsequent response write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Breakpoint maps passed to `install_breakpoints` so far.
    pub fn installed(&self) -> Vec<Value> {
        self.installed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl DebuggerQueue for MemoryQueue {
    async fn fetch_request(&self, hash: &str) -> Result<Value, QueueError> {
        self.rows()
            .get(hash)
            .map(|row| row.request.clone())
            .ok_or_else(|| QueueError::RowNotFound(hash.to_string()))
    }

    async fn respond(&self, hash: &str, response: &Value) -> Result<(), QueueError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(QueueError::Rejected(format!("write to `{hash}` refused")));
        }
        // like an UPDATE, writing into a missing row is not an error
        if let Some(row) = self.rows().get_mut(hash) {
            row.response = Some(response.clone());
        }
        Ok(())
    }

    async fn is_pending(&self, hash: &str) -> Result<bool, QueueError> {
        Ok(self
            .rows()
            .get(hash)
            .map(|row| row.response.is_none())
            .unwrap_or(false))
    }

    async fn verify_breakpoints(&self, request: &Value) -> Result<Value, QueueError> {
        (self.verifier)(request)
    }

    async fn install_breakpoints(&self, breakpoints: &Value) -> Result<(), QueueError> {
        self.installed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(breakpoints.clone());
        Ok(())
    }
}
