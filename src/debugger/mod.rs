pub mod breakpoint;
pub mod command;
pub mod error;
pub mod notification;
pub mod state;
pub mod thread;
mod utils;

pub use breakpoint::{BreakpointSet, PageBreakpoint, PageBreakpoints};
pub use error::Error;
pub use notification::{DebuggerRequest, StopNotification};
pub use state::{StateStore, StatusSnapshot};
pub use thread::{ThreadCallFrame, ThreadState};

use crate::queue::DebuggerQueue;
use log::info;
use std::sync::Arc;

/// Debugger coordinator: mediates between pages paused inside the database and an operator.
pub struct Debugger {
    store: StateStore,
    install_breakpoints: bool,
}

impl Debugger {
    pub fn new(queue: Arc<dyn DebuggerQueue>) -> Self {
        Self {
            store: StateStore::new(queue),
            install_breakpoints: false,
        }
    }

    /// Install verified breakpoints into the database after each reconciliation.
    pub fn with_breakpoints_install(mut self, enabled: bool) -> Self {
        self.install_breakpoints = enabled;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub(crate) fn installs_breakpoints(&self) -> bool {
        self.install_breakpoints
    }

    /// Handle a raw stop notification payload.
    ///
    /// Return false if the notification was ignored because its queue row already got a response.
    pub async fn on_notification(&self, payload: &str) -> Result<bool, Error> {
        let notification = StopNotification::parse(payload)?;
        let hash = notification.hash.clone();

        let request = self.store.queue().fetch_request(&hash).await?;
        let request = DebuggerRequest::from_value(&hash, request)?;

        Ok(self.store.record_stop(notification, request).await)
    }

    /// Current breakpoints and paused threads.
    pub async fn status(&self) -> StatusSnapshot {
        self.store.snapshot().await
    }

    /// Install verified breakpoints into the database (`__pogo_break_points_set`).
    pub async fn install_breakpoints(&self) -> Result<(), Error> {
        let breakpoints = serde_json::to_value(self.store.verified().await.line_index())?;
        self.store.queue().install_breakpoints(&breakpoints).await?;
        info!(target: "debugger", "set breakpoints to {breakpoints}");
        Ok(())
    }
}
