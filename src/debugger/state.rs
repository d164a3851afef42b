use crate::debugger::breakpoint::{BreakpointSet, PageBreakpoints};
use crate::debugger::command::DebuggerResponse;
use crate::debugger::error::Error;
use crate::debugger::notification::{DebuggerRequest, StopNotification};
use crate::debugger::thread::{ThreadInterner, ThreadState};
use crate::queue::DebuggerQueue;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    /// Last breakpoints requested by an operator.
    requested: BreakpointSet,
    /// Breakpoints confirmed by the database.
    verified: BreakpointSet,
    /// Paused threads by queue row hash.
    active: BTreeMap<String, ThreadState>,
    /// Queue rows that already got a response, stop notifications for them are ignored.
    blocked: BTreeSet<String>,
}

impl State {
    fn block(&mut self, hash: String) {
        self.active.remove(&hash);
        self.blocked.insert(hash);
    }
}

/// Consistent view of the debugger state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub requested: BreakpointSet,
    pub active: BTreeMap<String, ThreadState>,
}

/// Debugger state shared by the HTTP surface and the notification listener.
///
/// All four parts of the state live behind a single lock. The lock is held across
/// queue writes that are part of a transition, so a thread can't be released twice.
pub struct StateStore {
    state: Mutex<State>,
    threads: ThreadInterner,
    queue: Arc<dyn DebuggerQueue>,
}

impl StateStore {
    pub fn new(queue: Arc<dyn DebuggerQueue>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            threads: ThreadInterner::new(),
            queue,
        }
    }

    pub fn threads(&self) -> &ThreadInterner {
        &self.threads
    }

    pub fn queue(&self) -> &Arc<dyn DebuggerQueue> {
        &self.queue
    }

    /// Add or refresh a paused thread. Return false if notification was ignored.
    pub async fn record_stop(
        &self,
        notification: StopNotification,
        request: DebuggerRequest,
    ) -> bool {
        let mut state = self.state.lock().await;

        let hash = notification.hash.clone();
        if state.blocked.contains(&hash) {
            debug!(target: "debugger", "notification for request {hash} ignored");
            return false;
        }

        let notifications_count = state
            .active
            .get(&hash)
            .map(|thread| thread.notifications_count)
            .unwrap_or_default();

        let thread = ThreadState {
            thread_id_int: self.threads.intern(&notification.thread_id),
            thread_id: notification.thread_id.clone(),
            status: notification.status.clone(),
            notifications_count: notifications_count + 1,
            call_stack: request.call_stack,
            last_notification: notification,
        };
        state.active.insert(hash, thread);
        true
    }

    /// Write response to the queue row and forget the paused thread.
    ///
    /// Thread is moved into the block set even if the write fails.
    async fn release(&self, state: &mut State, hash: String, response: &serde_json::Value) {
        if let Err(e) = self.queue.respond(&hash, response).await {
            warn!(target: "debugger", "send response to {hash}: {e:#}");
        }
        state.block(hash);
    }

    async fn release_locked(
        &self,
        state: &mut State,
        response: &DebuggerResponse,
    ) -> Result<usize, Error> {
        let encoded = response.encode()?;
        let hashes = state.active.keys().cloned().collect::<Vec<_>>();
        let released = hashes.len();
        for hash in hashes {
            self.release(state, hash, &encoded).await;
        }
        if released > 0 {
            debug!(target: "debugger", "{} sent to {released} thread(s)", response.name());
        }
        Ok(released)
    }

    /// Release every paused thread with the response. Return number of released threads.
    pub async fn release_all(&self, response: &DebuggerResponse) -> Result<usize, Error> {
        let mut state = self.state.lock().await;
        self.release_locked(&mut state, response).await
    }

    /// Send the response to paused threads matching the predicate, threads stay paused
    /// until the next stop notification replaces them.
    pub async fn send_matching(
        &self,
        response: &DebuggerResponse,
        predicate: impl Fn(&ThreadState) -> bool,
    ) -> Result<usize, Error> {
        let encoded = response.encode()?;
        let state = self.state.lock().await;

        let mut sent = 0;
        for (hash, thread) in state.active.iter() {
            if !predicate(thread) {
                continue;
            }
            if let Err(e) = self.queue.respond(hash, &encoded).await {
                warn!(target: "debugger", "send response to {hash}: {e:#}");
            }
            sent += 1;
        }
        Ok(sent)
    }

    /// Publish breakpoints accepted by the database and rebroadcast them to paused threads.
    /// Return the whole verified set.
    pub async fn reconcile_verified(
        &self,
        requested: Vec<PageBreakpoints>,
        verified: Vec<PageBreakpoints>,
    ) -> Result<BreakpointSet, Error> {
        let mut state = self.state.lock().await;

        state.requested = BreakpointSet::from(requested);
        state.verified.merge(verified);

        let response = DebuggerResponse::SetBreakpoints {
            breakpoints: state.verified.line_index(),
        };
        self.release_locked(&mut state, &response).await?;

        Ok(state.verified.clone())
    }

    /// Send `clear_breakpoints` to every paused thread and reset whole state.
    pub async fn clear_all(&self) -> Result<usize, Error> {
        let mut state = self.state.lock().await;
        let released = self
            .release_locked(&mut state, &DebuggerResponse::ClearBreakpoints)
            .await?;
        *state = State::default();
        Ok(released)
    }

    /// Return breakpoints and paused threads.
    ///
    /// Paused threads whose queue row already has a response are moved into the block set first.
    pub async fn snapshot(&self) -> StatusSnapshot {
        let mut state = self.state.lock().await;

        let hashes = state.active.keys().cloned().collect::<Vec<_>>();
        for hash in hashes {
            match self.queue.is_pending(&hash).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(target: "debugger", "request {hash} already answered, drop it");
                    state.block(hash);
                }
                Err(e) => warn!(target: "debugger", "check request {hash}: {e:#}"),
            }
        }

        StatusSnapshot {
            requested: state.verified.clone(),
            active: state.active.clone(),
        }
    }

    pub async fn verified(&self) -> BreakpointSet {
        self.state.lock().await.verified.clone()
    }

    pub async fn requested(&self) -> BreakpointSet {
        self.state.lock().await.requested.clone()
    }

    /// Return paused threads as is, without consulting the queue.
    pub async fn active(&self) -> BTreeMap<String, ThreadState> {
        self.state.lock().await.active.clone()
    }

    pub async fn blocked(&self) -> Vec<String> {
        self.state.lock().await.blocked.iter().cloned().collect()
    }

    pub async fn is_blocked(&self, hash: &str) -> bool {
        self.state.lock().await.blocked.contains(hash)
    }
}
