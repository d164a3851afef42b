use crate::debugger::command::DebuggerResponse;
use crate::debugger::{Debugger, Error};

/// Resume every paused thread.
pub struct ContinueAll<'a> {
    dbg: &'a Debugger,
}

impl<'a> ContinueAll<'a> {
    pub fn new(debugger: &'a Debugger) -> Self {
        Self { dbg: debugger }
    }

    /// Return number of resumed threads.
    pub async fn run(&self) -> Result<usize, Error> {
        self.dbg
            .store()
            .release_all(&DebuggerResponse::Continue)
            .await
    }
}
