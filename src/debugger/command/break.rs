use crate::debugger::breakpoint::{BreakpointSet, PageBreakpoints};
use crate::debugger::{Debugger, Error};
use crate::weak_error;

/// Reconcile operator breakpoints with breakpoints the database can bind to real lines.
pub struct SetBreakpoints<'a> {
    dbg: &'a Debugger,
}

impl<'a> SetBreakpoints<'a> {
    pub fn new(debugger: &'a Debugger) -> Self {
        Self { dbg: debugger }
    }

    /// Verify requested breakpoints, publish the result and rebroadcast it to paused threads.
    /// Return verified breakpoints of all pages.
    ///
    /// On verification failure the debugger state is left untouched.
    pub async fn run(&self, requested: Vec<PageBreakpoints>) -> Result<BreakpointSet, Error> {
        let store = self.dbg.store();

        let request = serde_json::to_value(&requested)?;
        let response = store.queue().verify_breakpoints(&request).await?;
        let verified: Vec<PageBreakpoints> =
            serde_json::from_value(response).map_err(Error::MalformedVerification)?;

        let breakpoints = store.reconcile_verified(requested, verified).await?;

        if self.dbg.installs_breakpoints() {
            weak_error!(self.dbg.install_breakpoints().await, "install breakpoints:");
        }

        Ok(breakpoints)
    }
}
