use crate::debugger::{Debugger, Error};
use log::info;

/// Drop all breakpoints, release paused threads and forget every known queue row.
pub struct ClearBreakpoints<'a> {
    dbg: &'a Debugger,
}

impl<'a> ClearBreakpoints<'a> {
    pub fn new(debugger: &'a Debugger) -> Self {
        Self { dbg: debugger }
    }

    pub async fn run(&self) -> Result<(), Error> {
        let released = self.dbg.store().clear_all().await?;
        info!(target: "debugger", "breakpoints cleared, {released} thread(s) released");
        Ok(())
    }
}
