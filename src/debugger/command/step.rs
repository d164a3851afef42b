use crate::debugger::command::DebuggerResponse;
use crate::debugger::{Debugger, Error};
use log::debug;

/// Execute one line of a single paused thread.
///
/// Thread entry is not released: the page answers with a new stop notification
/// for the same queue row at the next line.
pub struct Step<'a> {
    dbg: &'a Debugger,
    thread_num: u64,
}

impl<'a> Step<'a> {
    pub fn new(debugger: &'a Debugger, thread_num: u64) -> Self {
        Self {
            dbg: debugger,
            thread_num,
        }
    }

    /// Build command from a raw `thread_id` parameter.
    pub fn parse(debugger: &'a Debugger, thread_id: &str) -> Result<Self, Error> {
        let num = thread_id
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidThreadId(thread_id.to_string()))?;
        Ok(Self::new(debugger, num))
    }

    /// Return number of queue rows that received the command.
    pub async fn run(&self) -> Result<usize, Error> {
        debug!(target: "debugger", "stepping thread #{}", self.thread_num);
        let num = self.thread_num;
        self.dbg
            .store()
            .send_matching(&DebuggerResponse::Step, |thread| thread.thread_id_int == num)
            .await
    }
}
