mod r#break;
mod clear;
mod r#continue;
mod step;

pub use clear::ClearBreakpoints;
pub use r#break::SetBreakpoints;
pub use r#continue::ContinueAll;
pub use step::Step;

use crate::debugger::breakpoint::LineIndex;
use serde::Serialize;

pub const CONTINUE_COMMAND: &str = "continue";
pub const STEP_COMMAND: &str = "step";
pub const SET_BREAKPOINTS_COMMAND: &str = "set_breakpoints";
pub const CLEAR_BREAKPOINTS_COMMAND: &str = "clear_breakpoints";

/// Response written into a debugger queue row, read by the page waiting on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DebuggerResponse {
    Continue,
    Step,
    SetBreakpoints { breakpoints: LineIndex },
    ClearBreakpoints,
}

impl DebuggerResponse {
    pub fn name(&self) -> &'static str {
        match self {
            DebuggerResponse::Continue => CONTINUE_COMMAND,
            DebuggerResponse::Step => STEP_COMMAND,
            DebuggerResponse::SetBreakpoints { .. } => SET_BREAKPOINTS_COMMAND,
            DebuggerResponse::ClearBreakpoints => CLEAR_BREAKPOINTS_COMMAND,
        }
    }

    pub fn encode(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
