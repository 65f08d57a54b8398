//! Loop control.

use crate::unwind::{ControlAction, ExecResult};

/// What a loop does after one iteration of its body.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopAction {
    /// Run the next iteration (normal completion or `continue`).
    Next,
    /// Leave the loop, skipping its `else` block.
    Break,
}

/// Absorb `break`/`continue` from a loop body; anything else keeps unwinding.
pub fn to_loop_action(result: ExecResult<()>) -> ExecResult<LoopAction> {
    match result {
        Ok(()) | Err(ControlAction::Continue) => Ok(LoopAction::Next),
        Err(ControlAction::Break) => Ok(LoopAction::Break),
        Err(action @ (ControlAction::Return(_) | ControlAction::Raise(_))) => Err(action),
    }
}
