//! Execution helpers shared by the interpreter.
//!
//! - `args`: binding call-site arguments to declared parameters
//! - `control`: loop handling of unwinds

pub mod args;
pub mod control;
