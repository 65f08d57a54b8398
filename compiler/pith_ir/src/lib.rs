//! Pith IR - the instruction tree executed by `pith_eval`.
//!
//! This crate contains the data structures handed to the engine by the
//! (external) parser:
//! - `Location` for diagnostics (line and column)
//! - `Instruction` nodes with their `next` suffix chain
//! - Operator enums shared by the parser and the evaluator
//! - A construction DSL (`build`) for hosts and tests that assemble trees by hand
//!
//! # Suffix Chains
//!
//! Member access, indexing and calls are not nested expressions. The parser
//! emits the head of an expression (`a`) and links each suffix through
//! `next` (`a` → `[0]` → `.b` → `()`). The evaluator threads the value of one
//! node into the next as its *context*, which is what decides whether a
//! parenthesis is a call, a constructor or a grouping.
//!
//! Trees are immutable once built. Function and class bodies are `Rc`-shared
//! so that runtime values can hold on to them without copying.

pub mod build;
mod instruction;
mod location;
mod operators;

pub use instruction::{
    Arg, ClassDef, ExceptHandler, FunctionDef, InstrKind, Instruction, Literal, Name, Param,
    Params, TryBlock,
};
pub use location::Location;
pub use operators::{BinaryOp, UnaryOp};
