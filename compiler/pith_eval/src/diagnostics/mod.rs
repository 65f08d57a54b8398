//! Call stack tracking for trace rendering.
//!
//! This module provides:
//! - `StackFrame`: where one active call currently is (file, function, line,
//!   expression text)
//! - `CallStack`: the live, never-empty list of frames
//! - `Backtrace`: an immutable snapshot taken when an exception is raised
//!
//! Frames record the *last executed* line of their function. On a call the
//! caller's frame is updated with the call site before the callee frame is
//! pushed, so a snapshot shows every level at the exact line that was
//! running.

use std::fmt;
use std::rc::Rc;

use pith_ir::Name;

/// Function name of the root frame.
pub const MODULE_FRAME: &str = "<module>";

/// One frame of the live call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub file: Rc<str>,
    pub function: Name,
    /// Last line executed in this frame (0 before the first statement).
    pub line: u32,
    /// Source text of the last expression executed in this frame.
    pub expression: Rc<str>,
}

impl StackFrame {
    fn new(file: Rc<str>, function: Name) -> Self {
        StackFrame {
            file,
            function,
            line: 0,
            expression: Rc::from(""),
        }
    }
}

/// Live call stack.
///
/// Always holds at least the root `<module>` frame. Each function,
/// constructor or method call pushes one frame and pops it on exit; loop and
/// conditional bodies do not.
#[derive(Clone, Debug)]
pub struct CallStack {
    root: StackFrame,
    frames: Vec<StackFrame>,
}

impl CallStack {
    /// Create a stack holding only the root frame for `file`.
    pub fn new(file: &str) -> Self {
        CallStack {
            root: StackFrame::new(Rc::from(file), Rc::from(MODULE_FRAME)),
            frames: Vec::new(),
        }
    }

    fn top_mut(&mut self) -> &mut StackFrame {
        self.frames.last_mut().unwrap_or(&mut self.root)
    }

    /// Record the caller's position, then push a frame for `function`.
    ///
    /// The new frame inherits the caller's file unless `file` is given.
    pub fn add_frame(
        &mut self,
        line: u32,
        expression: Rc<str>,
        function: Name,
        file: Option<Rc<str>>,
    ) {
        let caller = self.top_mut();
        caller.line = line;
        caller.expression = expression;
        let file = file.unwrap_or_else(|| Rc::clone(&caller.file));
        self.frames.push(StackFrame::new(file, function));
    }

    /// Pop and return the top frame. The root frame is never removed.
    pub fn remove_frame(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    /// Update the top frame's current position.
    pub fn set_location(&mut self, line: u32, expression: Rc<str>) {
        let top = self.top_mut();
        top.line = line;
        top.expression = expression;
    }

    /// Number of frames, including the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }

    /// Number of active calls (frames above the root).
    #[inline]
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// The most recent frame.
    #[inline]
    pub fn current_frame(&self) -> &StackFrame {
        self.frames.last().unwrap_or(&self.root)
    }

    /// Frames from oldest to newest.
    pub fn frames(&self) -> impl Iterator<Item = &StackFrame> {
        std::iter::once(&self.root).chain(self.frames.iter())
    }

    /// Capture the current frames.
    pub fn snapshot(&self) -> Backtrace {
        Backtrace {
            frames: self.frames().cloned().collect(),
        }
    }
}

/// Immutable snapshot of the call stack, oldest frame first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Backtrace {
    frames: Vec<StackFrame>,
}

impl Backtrace {
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "Traceback (most recent call last):")?;
        for frame in &self.frames {
            writeln!(
                f,
                "  File \"{}\", line {}, in {}",
                frame.file, frame.line, frame.function
            )?;
            if !frame.expression.is_empty() {
                writeln!(f, "    {}", frame.expression)?;
            }
        }
        Ok(())
    }
}
