//! RAII guard for call frames.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use pith_ir::Name;

use crate::diagnostics::CallStack;

/// Pushes a frame on creation and pops it on drop, so every exit path out
/// of a call (return, raise, `?`) leaves the stack balanced.
pub(crate) struct FrameGuard<'a> {
    call_stack: &'a mut CallStack,
}

impl<'a> FrameGuard<'a> {
    pub(crate) fn enter(
        call_stack: &'a mut CallStack,
        line: u32,
        expression: Rc<str>,
        function: Name,
    ) -> Self {
        call_stack.add_frame(line, expression, function, None);
        FrameGuard { call_stack }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.call_stack.remove_frame();
    }
}

impl Deref for FrameGuard<'_> {
    type Target = CallStack;

    fn deref(&self) -> &CallStack {
        self.call_stack
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut CallStack {
        self.call_stack
    }
}
