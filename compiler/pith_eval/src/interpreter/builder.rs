//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use crate::print_handler::{stdout_handler, SharedPrintHandler};

/// Builder for creating Interpreter instances.
///
/// Defaults: output goes to stdout, calls nest at most
/// `DEFAULT_MAX_CALL_DEPTH` deep, and traces name the file `<script>`.
pub struct InterpreterBuilder {
    print_handler: Option<SharedPrintHandler>,
    max_call_depth: Option<usize>,
    file_name: Rc<str>,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            print_handler: None,
            max_call_depth: Some(DEFAULT_MAX_CALL_DEPTH),
            file_name: Rc::from("<script>"),
        }
    }

    /// Set where `print` writes.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Limit how deep user calls may nest. `None` removes the limit.
    #[must_use]
    pub fn max_call_depth(mut self, limit: Option<usize>) -> Self {
        self.max_call_depth = limit;
        self
    }

    /// File name reported by `new_call_stack`.
    #[must_use]
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Rc::from(name);
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            max_call_depth: self.max_call_depth,
            file_name: self.file_name,
            handling: RefCell::new(Vec::new()),
        }
    }
}
