//! Instruction nodes.
//!
//! One `Instruction` is either a statement or an expression head; suffixes
//! hang off `next`. Statement bodies are plain `Vec<Instruction>`.

use std::fmt;
use std::rc::Rc;

use crate::{BinaryOp, Location, UnaryOp};

/// Identifier as written in source.
pub type Name = Rc<str>;

/// A node of the instruction tree.
#[derive(Clone, PartialEq)]
pub struct Instruction {
    pub kind: InstrKind,
    pub location: Location,
    /// Source text of the expression, shown in stack traces. Empty for
    /// synthesized nodes and for most suffix nodes.
    pub source: Rc<str>,
    /// The next suffix (`.name`, `[...]`, `(...)`) applied to this node's value.
    pub next: Option<Box<Instruction>>,
}

/// Literal constants.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    None,
}

/// A call-site argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// `expr`
    Positional(Instruction),
    /// `name=expr`
    Keyword(Name, Instruction),
}

impl Arg {
    /// The argument expression.
    pub fn value(&self) -> &Instruction {
        match self {
            Arg::Positional(value) | Arg::Keyword(_, value) => value,
        }
    }
}

/// A declared parameter, optionally with a default expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub default: Option<Instruction>,
}

/// A parameter declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    /// Positional-or-keyword parameters, in declaration order.
    pub positional: Vec<Param>,
    /// `*args` collector.
    pub varargs: Option<Name>,
    /// `**kwargs` collector.
    pub kwargs: Option<Name>,
}

impl Params {
    /// Position of a named positional parameter.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positional.iter().position(|p| &*p.name == name)
    }
}

/// `def name(params): body`
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Params,
    pub body: Vec<Instruction>,
}

/// `class name(bases): body`
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: Name,
    pub bases: Vec<Instruction>,
    pub body: Vec<Instruction>,
}

/// `except [type] [as name]: body`
#[derive(Clone, Debug, PartialEq)]
pub struct ExceptHandler {
    /// `None` for a bare `except:`.
    pub kind: Option<Instruction>,
    pub name: Option<Name>,
    pub body: Vec<Instruction>,
}

/// `try/except/else/finally`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TryBlock {
    pub body: Vec<Instruction>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Vec<Instruction>,
    pub finalbody: Vec<Instruction>,
}

/// Instruction kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum InstrKind {
    // Expression heads
    Literal(Literal),
    Name(Name),

    // Context-sensitive nodes: meaning depends on the preceding value
    /// `.name` - only valid as a suffix.
    Member(Name),
    /// `( ... )` - call, construction, or grouping/tuple.
    Parens {
        items: Vec<Arg>,
        /// Set when the source had a trailing comma, e.g. `(1,)`.
        tuple: bool,
    },
    /// `[ ... ]` - indexing or list literal.
    Brackets(Vec<Instruction>),
    /// `lower:upper:step` - only valid as the element of an index.
    Slice {
        lower: Option<Box<Instruction>>,
        upper: Option<Box<Instruction>>,
        step: Option<Box<Instruction>>,
    },
    /// `{ key: value, ... }`
    Braces(Vec<(Instruction, Instruction)>),

    // Operators
    Unary {
        op: UnaryOp,
        operand: Box<Instruction>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Instruction>,
        rhs: Box<Instruction>,
    },

    // Statements
    Assign {
        target: Box<Instruction>,
        value: Box<Instruction>,
    },
    AugAssign {
        target: Box<Instruction>,
        op: BinaryOp,
        value: Box<Instruction>,
    },
    If {
        test: Box<Instruction>,
        body: Vec<Instruction>,
        orelse: Vec<Instruction>,
    },
    While {
        test: Box<Instruction>,
        body: Vec<Instruction>,
        orelse: Vec<Instruction>,
    },
    For {
        target: Box<Instruction>,
        iter: Box<Instruction>,
        body: Vec<Instruction>,
        orelse: Vec<Instruction>,
    },
    FunctionDef(Rc<FunctionDef>),
    ClassDef(Rc<ClassDef>),
    Return(Option<Box<Instruction>>),
    Break,
    Continue,
    Pass,
    Raise(Option<Box<Instruction>>),
    Try(Rc<TryBlock>),
}

impl Instruction {
    /// Create a node with no location, source text or suffix.
    pub fn new(kind: InstrKind) -> Self {
        Instruction {
            kind,
            location: Location::DUMMY,
            source: Rc::from(""),
            next: None,
        }
    }

    /// Set the location.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.location = Location::new(line, column);
        self
    }

    /// Set the source text shown in traces.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Rc::from(source);
        self
    }

    /// Append a suffix at the end of this node's chain.
    #[must_use]
    pub fn then(mut self, suffix: Instruction) -> Self {
        let tail = match self.next.take() {
            Some(next) => (*next).then(suffix),
            None => suffix,
        };
        self.next = Some(Box::new(tail));
        self
    }

    /// The last node of the suffix chain (this node if there is none).
    pub fn last_suffix(&self) -> &Instruction {
        let mut node = self;
        while let Some(next) = node.next.as_deref() {
            node = next;
        }
        node
    }

    /// The string payload of a bare string literal.
    pub fn as_str_literal(&self) -> Option<&str> {
        match &self.kind {
            InstrKind::Literal(Literal::Str(s)) if self.next.is_none() => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Instruction");
        s.field("kind", &self.kind);
        if !self.location.is_dummy() {
            s.field("location", &self.location);
        }
        if let Some(next) = &self.next {
            s.field("next", next);
        }
        s.finish()
    }
}
