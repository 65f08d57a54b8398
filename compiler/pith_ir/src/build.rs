//! Construction helpers for instruction trees.
//!
//! The engine never parses source. Hosts that generate code, and the test
//! suites, assemble trees with these functions instead:
//!
//! ```
//! use pith_ir::build::{assign, call, name, num, positional};
//!
//! // y = f(1)
//! let stmt = assign(name("y"), name("f").then(call(vec![positional(num(1.0))])));
//! # let _ = stmt;
//! ```

use std::rc::Rc;

use crate::{
    Arg, BinaryOp, ClassDef, ExceptHandler, FunctionDef, InstrKind, Instruction, Literal, Param,
    Params, TryBlock, UnaryOp,
};

fn boxed(instr: Instruction) -> Box<Instruction> {
    Box::new(instr)
}

// Literals and names

pub fn num(value: f64) -> Instruction {
    Instruction::new(InstrKind::Literal(Literal::Number(value)))
}

pub fn int(value: i64) -> Instruction {
    num(value as f64)
}

pub fn string(value: &str) -> Instruction {
    Instruction::new(InstrKind::Literal(Literal::Str(Rc::from(value))))
}

pub fn boolean(value: bool) -> Instruction {
    Instruction::new(InstrKind::Literal(Literal::Bool(value)))
}

pub fn none() -> Instruction {
    Instruction::new(InstrKind::Literal(Literal::None))
}

pub fn name(ident: &str) -> Instruction {
    Instruction::new(InstrKind::Name(Rc::from(ident)))
}

// Suffixes and containers

/// `.ident` suffix.
pub fn member(ident: &str) -> Instruction {
    Instruction::new(InstrKind::Member(Rc::from(ident)))
}

/// `( args )` suffix.
pub fn call(args: Vec<Arg>) -> Instruction {
    Instruction::new(InstrKind::Parens {
        items: args,
        tuple: false,
    })
}

/// Grouping parentheses: `(a)` is `a`, `(a, b)` is a tuple.
pub fn paren(items: Vec<Instruction>) -> Instruction {
    Instruction::new(InstrKind::Parens {
        items: items.into_iter().map(Arg::Positional).collect(),
        tuple: false,
    })
}

/// Explicit tuple: `(a,)`.
pub fn tuple(items: Vec<Instruction>) -> Instruction {
    Instruction::new(InstrKind::Parens {
        items: items.into_iter().map(Arg::Positional).collect(),
        tuple: true,
    })
}

/// `[ key ]` suffix.
pub fn index(key: Instruction) -> Instruction {
    Instruction::new(InstrKind::Brackets(vec![key]))
}

/// `[ a, b, ... ]` list literal.
pub fn list(items: Vec<Instruction>) -> Instruction {
    Instruction::new(InstrKind::Brackets(items))
}

/// `lower:upper:step`, for use inside `index`.
pub fn slice(
    lower: Option<Instruction>,
    upper: Option<Instruction>,
    step: Option<Instruction>,
) -> Instruction {
    Instruction::new(InstrKind::Slice {
        lower: lower.map(boxed),
        upper: upper.map(boxed),
        step: step.map(boxed),
    })
}

/// `{ key: value, ... }`
pub fn dict(pairs: Vec<(Instruction, Instruction)>) -> Instruction {
    Instruction::new(InstrKind::Braces(pairs))
}

// Operators

pub fn binary(op: BinaryOp, lhs: Instruction, rhs: Instruction) -> Instruction {
    Instruction::new(InstrKind::Binary {
        op,
        lhs: boxed(lhs),
        rhs: boxed(rhs),
    })
}

pub fn unary(op: UnaryOp, operand: Instruction) -> Instruction {
    Instruction::new(InstrKind::Unary {
        op,
        operand: boxed(operand),
    })
}

// Statements

pub fn assign(target: Instruction, value: Instruction) -> Instruction {
    Instruction::new(InstrKind::Assign {
        target: boxed(target),
        value: boxed(value),
    })
}

pub fn aug_assign(target: Instruction, op: BinaryOp, value: Instruction) -> Instruction {
    Instruction::new(InstrKind::AugAssign {
        target: boxed(target),
        op,
        value: boxed(value),
    })
}

pub fn if_stmt(test: Instruction, body: Vec<Instruction>, orelse: Vec<Instruction>) -> Instruction {
    Instruction::new(InstrKind::If {
        test: boxed(test),
        body,
        orelse,
    })
}

pub fn while_loop(
    test: Instruction,
    body: Vec<Instruction>,
    orelse: Vec<Instruction>,
) -> Instruction {
    Instruction::new(InstrKind::While {
        test: boxed(test),
        body,
        orelse,
    })
}

pub fn for_loop(
    target: Instruction,
    iter: Instruction,
    body: Vec<Instruction>,
    orelse: Vec<Instruction>,
) -> Instruction {
    Instruction::new(InstrKind::For {
        target: boxed(target),
        iter: boxed(iter),
        body,
        orelse,
    })
}

pub fn def_function(ident: &str, params: Params, body: Vec<Instruction>) -> Instruction {
    Instruction::new(InstrKind::FunctionDef(Rc::new(FunctionDef {
        name: Rc::from(ident),
        params,
        body,
    })))
}

pub fn def_class(ident: &str, bases: Vec<Instruction>, body: Vec<Instruction>) -> Instruction {
    Instruction::new(InstrKind::ClassDef(Rc::new(ClassDef {
        name: Rc::from(ident),
        bases,
        body,
    })))
}

pub fn return_stmt(value: Option<Instruction>) -> Instruction {
    Instruction::new(InstrKind::Return(value.map(boxed)))
}

pub fn break_stmt() -> Instruction {
    Instruction::new(InstrKind::Break)
}

pub fn continue_stmt() -> Instruction {
    Instruction::new(InstrKind::Continue)
}

pub fn pass_stmt() -> Instruction {
    Instruction::new(InstrKind::Pass)
}

pub fn raise_stmt(value: Option<Instruction>) -> Instruction {
    Instruction::new(InstrKind::Raise(value.map(boxed)))
}

pub fn try_stmt(block: TryBlock) -> Instruction {
    Instruction::new(InstrKind::Try(Rc::new(block)))
}

/// `except kind as ident: body`
pub fn except(kind: Option<Instruction>, ident: Option<&str>, body: Vec<Instruction>) -> ExceptHandler {
    ExceptHandler {
        kind,
        name: ident.map(Rc::from),
        body,
    }
}

// Arguments and parameters

pub fn positional(value: Instruction) -> Arg {
    Arg::Positional(value)
}

pub fn keyword(ident: &str, value: Instruction) -> Arg {
    Arg::Keyword(Rc::from(ident), value)
}

pub fn param(ident: &str) -> Param {
    Param {
        name: Rc::from(ident),
        default: None,
    }
}

pub fn param_default(ident: &str, default: Instruction) -> Param {
    Param {
        name: Rc::from(ident),
        default: Some(default),
    }
}

/// Positional parameters without collectors.
pub fn params(positional: Vec<Param>) -> Params {
    Params {
        positional,
        varargs: None,
        kwargs: None,
    }
}

impl Params {
    /// Add a `*ident` collector.
    #[must_use]
    pub fn with_varargs(mut self, ident: &str) -> Self {
        self.varargs = Some(Rc::from(ident));
        self
    }

    /// Add a `**ident` collector.
    #[must_use]
    pub fn with_kwargs(mut self, ident: &str) -> Self {
        self.kwargs = Some(Rc::from(ident));
        self
    }
}
