//! # Abstract Syntax Tree (AST) Types
//!
//! This module defines the tree built by the parser for one expression program.
//!
//! ## Type Hierarchy
//! ```text
//! Program
//!   ├── Vec<Assignment>      (every statement but the last)
//!   │     ├── name: String
//!   │     └── value: Expr
//!   └── result: Expr          (the mandatory final statement)
//!
//! Expr (enum)
//!   ├── Number(f64)
//!   ├── Ident { name, column }
//!   ├── Call { function, argument, column }
//!   ├── Unary { op, operand }
//!   └── Binary { op, left, right }
//! ```
//!
//! Identifiers and calls keep the column they were read at, so the resolver can report
//! `UndefinedSymbol` against the original text.
//!
//! ## Related Modules
//! - `parser` - Creates these types from expression text
//! - `semantic` - Resolves every name against the closed namespace
//! - `eval` - Interprets the tree over time vectors

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Plus,
    Negate,
}

/// Binary operators, all applied elementwise
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Subtract => lhs - rhs,
            BinaryOp::Multiply => lhs * rhs,
            BinaryOp::Divide => lhs / rhs,
            BinaryOp::Remainder => lhs % rhs,
            BinaryOp::Power => lhs.powf(rhs),
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ident {
        name: String,
        column: usize,
    },
    Call {
        function: String,
        argument: Box<Expr>,
        column: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Height of the tree, a leaf being 1. Walks with an explicit stack.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Number(_) | Expr::Ident { .. } => {}
                Expr::Call { argument, .. } => pending.push((argument, depth + 1)),
                Expr::Unary { operand, .. } => pending.push((operand, depth + 1)),
                Expr::Binary { left, right, .. } => {
                    pending.push((left, depth + 1));
                    pending.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub column: usize,
    pub value: Expr,
}

/// A parsed expression program: zero or more assignments, then the result expression
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub assignments: Vec<Assignment>,
    pub result: Expr,
}
