//! # Evaluation Module
//!
//! Interprets a resolved [`Program`] over a [`TimeVector`].
//!
//! ## Values
//! Every sub-expression evaluates to either a scalar or a vector the length of the time
//! axis. Arithmetic broadcasts a scalar operand across a vector one; two vectors must
//! have equal lengths.
//!
//! ## Scope
//! Each call starts from a fresh scope holding the constants, the functions and `t`.
//! Assignments add bindings visible to later statements and are discarded when the call
//! returns. Nothing is cached between calls.
//!
//! ## Result Shape
//! The final value is coerced to exactly `time.len()` samples:
//! - a vector of that length is used as-is
//! - a scalar or a single-sample vector is replicated
//! - anything else is a `ShapeError`
//!
//! ## Example
//! ```rust
//! use eqsound::{evaluate, TimeVector};
//!
//! let t = TimeVector::new(8000, 0.5);
//! let y = evaluate("A = 0.25; A*cos(tau*100*t)", &t).unwrap();
//! assert_eq!(y.len(), t.len());
//! assert_eq!(y[0], 0.25);
//! ```

use crate::ast::*;
use crate::builtins::{self, TIME_VARIABLE};
use crate::error::SignalError;
use crate::parser::parse;
use crate::semantic::resolve;
use crate::time::TimeVector;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Amplitude samples, one per time sample
pub type AmplitudeVector = Vec<f64>;

/// Intermediate value of an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Arc<[f64]>),
}

impl Value {
    fn map(&self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(x) => Value::Scalar(f(*x)),
            Value::Vector(xs) => Value::Vector(xs.iter().map(|&x| f(x)).collect()),
        }
    }

    fn zip(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> Result<Value, SignalError> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b))),
            (Value::Scalar(a), Value::Vector(bs)) => {
                Ok(Value::Vector(bs.iter().map(|&b| f(*a, b)).collect()))
            }
            (Value::Vector(xs), Value::Scalar(b)) => {
                Ok(Value::Vector(xs.iter().map(|&a| f(a, *b)).collect()))
            }
            (Value::Vector(xs), Value::Vector(ys)) => {
                if xs.len() != ys.len() {
                    return Err(SignalError::ShapeError {
                        expected: xs.len(),
                        found: ys.len(),
                    });
                }
                Ok(Value::Vector(
                    xs.iter().zip(ys.iter()).map(|(&a, &b)| f(a, b)).collect(),
                ))
            }
        }
    }

    /// Broadcast to exactly `len` samples
    pub fn into_amplitudes(self, len: usize) -> Result<AmplitudeVector, SignalError> {
        match self {
            Value::Scalar(x) => Ok(vec![x; len]),
            Value::Vector(xs) if xs.len() == len => Ok(xs.to_vec()),
            Value::Vector(xs) if xs.len() == 1 => Ok(vec![xs[0]; len]),
            Value::Vector(xs) => Err(SignalError::ShapeError {
                expected: len,
                found: xs.len(),
            }),
        }
    }
}

/// Tree-walking interpreter with a per-call scope
struct Interpreter<'a> {
    time: &'a TimeVector,
    bindings: HashMap<&'a str, Value>,
}

impl<'a> Interpreter<'a> {
    fn new(time: &'a TimeVector) -> Self {
        Self {
            time,
            bindings: HashMap::new(),
        }
    }

    fn lookup(&self, name: &str, column: usize) -> Result<Value, SignalError> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        if name == TIME_VARIABLE {
            return Ok(Value::Vector(self.time.shared()));
        }
        if let Some(value) = builtins::constant(name) {
            return Ok(Value::Scalar(value));
        }
        Err(SignalError::UndefinedSymbol {
            name: name.to_string(),
            column,
        })
    }

    fn eval(&self, expr: &Expr) -> Result<Value, SignalError> {
        match expr {
            Expr::Number(value) => Ok(Value::Scalar(*value)),
            Expr::Ident { name, column } => self.lookup(name, *column),
            Expr::Call {
                function,
                argument,
                column,
            } => {
                let f = builtins::function(function).ok_or_else(|| SignalError::UndefinedSymbol {
                    name: function.clone(),
                    column: *column,
                })?;
                Ok(self.eval(argument)?.map(f))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Negate => value.map(|x| -x),
                })
            }
            Expr::Binary { op, left, right } => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                lhs.zip(&rhs, |a, b| op.apply(a, b))
            }
        }
    }

    fn run(mut self, program: &'a Program) -> Result<Value, SignalError> {
        for assignment in &program.assignments {
            let value = self.eval(&assignment.value)?;
            self.bindings.insert(assignment.name.as_str(), value);
        }
        self.eval(&program.result)
    }
}

/// Evaluate expression text over a time vector.
///
/// Parses, resolves and interprets from scratch on every call.
///
/// # Errors
/// - `SyntaxError` for malformed text, a non-final statement without `=`, or empty input
/// - `UndefinedSymbol` for any name outside the closed namespace
/// - `ShapeError` when the result cannot be broadcast to `time.len()`
pub fn evaluate(source: &str, time: &TimeVector) -> Result<AmplitudeVector, SignalError> {
    let program = parse(source)?;
    resolve(&program)?;
    debug!(
        statements = program.assignments.len() + 1,
        samples = time.len(),
        "evaluating expression"
    );
    evaluate_program(&program, time)
}

/// Interpret an already parsed and resolved program
pub fn evaluate_program(program: &Program, time: &TimeVector) -> Result<AmplitudeVector, SignalError> {
    Interpreter::new(time)
        .run(program)?
        .into_amplitudes(time.len())
}
