//! # Name Resolution Module
//!
//! This module checks a parsed [`Program`] against the closed namespace before any
//! arithmetic runs.
//!
//! ## Purpose
//! A program may be syntactically valid but still reach outside the sandbox. Resolution
//! walks every statement in order and rejects:
//! - References to names that are not whitelisted, not `t` and not bound by an *earlier*
//!   assignment (`UndefinedSymbol`)
//! - Function names used as values, e.g. `sin + 1` (`SyntaxError`)
//! - Calls on names that are not functions, e.g. `pi(t)` (`SyntaxError`)
//! - Assignments to `t`, a constant or a function (`SyntaxError`)
//!
//! Because this runs ahead of evaluation, a bad name in the last statement is reported
//! even when earlier statements would have been expensive to evaluate.
//!
//! ## Entry Point
//! `resolve(program: &Program) -> Result<(), SignalError>`
//!
//! ## Example
//! ```rust
//! use eqsound::{parse, resolve, SignalError};
//!
//! let program = parse("A = 2; A*B").unwrap();
//! assert!(matches!(
//!     resolve(&program),
//!     Err(SignalError::UndefinedSymbol { ref name, .. }) if name == "B"
//! ));
//! ```

use crate::ast::*;
use crate::builtins::{self, TIME_VARIABLE};
use crate::error::SignalError;
use std::collections::HashSet;

/// Resolve every name in a program
pub fn resolve(program: &Program) -> Result<(), SignalError> {
    let mut bound: HashSet<&str> = HashSet::new();

    for assignment in &program.assignments {
        resolve_expr(&assignment.value, &bound)?;
        if builtins::is_reserved(&assignment.name) {
            return Err(SignalError::SyntaxError {
                column: assignment.column,
                message: format!("Cannot assign to reserved name '{}'", assignment.name),
            });
        }
        bound.insert(assignment.name.as_str());
    }

    resolve_expr(&program.result, &bound)
}

fn is_value_name(name: &str, bound: &HashSet<&str>) -> bool {
    bound.contains(name) || name == TIME_VARIABLE || builtins::constant(name).is_some()
}

fn resolve_expr(expr: &Expr, bound: &HashSet<&str>) -> Result<(), SignalError> {
    match expr {
        Expr::Number(_) => Ok(()),
        Expr::Ident { name, column } => {
            if is_value_name(name, bound) {
                Ok(())
            } else if builtins::function(name).is_some() {
                Err(SignalError::SyntaxError {
                    column: *column,
                    message: format!("Function '{}' must be called, e.g. {}(t)", name, name),
                })
            } else {
                Err(SignalError::UndefinedSymbol {
                    name: name.clone(),
                    column: *column,
                })
            }
        }
        Expr::Call {
            function,
            argument,
            column,
        } => {
            if builtins::function(function).is_none() {
                if is_value_name(function, bound) {
                    return Err(SignalError::SyntaxError {
                        column: *column,
                        message: format!("'{}' is not a function", function),
                    });
                }
                return Err(SignalError::UndefinedSymbol {
                    name: function.clone(),
                    column: *column,
                });
            }
            resolve_expr(argument, bound)
        }
        Expr::Unary { operand, .. } => resolve_expr(operand, bound),
        Expr::Binary { left, right, .. } => {
            resolve_expr(left, bound)?;
            resolve_expr(right, bound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> Result<(), SignalError> {
        resolve(&parse(source)?)
    }

    #[test]
    fn test_whitelist_resolves() {
        assert!(check("sin(2*pi*220*t) + e - tau + log10(abs(t) + 1)").is_ok());
    }

    #[test]
    fn test_bound_variables_resolve_in_order() {
        assert!(check("A = 0.5; f = 2*A; A*sin(f*t)").is_ok());
    }

    #[test]
    fn test_variable_rebinding_allowed() {
        assert!(check("A = 1; A = A + 1; A").is_ok());
    }

    #[test]
    fn test_undefined_symbol() {
        match check("x") {
            Err(SignalError::UndefinedSymbol { name, column }) => {
                assert_eq!(name, "x");
                assert_eq!(column, 1);
            }
            other => panic!("expected undefined symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_reference_is_undefined() {
        assert!(matches!(
            check("A = B; B = 1; A"),
            Err(SignalError::UndefinedSymbol { ref name, .. }) if name == "B"
        ));
    }

    #[test]
    fn test_self_reference_without_prior_binding() {
        assert!(matches!(
            check("A = A + 1; A"),
            Err(SignalError::UndefinedSymbol { .. })
        ));
    }

    #[test]
    fn test_escape_hatches_are_undefined() {
        for source in ["np.sin(t)", "__import__(t)", "open(t)", "eval(t)"] {
            // `np.sin` fails in the lexer, the rest fail resolution
            assert!(check(source).is_err(), "{} should be rejected", source);
        }
        assert!(matches!(
            check("open(t)"),
            Err(SignalError::UndefinedSymbol { ref name, .. }) if name == "open"
        ));
    }

    #[test]
    fn test_function_used_as_value() {
        assert!(matches!(check("sin + 1"), Err(SignalError::SyntaxError { .. })));
    }

    #[test]
    fn test_call_on_non_function() {
        assert!(matches!(check("pi(t)"), Err(SignalError::SyntaxError { .. })));
        assert!(matches!(check("A = 1; A(t)"), Err(SignalError::SyntaxError { .. })));
    }

    #[test]
    fn test_reserved_assignment_targets() {
        for source in ["t = 1; t", "pi = 3; pi", "sin = 1; t"] {
            assert!(
                matches!(check(source), Err(SignalError::SyntaxError { .. })),
                "{} should be rejected",
                source
            );
        }
    }
}
