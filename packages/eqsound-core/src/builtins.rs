//! The closed namespace available to every expression.
//!
//! Nothing outside these two tables, the time variable and the caller's own assignments
//! can be referenced.

use std::f64::consts::{E, PI, TAU};

/// Reserved identifier bound to the time vector
pub const TIME_VARIABLE: &str = "t";

/// Whitelisted elementwise functions
pub const FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("exp", f64::exp),
    ("log", f64::ln),
    ("log10", f64::log10),
    ("sqrt", f64::sqrt),
    ("abs", f64::abs),
    ("sign", sign),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
];

/// Whitelisted constants
pub const CONSTANTS: &[(&str, f64)] = &[("pi", PI), ("e", E), ("tau", TAU)];

/// -1, 0 or 1; NaN stays NaN. Unlike `f64::signum`, zero maps to zero.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x
    }
}

pub fn function(name: &str) -> Option<fn(f64) -> f64> {
    FUNCTIONS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Names that can never be the target of an assignment
pub fn is_reserved(name: &str) -> bool {
    name == TIME_VARIABLE || function(name).is_some() || constant(name).is_some()
}
