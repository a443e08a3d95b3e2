//! # Error Types
//!
//! This module defines all error types for the eqsound library.
//!
//! Errors raised while reading an expression carry a 1-indexed column into the full
//! expression text (statements included), so a caller can point at the offending character.
//!
//! ## Error Types
//! - `SyntaxError` - Lexer/parser errors, missing assignments, empty input, misused functions
//! - `UndefinedSymbol` - A name outside the closed namespace was referenced
//! - `ShapeError` - A result cannot be broadcast to the time vector's length
//! - `DeviceUnavailable` - The audio collaborator refused to start playback
//! - `ContainerError` - A byte buffer is not a canonical mono 16-bit WAVE container
//! - `ConfigError` - Session configuration is missing, malformed or out of range
//!
//! Non-finite amplitudes are deliberately *not* an error: the signal conditioner repairs
//! them to silence.
//!
//! ## Usage
//! ```rust
//! use eqsound::{evaluate, SignalError, TimeVector};
//!
//! let t = TimeVector::new(100, 1.0);
//! match evaluate("sin(2*pi*q*t)", &t) {
//!     Ok(_) => unreachable!(),
//!     Err(SignalError::UndefinedSymbol { name, column }) => {
//!         assert_eq!(name, "q");
//!         assert_eq!(column, 10);
//!     }
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Syntax error with location information.
    ///
    /// # Example
    /// ```
    /// # use eqsound::SignalError;
    /// let err = SignalError::SyntaxError {
    ///     column: 4,
    ///     message: "Unexpected character '$'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Syntax error at column 4: Unexpected character '$'");
    /// ```
    #[error("Syntax error at column {column}: {message}")]
    SyntaxError { column: usize, message: String },

    /// A name that is neither whitelisted, bound by an earlier statement, nor `t`.
    #[error("Undefined symbol '{name}' at column {column}")]
    UndefinedSymbol { name: String, column: usize },

    /// The result (or an operand pair) cannot be broadcast to the expected length.
    ///
    /// # Example
    /// ```
    /// # use eqsound::SignalError;
    /// let err = SignalError::ShapeError { expected: 44100, found: 3 };
    /// assert_eq!(err.to_string(), "Shape error: expected 44100 samples (or a scalar), found 3");
    /// ```
    #[error("Shape error: expected {expected} samples (or a scalar), found {found}")]
    ShapeError { expected: usize, found: usize },

    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Invalid PCM container: {0}")]
    ContainerError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
