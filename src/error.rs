use eqsound::SignalError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the user, one line each
#[derive(Error, Debug)]
pub enum CliError {
    /// A plot request failed
    #[error("Error evaluating expression: {0}")]
    Evaluation(#[source] SignalError),

    /// A render or play request failed
    #[error("Error generating audio: {0}")]
    Audio(#[source] SignalError),

    #[error("{0}")]
    Config(#[source] SignalError),

    #[error("Error writing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
