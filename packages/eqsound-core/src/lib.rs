pub mod api;
pub mod ast;
pub mod builtins;
pub mod config;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod playback;
pub mod plot;
pub mod semantic;
pub mod signal;
pub mod time;
pub mod wav;

pub use api::Session;
pub use ast::*;
pub use config::{SessionConfig, DEFAULT_EXPRESSION};
pub use error::*;
pub use eval::{evaluate, evaluate_program, AmplitudeVector, Value};
pub use parser::parse;
pub use playback::{PlaybackClip, Synchronizer};
pub use plot::{PlotFrame, PlotSurface, SvgSurface, ViewState};
pub use semantic::resolve;
pub use signal::{condition, PcmBuffer};
pub use time::TimeVector;
