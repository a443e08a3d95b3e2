//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use eqsound::{SessionConfig, ViewState, DEFAULT_EXPRESSION};
use std::path::PathBuf;

use crate::error::CliError;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "eqsound")]
#[command(about = "Type a formula in t, see it plotted, hear it played", long_about = None)]
pub struct Args {
    /// YAML session configuration (sample rate, durations, tick interval, view)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured sample rate
    #[arg(long, global = true, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Y axis scale exponent: limits are ±10^N
    #[arg(long, global = true, value_name = "N", allow_negative_numbers = true,
          value_parser = clap::value_parser!(i32).range(-3..=3))]
    pub y_scale: Option<i32>,

    /// X axis scale exponent: limits are 0..10^N seconds
    #[arg(long, global = true, value_name = "N", allow_negative_numbers = true,
          value_parser = clap::value_parser!(i32).range(-3..=3))]
    pub x_scale: Option<i32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the preview plot to an SVG file
    Plot {
        /// Expression in t, statements separated by ';'
        #[arg(default_value = DEFAULT_EXPRESSION)]
        expression: String,

        #[arg(long, short, default_value = "plot.svg")]
        out: PathBuf,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 400)]
        height: u32,
    },

    /// Render the audio clip to a WAV file
    Render {
        /// Expression in t, statements separated by ';'
        #[arg(default_value = DEFAULT_EXPRESSION)]
        expression: String,

        #[arg(long, short, default_value = "tone.wav")]
        out: PathBuf,
    },

    /// Play the clip (speakers with the `sound` feature) and follow it with a live marker
    Play {
        /// Expression in t, statements separated by ';'
        #[arg(default_value = DEFAULT_EXPRESSION)]
        expression: String,

        /// Where the clip is written when there is no sound output
        #[arg(long, short, default_value = "tone.wav")]
        out: PathBuf,
    },
}

impl Args {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn session_config(&self) -> Result<SessionConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_path(path).map_err(CliError::Config)?,
            None => SessionConfig::default(),
        };

        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        config.view = ViewState::new(
            self.y_scale.unwrap_or(config.view.y_scale_exp),
            self.x_scale.unwrap_or(config.view.x_scale_exp),
        );

        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }
}
