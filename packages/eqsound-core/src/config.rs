//! Session configuration.
//!
//! Every field has a default, so an empty YAML document is a valid configuration:
//!
//! ```yaml
//! sample_rate: 44100
//! preview_duration: 15.0
//! audio_duration: 3.0
//! tick_interval_ms: 16.667
//! view:
//!   y_scale_exp: 0
//!   x_scale_exp: 1
//! ```

use crate::error::SignalError;
use crate::plot::{ViewState, MAX_SCALE_EXP, MIN_SCALE_EXP};
use crate::time::sample_count;
use crate::wav::MAX_SAMPLES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_PREVIEW_DURATION: f64 = 15.0;
pub const DEFAULT_AUDIO_DURATION: f64 = 3.0;
/// Marker cadence, 60 updates per second
pub const DEFAULT_TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;
pub const DEFAULT_EXPRESSION: &str = "sin(2*pi*220*t)";
pub const MIN_TICK_INTERVAL_MS: f64 = 1.0;
pub const MAX_TICK_INTERVAL_MS: f64 = 60_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub sample_rate: u32,
    /// Span of the preview plot in seconds
    pub preview_duration: f64,
    /// Length of the rendered audio clip in seconds
    pub audio_duration: f64,
    pub tick_interval_ms: f64,
    pub view: ViewState,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            preview_duration: DEFAULT_PREVIEW_DURATION,
            audio_duration: DEFAULT_AUDIO_DURATION,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            view: ViewState::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self, SignalError> {
        let config: SessionConfig = if content.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| SignalError::ConfigError(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SignalError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SignalError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> Result<String, SignalError> {
        serde_yaml::to_string(self).map_err(|e| SignalError::ConfigError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), SignalError> {
        if self.sample_rate == 0 {
            return Err(SignalError::ConfigError("sample_rate must be positive".to_string()));
        }
        for (name, duration) in [
            ("preview_duration", self.preview_duration),
            ("audio_duration", self.audio_duration),
        ] {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(SignalError::ConfigError(format!(
                    "{} must be a positive number, got {}",
                    name, duration
                )));
            }
            let samples = sample_count(self.sample_rate, duration);
            if samples > MAX_SAMPLES {
                return Err(SignalError::ConfigError(format!(
                    "{} of {} s at {} Hz needs {} samples, more than the {} a WAVE file can hold",
                    name, duration, self.sample_rate, samples, MAX_SAMPLES
                )));
            }
        }
        // Also rejects NaN
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(SignalError::ConfigError(format!(
                "tick_interval_ms must lie in [{}, {}], got {}",
                MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS, self.tick_interval_ms
            )));
        }
        if !self.view.is_valid() {
            return Err(SignalError::ConfigError(format!(
                "view scale exponents must lie in [{}, {}], got y={} x={}",
                MIN_SCALE_EXP, MAX_SCALE_EXP, self.view.y_scale_exp, self.view.x_scale_exp
            )));
        }
        Ok(())
    }

    /// Marker cadence, clamped to the accepted range even for unvalidated configs
    pub fn tick_interval(&self) -> Duration {
        let ms = self.tick_interval_ms.clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS);
        Duration::try_from_secs_f64(ms / 1000.0)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TICK_INTERVAL_MS / 1000.0))
    }
}
