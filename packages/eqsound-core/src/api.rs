//! # Public API
//!
//! A [`Session`] holds the two time axes derived from a [`SessionConfig`] and offers one
//! method per user action.
//!
//! ## Actions
//!
//! - [`Session::render_plot()`] - Evaluate over the preview axis and hand a frame to a plot surface
//! - [`Session::render_audio()`] - Evaluate over the audio axis and condition to PCM
//! - [`Session::render_wav()`] - As above, encoded as a WAVE container
//! - [`Session::prepare_playback()`] - Everything the synchronizer needs for one play action
//!
//! Each action evaluates from scratch. An error aborts only that action; the session
//! itself holds no per-expression state and stays usable.
//!
//! ## Typical Usage
//!
//! ```rust
//! use eqsound::{Session, SessionConfig, SvgSurface, ViewState};
//!
//! let session = Session::new(SessionConfig::default())?;
//!
//! let mut surface = SvgSurface::new(800, 400, "Signal over time (0 to 15 s)");
//! session.render_plot("0.5*sin(2*pi*3*t)", ViewState::default(), &mut surface)?;
//! assert!(surface.document().contains("<polyline"));
//!
//! let wav = session.render_wav("0.5*sin(2*pi*3*t)")?;
//! assert_eq!(&wav[0..4], b"RIFF");
//! # Ok::<(), eqsound::SignalError>(())
//! ```

use crate::config::SessionConfig;
use crate::error::SignalError;
use crate::eval::{evaluate, AmplitudeVector};
use crate::playback::PlaybackClip;
use crate::plot::{PlotFrame, PlotSurface, ViewState};
use crate::signal::PcmBuffer;
use crate::time::TimeVector;
use crate::wav;
use std::sync::Arc;
use tracing::debug;

/// Time axes and settings shared by every action of one user session
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    preview_time: TimeVector,
    audio_time: TimeVector,
}

impl Session {
    /// Validate `config` and sample both time axes.
    ///
    /// # Errors
    /// `ConfigError` if the configuration is out of range.
    pub fn new(config: SessionConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let preview_time = TimeVector::new(config.sample_rate, config.preview_duration);
        let audio_time = TimeVector::new(config.sample_rate, config.audio_duration);
        debug!(
            preview_samples = preview_time.len(),
            audio_samples = audio_time.len(),
            "session created"
        );
        Ok(Self {
            config,
            preview_time,
            audio_time,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Long axis used for the plot and the playback marker
    pub fn preview_time(&self) -> &TimeVector {
        &self.preview_time
    }

    /// Short axis rendered to sound
    pub fn audio_time(&self) -> &TimeVector {
        &self.audio_time
    }

    pub fn evaluate_preview(&self, expression: &str) -> Result<AmplitudeVector, SignalError> {
        evaluate(expression, &self.preview_time)
    }

    pub fn evaluate_audio(&self, expression: &str) -> Result<AmplitudeVector, SignalError> {
        evaluate(expression, &self.audio_time)
    }

    /// Plot action: evaluate over the preview axis and render one frame without a marker
    pub fn render_plot(
        &self,
        expression: &str,
        view: ViewState,
        surface: &mut impl PlotSurface,
    ) -> Result<(), SignalError> {
        let amplitude = self.evaluate_preview(expression)?;
        surface.render(&PlotFrame::new(
            self.preview_time.as_slice(),
            &amplitude,
            view,
            None,
        ));
        Ok(())
    }

    /// Conditioned PCM for the audio axis
    pub fn render_audio(&self, expression: &str) -> Result<PcmBuffer, SignalError> {
        let amplitude = self.evaluate_audio(expression)?;
        Ok(PcmBuffer::from_amplitudes(&amplitude, self.config.sample_rate))
    }

    /// Conditioned PCM for the audio axis, encoded as a WAVE container
    pub fn render_wav(&self, expression: &str) -> Result<Vec<u8>, SignalError> {
        wav::encode(&self.render_audio(expression)?)
    }

    /// Play action preparation: preview amplitudes for the marker plus encoded audio.
    ///
    /// The expression is evaluated independently over each axis.
    pub fn prepare_playback(&self, expression: &str) -> Result<PlaybackClip, SignalError> {
        let preview: Arc<[f64]> = self.evaluate_preview(expression)?.into();
        let audio: Arc<[u8]> = self.render_wav(expression)?.into();
        Ok(PlaybackClip { preview, audio })
    }
}
