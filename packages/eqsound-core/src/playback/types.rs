//! Playback type definitions
//!
//! This module defines the playback session, the outcomes reported by the synchronizer
//! and the collaborator traits it drives.

use super::scheduler::CancelToken;
use crate::error::SignalError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Synchronizer state machine: Idle → Playing → Idle
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Everything a play action needs, rendered ahead of time
///
/// # Fields
/// - `preview`: Amplitudes over the preview span; the marker indexes into this
/// - `audio`: Encoded WAVE bytes for the (shorter) audio span, handed to the device
#[derive(Debug, Clone)]
pub struct PlaybackClip {
    pub preview: Arc<[f64]>,
    pub audio: Arc<[u8]>,
}

/// One play action, from `start` until its terminal tick or `stop`
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub(crate) start_instant: Instant,
    pub(crate) running: bool,
    pub(crate) source: Arc<[f64]>,
    pub(crate) current_index: usize,
    pub(crate) token: CancelToken,
}

impl PlaybackSession {
    pub fn start_instant(&self) -> Instant {
        self.start_instant
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Preview-domain amplitudes the marker moves across
    pub fn source(&self) -> &[f64] {
        &self.source
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Amplitude under the marker, if the source is non-empty
    pub fn current_amplitude(&self) -> Option<f64> {
        self.source.get(self.current_index).copied()
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

/// Result of a play action
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StartOutcome {
    /// A new session began
    Started,
    /// A session was already playing; nothing changed
    AlreadyPlaying,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TickOutcome {
    /// No running session; nothing happened
    Idle,
    /// Marker moved and the next tick was scheduled
    Advanced { index: usize },
    /// Audio duration reached: marker parked, session stopped, device purged
    Finished { index: usize },
}

/// Audio output collaborator
///
/// `play` must not block on playback; `purge` is a best-effort stop.
pub trait AudioDevice {
    fn play(&mut self, audio: Arc<[u8]>) -> Result<(), SignalError>;
    fn purge(&mut self);
}

/// Receives marker positions (indices into the preview amplitudes)
pub trait MarkerSink {
    fn update_marker(&mut self, index: usize);
}

/// Device that accepts every buffer and produces no sound
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDevice;

impl AudioDevice for NullDevice {
    fn play(&mut self, _audio: Arc<[u8]>) -> Result<(), SignalError> {
        Ok(())
    }

    fn purge(&mut self) {}
}

impl<F: FnMut(usize)> MarkerSink for F {
    fn update_marker(&mut self, index: usize) {
        self(index)
    }
}
