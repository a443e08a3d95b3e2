//! Playback synchronizer
//!
//! Maps elapsed playback time to an index into the preview amplitudes and drives the
//! marker at a fixed cadence while the device plays the rendered clip.

use super::scheduler::{CancelToken, Clock, Scheduler, TimerQueue};
use super::types::{
    AudioDevice, MarkerSink, PlaybackClip, PlaybackSession, PlaybackState, StartOutcome, TickOutcome,
};
use crate::config::SessionConfig;
use crate::error::SignalError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// Sample index for `elapsed_secs` of playback, clamped to the last sample of a
/// `len`-sample source (0 for an empty source)
pub fn sample_index(elapsed_secs: f64, sample_rate: u32, len: usize) -> usize {
    let raw = (elapsed_secs * sample_rate as f64).floor();
    let last = len.saturating_sub(1);
    if raw.is_finite() && raw > 0.0 {
        (raw as usize).min(last)
    } else {
        0
    }
}

/// Drives one marker against one audio device, with at most one session playing.
///
/// # Timing
/// - `start` records the start instant, hands the clip to the device and schedules the
///   first tick
/// - each `tick` moves the marker to `floor(elapsed × sample_rate)` and schedules the next
/// - once `elapsed ≥ audio_duration` the marker is parked at
///   `min(floor(audio_duration × sample_rate), len - 1)`, the session stops and the
///   device is purged
///
/// Indices always refer to the preview amplitudes, which span longer than the clip.
pub struct Synchronizer<D: AudioDevice, M: MarkerSink> {
    sample_rate: u32,
    audio_duration: f64,
    tick_interval: Duration,
    device: D,
    marker: M,
    session: Option<PlaybackSession>,
}

impl<D: AudioDevice, M: MarkerSink> Synchronizer<D, M> {
    pub fn new(config: &SessionConfig, device: D, marker: M) -> Self {
        Self {
            sample_rate: config.sample_rate,
            audio_duration: config.audio_duration,
            tick_interval: config.tick_interval(),
            device,
            marker,
            session: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match &self.session {
            Some(session) if session.running => PlaybackState::Playing,
            _ => PlaybackState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Current or most recent session
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn marker(&self) -> &M {
        &self.marker
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Begin a session at `now`.
    ///
    /// Returns `AlreadyPlaying` without touching any state if a session is running.
    ///
    /// # Errors
    /// `DeviceUnavailable` if the device refuses the clip; the synchronizer stays Idle.
    pub fn start(
        &mut self,
        clip: &PlaybackClip,
        now: Instant,
        scheduler: &mut impl Scheduler,
    ) -> Result<StartOutcome, SignalError> {
        if self.is_playing() {
            trace!("play requested while already playing; ignored");
            return Ok(StartOutcome::AlreadyPlaying);
        }

        if let Err(e) = self.device.play(Arc::clone(&clip.audio)) {
            warn!(error = %e, "audio device refused playback");
            return Err(match e {
                SignalError::DeviceUnavailable(_) => e,
                other => SignalError::DeviceUnavailable(other.to_string()),
            });
        }

        let token = CancelToken::new();
        self.session = Some(PlaybackSession {
            start_instant: now,
            running: true,
            source: Arc::clone(&clip.preview),
            current_index: 0,
            token: token.clone(),
        });
        scheduler.schedule_after(self.tick_interval, token);

        info!(
            audio_bytes = clip.audio.len(),
            preview_samples = clip.preview.len(),
            duration = self.audio_duration,
            "playback started"
        );
        Ok(StartOutcome::Started)
    }

    /// Advance the marker to `now`. A no-op unless a session is running.
    pub fn tick(&mut self, now: Instant, scheduler: &mut impl Scheduler) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };
        if !session.running {
            return TickOutcome::Idle;
        }

        let elapsed = now.saturating_duration_since(session.start_instant).as_secs_f64();
        let len = session.source.len();

        if elapsed >= self.audio_duration {
            let index = sample_index(self.audio_duration, self.sample_rate, len);
            session.current_index = index;
            session.running = false;
            session.token.cancel();
            self.marker.update_marker(index);
            self.device.purge();
            info!(index, "playback finished");
            return TickOutcome::Finished { index };
        }

        let index = sample_index(elapsed, self.sample_rate, len);
        session.current_index = index;
        self.marker.update_marker(index);
        scheduler.schedule_after(self.tick_interval, session.token.clone());
        trace!(index, elapsed, "marker advanced");
        TickOutcome::Advanced { index }
    }

    /// Explicit stop. Cancels pending ticks and asks the device to purge.
    ///
    /// Returns `false` if nothing was playing.
    pub fn stop(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.running => {
                session.running = false;
                session.token.cancel();
                self.device.purge();
                info!(index = session.current_index, "playback stopped");
                true
            }
            _ => false,
        }
    }
}

/// Run the cooperative event loop until no live timers remain.
///
/// Each due timer triggers exactly one `tick`; ticks never overlap. Every pass re-reads
/// the clock, so a tick that reschedules itself at an instant already past still lets time
/// advance before it fires. Returns the outcome of
/// the last tick that ran.
pub fn run_until_idle<D, M, C>(
    synchronizer: &mut Synchronizer<D, M>,
    queue: &mut TimerQueue,
    clock: &mut C,
) -> TickOutcome
where
    D: AudioDevice,
    M: MarkerSink,
    C: Clock,
{
    let mut last = TickOutcome::Idle;
    while let Some(deadline) = queue.next_deadline() {
        clock.sleep_until(deadline);
        let now = clock.now();
        for token in queue.take_due(now) {
            if token.is_cancelled() {
                continue;
            }
            last = synchronizer.tick(now, queue);
        }
    }
    last
}
