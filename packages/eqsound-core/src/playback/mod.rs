//! # Playback Module
//!
//! Keep a visual marker in step with audio playback.
//!
//! ## Purpose
//! When the user presses play, the rendered clip goes to the audio device and a marker
//! starts moving across the preview waveform. This module owns that marker's timing.
//!
//! ## Sub-modules
//! - `types` - Session, outcomes and the device/marker collaborator traits
//! - `scheduler` - Cancellation tokens, the `Scheduler` trait and a cooperative timer queue
//! - `engine` - The `Synchronizer` state machine and the event loop that drives it
//!
//! ## State Machine
//! ```text
//!          start (device accepts)
//!   Idle ──────────────────────────▶ Playing ──┐ tick (elapsed < duration)
//!    ▲                                 │  ▲   │ marker = floor(elapsed × rate)
//!    │  tick (elapsed ≥ duration)      │  └───┘ schedule next tick
//!    └──────── or stop ◀───────────────┘
//! ```
//! `start` while Playing changes nothing. `tick` while Idle changes nothing.
//!
//! ## Example
//! ```rust
//! use eqsound::playback::{NullDevice, StartOutcome, Synchronizer, TickOutcome, TimerQueue};
//! use eqsound::{Session, SessionConfig};
//! use std::time::{Duration, Instant};
//!
//! let session = Session::new(SessionConfig::default()).unwrap();
//! let clip = session.prepare_playback("sin(2*pi*220*t)").unwrap();
//!
//! let t0 = Instant::now();
//! let mut queue = TimerQueue::new(t0);
//! let mut marker_positions = Vec::new();
//! let mut sync = Synchronizer::new(session.config(), NullDevice, |i: usize| marker_positions.push(i));
//!
//! assert_eq!(sync.start(&clip, t0, &mut queue).unwrap(), StartOutcome::Started);
//! let outcome = sync.tick(t0 + Duration::from_secs_f64(1.5), &mut queue);
//! assert_eq!(outcome, TickOutcome::Advanced { index: 66150 });
//! ```

mod engine;
mod scheduler;
mod types;

#[cfg(test)]
mod tests;

pub use engine::{run_until_idle, sample_index, Synchronizer};
pub use scheduler::{CancelToken, Clock, Scheduler, SystemClock, TimerQueue};
pub use types::{
    AudioDevice, MarkerSink, NullDevice, PlaybackClip, PlaybackSession, PlaybackState, StartOutcome,
    TickOutcome,
};
