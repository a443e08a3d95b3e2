use super::*;
use crate::{SessionConfig, SignalError};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct RecordingDevice {
    played: Vec<usize>,
    purges: usize,
    refuse: bool,
}

impl AudioDevice for RecordingDevice {
    fn play(&mut self, audio: Arc<[u8]>) -> Result<(), SignalError> {
        if self.refuse {
            return Err(SignalError::DeviceUnavailable("no output device".to_string()));
        }
        self.played.push(audio.len());
        Ok(())
    }

    fn purge(&mut self) {
        self.purges += 1;
    }
}

#[derive(Default)]
struct RecordingMarker {
    positions: Vec<usize>,
}

impl MarkerSink for RecordingMarker {
    fn update_marker(&mut self, index: usize) {
        self.positions.push(index);
    }
}

/// Simulated clock: sleeping jumps straight to the deadline plus a fixed lag
struct ManualClock {
    now: Instant,
    lag: Duration,
}

impl Clock for ManualClock {
    fn now(&mut self) -> Instant {
        self.now
    }

    fn sleep_until(&mut self, deadline: Instant) {
        if deadline > self.now {
            self.now = deadline;
        }
        self.now += self.lag;
    }
}

fn clip(preview_len: usize) -> PlaybackClip {
    PlaybackClip {
        preview: (0..preview_len).map(|i| i as f64).collect(),
        audio: Arc::from(vec![0u8; 64]),
    }
}

fn synchronizer() -> Synchronizer<RecordingDevice, RecordingMarker> {
    Synchronizer::new(
        &SessionConfig::default(),
        RecordingDevice::default(),
        RecordingMarker::default(),
    )
}

const PREVIEW_LEN: usize = 15 * 44100;

#[test]
fn test_start_enters_playing_and_schedules_first_tick() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();

    assert_eq!(sync.state(), PlaybackState::Idle);
    assert_eq!(sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap(), StartOutcome::Started);
    assert_eq!(sync.state(), PlaybackState::Playing);
    assert_eq!(sync.device().played, vec![64]);
    assert_eq!(queue.next_deadline(), Some(t0 + sync.tick_interval()));
}

#[test]
fn test_second_start_is_a_no_op() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();

    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();
    let later = t0 + Duration::from_millis(500);
    assert_eq!(
        sync.start(&clip(10), later, &mut queue).unwrap(),
        StartOutcome::AlreadyPlaying
    );

    let session = sync.session().unwrap();
    assert_eq!(session.start_instant(), t0);
    assert_eq!(session.source().len(), PREVIEW_LEN);
    assert_eq!(sync.device().played.len(), 1);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_tick_at_one_and_a_half_seconds() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();

    let outcome = sync.tick(t0 + Duration::from_secs_f64(1.5), &mut queue);
    assert_eq!(outcome, TickOutcome::Advanced { index: 66150 });
    assert_eq!(sync.session().unwrap().current_index(), 66150);
    assert_eq!(sync.session().unwrap().current_amplitude(), Some(66150.0));
    assert_eq!(sync.marker().positions, vec![66150]);
    assert!(sync.is_playing());
}

#[test]
fn test_terminal_tick_parks_marker_and_purges() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();

    let outcome = sync.tick(t0 + Duration::from_secs_f64(3.2), &mut queue);
    assert_eq!(outcome, TickOutcome::Finished { index: 132_300 });
    assert_eq!(sync.state(), PlaybackState::Idle);
    assert!(!sync.session().unwrap().is_running());
    assert!(sync.session().unwrap().token().is_cancelled());
    assert_eq!(sync.device().purges, 1);
    assert!(queue.is_empty());
}

#[test]
fn test_tick_after_terminal_is_a_no_op() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();
    sync.tick(t0 + Duration::from_secs(3), &mut queue);

    for extra in 4..7 {
        assert_eq!(sync.tick(t0 + Duration::from_secs(extra), &mut queue), TickOutcome::Idle);
    }
    assert!(!sync.session().unwrap().is_running());
    assert_eq!(sync.marker().positions, vec![132_300]);
    assert_eq!(sync.device().purges, 1);
}

#[test]
fn test_tick_without_session_is_idle() {
    let mut queue = TimerQueue::new(Instant::now());
    let mut sync = synchronizer();
    assert_eq!(sync.tick(Instant::now(), &mut queue), TickOutcome::Idle);
    assert!(sync.marker().positions.is_empty());
}

#[test]
fn test_indices_clamp_to_short_source() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(1000), t0, &mut queue).unwrap();

    assert_eq!(
        sync.tick(t0 + Duration::from_secs(1), &mut queue),
        TickOutcome::Advanced { index: 999 }
    );
    assert_eq!(
        sync.tick(t0 + Duration::from_secs(5), &mut queue),
        TickOutcome::Finished { index: 999 }
    );
}

#[test]
fn test_empty_source_stays_at_zero() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(0), t0, &mut queue).unwrap();

    assert_eq!(
        sync.tick(t0 + Duration::from_secs(1), &mut queue),
        TickOutcome::Advanced { index: 0 }
    );
    assert_eq!(
        sync.tick(t0 + Duration::from_secs(3), &mut queue),
        TickOutcome::Finished { index: 0 }
    );
}

#[test]
fn test_device_failure_leaves_idle() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = Synchronizer::new(
        &SessionConfig::default(),
        RecordingDevice {
            refuse: true,
            ..RecordingDevice::default()
        },
        RecordingMarker::default(),
    );

    let result = sync.start(&clip(PREVIEW_LEN), t0, &mut queue);
    assert!(matches!(result, Err(SignalError::DeviceUnavailable(_))));
    assert_eq!(sync.state(), PlaybackState::Idle);
    assert!(sync.session().is_none());
    assert!(queue.is_empty());
}

#[test]
fn test_stop_cancels_pending_ticks() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();
    sync.tick(t0 + Duration::from_millis(20), &mut queue);
    // The first timer was never popped, so both it and the rescheduled one are pending
    assert_eq!(queue.len(), 2);

    assert!(sync.stop());
    assert_eq!(sync.state(), PlaybackState::Idle);
    assert_eq!(sync.device().purges, 1);
    assert!(queue.is_empty());
    assert!(queue.pop_due(t0 + Duration::from_secs(10)).is_none());

    // A straggling tick is harmless
    assert_eq!(sync.tick(t0 + Duration::from_millis(40), &mut queue), TickOutcome::Idle);
    assert!(!sync.stop());
    assert_eq!(sync.device().purges, 1);
}

#[test]
fn test_restart_after_stop_ignores_stale_timers() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();
    sync.stop();

    let t1 = t0 + Duration::from_millis(5);
    assert_eq!(sync.start(&clip(PREVIEW_LEN), t1, &mut queue).unwrap(), StartOutcome::Started);
    assert_eq!(sync.session().unwrap().start_instant(), t1);
    // Only the new session's first tick is pending
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.next_deadline(), Some(t1 + sync.tick_interval()));
}

#[test]
fn test_restart_after_finish() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();
    sync.tick(t0 + Duration::from_secs(4), &mut queue);

    let t1 = t0 + Duration::from_secs(10);
    assert_eq!(sync.start(&clip(PREVIEW_LEN), t1, &mut queue).unwrap(), StartOutcome::Started);
    assert_eq!(
        sync.tick(t1 + Duration::from_secs(1), &mut queue),
        TickOutcome::Advanced { index: 44100 }
    );
}

#[test]
fn test_event_loop_runs_to_completion() {
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut clock = ManualClock {
        now: t0,
        lag: Duration::from_micros(300),
    };
    let mut sync = synchronizer();
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();

    let last = run_until_idle(&mut sync, &mut queue, &mut clock);

    assert_eq!(last, TickOutcome::Finished { index: 132_300 });
    assert_eq!(sync.state(), PlaybackState::Idle);
    assert_eq!(sync.device().purges, 1);

    let positions = &sync.marker().positions;
    // Roughly 60 updates per second over three seconds
    assert!(positions.len() > 150 && positions.len() < 200, "{} ticks", positions.len());
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*positions.last().unwrap(), 132_300);
}

#[test]
fn test_sub_millisecond_interval_still_terminates() {
    let config = SessionConfig {
        audio_duration: 0.05,
        tick_interval_ms: 1.0e-9,
        ..SessionConfig::default()
    };
    let mut sync = Synchronizer::new(&config, RecordingDevice::default(), RecordingMarker::default());
    assert_eq!(sync.tick_interval(), Duration::from_millis(1));

    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut clock = ManualClock {
        now: t0,
        lag: Duration::ZERO,
    };
    sync.start(&clip(PREVIEW_LEN), t0, &mut queue).unwrap();

    let last = run_until_idle(&mut sync, &mut queue, &mut clock);

    assert_eq!(last, TickOutcome::Finished { index: 2205 });
    let ticks = sync.marker().positions.len();
    assert!(ticks >= 50 && ticks <= 52, "{} ticks", ticks);
}

#[test]
fn test_sample_index_mapping() {
    assert_eq!(sample_index(1.5, 44100, PREVIEW_LEN), 66150);
    assert_eq!(sample_index(0.0, 44100, PREVIEW_LEN), 0);
    assert_eq!(sample_index(100.0, 44100, PREVIEW_LEN), PREVIEW_LEN - 1);
    assert_eq!(sample_index(0.5, 44100, 0), 0);
    assert_eq!(sample_index(f64::NAN, 44100, 10), 0);
    // floor, not round
    assert_eq!(sample_index(0.99 / 44100.0, 44100, 10), 0);
}

#[test]
fn test_tick_outcome_serializes_with_kind_tag() {
    let outcome = TickOutcome::Advanced { index: 3 };
    let yaml = serde_yaml::to_string(&outcome).unwrap();
    assert!(yaml.contains("kind: advanced"));
    assert!(yaml.contains("index: 3"));
}
