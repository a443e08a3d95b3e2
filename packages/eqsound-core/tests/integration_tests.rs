//! Integration tests for eqsound
//!
//! Tests the full pipeline: expression text -> amplitudes -> PCM -> WAVE bytes, and the
//! plot/playback actions built on top of it.

use eqsound::playback::{NullDevice, PlaybackState, StartOutcome, TickOutcome, TimerQueue};
use eqsound::{
    evaluate, wav, PlotFrame, PlotSurface, Session, SessionConfig, SignalError, SvgSurface,
    Synchronizer, TimeVector, ViewState, DEFAULT_EXPRESSION,
};
use std::f64::consts::PI;
use std::time::{Duration, Instant};

#[test]
fn test_default_expression_end_to_end() {
    let session = Session::new(SessionConfig::default()).unwrap();
    let pcm = session.render_audio(DEFAULT_EXPRESSION).unwrap();
    assert_eq!(pcm.len(), 132_300);

    // A 220 Hz full-scale sine peaks at (almost) full scale
    let peak = pcm.samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
    assert!(peak >= 32760, "peak {}", peak);

    let (format, decoded) = wav::decode(&wav::encode(&pcm).unwrap()).unwrap();
    assert_eq!(format.sample_rate, 44100);
    assert_eq!(format.channels, 1);
    assert_eq!(format.bits_per_sample, 16);
    assert_eq!(decoded.len(), pcm.len());
}

#[test]
fn test_sine_against_reference_for_several_frequencies() {
    let t = TimeVector::new(44100, 0.1);
    for f in [0.5, 60.0, 440.0, 3000.0] {
        let y = evaluate(&format!("sin(2*pi*{}*t)", f), &t).unwrap();
        for (x, v) in t.as_slice().iter().zip(&y) {
            assert!((v - (2.0 * PI * f * x).sin()).abs() < 1e-9);
        }
    }
}

#[test]
fn test_assignments_match_inline_expression() {
    let t = TimeVector::new(8000, 0.25);
    assert_eq!(
        evaluate("A=0.5;A*sin(t)", &t).unwrap(),
        evaluate("0.5*sin(t)", &t).unwrap()
    );
    assert_eq!(
        evaluate("f = 440; w = 2*pi*f; env = exp(-3*t); env*sin(w*t)", &t).unwrap(),
        evaluate("exp(-3*t)*sin(2*pi*440*t)", &t).unwrap()
    );
}

#[test]
fn test_error_taxonomy() {
    let t = TimeVector::new(100, 1.0);
    assert!(matches!(evaluate("", &t), Err(SignalError::SyntaxError { .. })));
    assert!(matches!(evaluate("sin(t); t", &t), Err(SignalError::SyntaxError { .. })));
    assert!(matches!(evaluate("x", &t), Err(SignalError::UndefinedSymbol { .. })));
    assert!(matches!(evaluate("import(t)", &t), Err(SignalError::UndefinedSymbol { .. })));
}

fn session(sample_rate: u32, audio_duration: f64) -> Session {
    Session::new(SessionConfig {
        sample_rate,
        audio_duration,
        preview_duration: 1.0,
        ..SessionConfig::default()
    })
    .unwrap()
}

#[test]
fn test_loudness_is_not_normalized() {
    let session = session(1000, 1.0);
    let quiet = session.render_audio("0.1").unwrap();
    let loud = session.render_audio("2").unwrap();
    assert!(quiet.samples.iter().all(|&s| s == (0.1f64 * 32767.0).round() as i16));
    assert!(loud.samples.iter().all(|&s| s == 32767));
}

#[test]
fn test_non_finite_expression_renders_silence() {
    let pcm = session(1000, 0.1).render_audio("log(-1 - t)").unwrap();
    assert!(pcm.samples.iter().all(|&s| s == 0));
}

#[test]
fn test_wav_bytes_readable_by_hound() {
    let bytes = session(16000, 0.2).render_wav("0.8*sin(2*pi*300*t)").unwrap();
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.len(), 3200);
}

#[test]
fn test_plot_action_produces_svg() {
    let session = Session::new(SessionConfig::default()).unwrap();
    let view = ViewState::default().zoom_x_in(); // 0..1 s
    let mut surface = SvgSurface::new(800, 400, "Signal over time (0 to 15 s)");
    session
        .render_plot("sin(2*pi*2*t)", view, &mut surface)
        .unwrap();
    let svg = surface.into_document();
    assert!(svg.contains("class=\"signal\""));
    assert!(svg.contains("class=\"zero-axis\""));
}

struct MarkerOverlay {
    time: Vec<f64>,
    amplitude: Vec<f64>,
    rendered: Vec<String>,
}

impl eqsound::playback::MarkerSink for MarkerOverlay {
    fn update_marker(&mut self, index: usize) {
        let mut surface = SvgSurface::new(200, 100, "");
        surface.render(&PlotFrame::new(
            &self.time,
            &self.amplitude,
            ViewState::default(),
            Some(index),
        ));
        self.rendered.push(surface.into_document());
    }
}

#[test]
fn test_playback_marker_tracks_preview_waveform() {
    let config = SessionConfig {
        sample_rate: 8000,
        ..SessionConfig::default()
    };
    let session = Session::new(config).unwrap();
    let clip = session.prepare_playback("sin(2*pi*t)").unwrap();
    let overlay = MarkerOverlay {
        time: session.preview_time().as_slice().to_vec(),
        amplitude: clip.preview.to_vec(),
        rendered: Vec::new(),
    };

    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = Synchronizer::new(session.config(), NullDevice, overlay);

    assert_eq!(sync.start(&clip, t0, &mut queue).unwrap(), StartOutcome::Started);
    assert_eq!(sync.start(&clip, t0, &mut queue).unwrap(), StartOutcome::AlreadyPlaying);
    assert_eq!(
        sync.tick(t0 + Duration::from_millis(250), &mut queue),
        TickOutcome::Advanced { index: 2000 }
    );
    assert_eq!(
        sync.tick(t0 + Duration::from_secs(3), &mut queue),
        TickOutcome::Finished { index: 24_000 }
    );
    assert_eq!(sync.state(), PlaybackState::Idle);
    assert_eq!(sync.marker().rendered.len(), 2);
    assert!(sync.marker().rendered.iter().all(|svg| svg.contains("class=\"marker\"")));
}

#[test]
fn test_action_errors_do_not_disturb_playback() {
    let session = Session::new(SessionConfig::default()).unwrap();
    let clip = session.prepare_playback("sin(t)").unwrap();
    let t0 = Instant::now();
    let mut queue = TimerQueue::new(t0);
    let mut sync = Synchronizer::new(session.config(), NullDevice, |_: usize| {});
    sync.start(&clip, t0, &mut queue).unwrap();

    // A failing play request for a different expression never reaches the synchronizer
    assert!(session.prepare_playback("sin(t) +").is_err());
    assert!(sync.is_playing());
    assert_eq!(sync.session().unwrap().start_instant(), t0);
}
