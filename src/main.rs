mod cli;
mod device;
mod error;
#[cfg(feature = "sound")]
mod speaker;

use clap::Parser;
use eqsound::playback::{run_until_idle, StartOutcome, SystemClock, TimerQueue};
use eqsound::{Session, SessionConfig, SvgSurface, Synchronizer};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};
use device::{OutputDevice, TerminalMarker};
use error::CliError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = args.session_config()?;
    let session = Session::new(config).map_err(CliError::Config)?;

    match &args.command {
        Command::Plot {
            expression,
            out,
            width,
            height,
        } => plot(&session, expression, out, *width, *height),
        Command::Render { expression, out } => render(&session, expression, out),
        Command::Play { expression, out } => play(&session, expression, out),
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn plot(session: &Session, expression: &str, out: &Path, width: u32, height: u32) -> Result<(), CliError> {
    let config = session.config();
    let title = format!("Signal over time (0 to {} s)", config.preview_duration);
    let mut surface = SvgSurface::new(width, height, title);
    session
        .render_plot(expression, config.view, &mut surface)
        .map_err(CliError::Evaluation)?;
    write_file(out, surface.document().as_bytes())?;
    eprintln!("Wrote plot to {}", out.display());
    Ok(())
}

fn render(session: &Session, expression: &str, out: &Path) -> Result<(), CliError> {
    let wav = session.render_wav(expression).map_err(CliError::Audio)?;
    write_file(out, &wav)?;
    eprintln!(
        "Wrote {:.1} s of audio at {} Hz to {}",
        session.config().audio_duration,
        session.config().sample_rate,
        out.display()
    );
    Ok(())
}

fn play(session: &Session, expression: &str, out: &Path) -> Result<(), CliError> {
    let clip = session.prepare_playback(expression).map_err(CliError::Audio)?;
    let config: &SessionConfig = session.config();
    let marker = TerminalMarker::new(Arc::clone(&clip.preview), config.sample_rate, config.audio_duration);
    let mut sync = Synchronizer::new(config, OutputDevice::open(out.to_path_buf()), marker);

    let mut clock = SystemClock;
    let now = Instant::now();
    let mut queue = TimerQueue::new(now);

    if sync.start(&clip, now, &mut queue).map_err(CliError::Audio)? == StartOutcome::Started {
        run_until_idle(&mut sync, &mut queue, &mut clock);
        eprintln!();
    }
    Ok(())
}
