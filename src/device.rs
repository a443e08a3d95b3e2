//! Terminal-side collaborators for the `play` command.

use eqsound::playback::{AudioDevice, MarkerSink};
use eqsound::SignalError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// "Plays" a clip by writing it where an external player can pick it up
pub struct WavFileDevice {
    path: PathBuf,
}

impl WavFileDevice {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AudioDevice for WavFileDevice {
    fn play(&mut self, audio: Arc<[u8]>) -> Result<(), SignalError> {
        std::fs::write(&self.path, &audio[..]).map_err(|e| {
            SignalError::DeviceUnavailable(format!("cannot write '{}': {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), bytes = audio.len(), "clip handed to device");
        Ok(())
    }

    fn purge(&mut self) {
        debug!("purge requested; file output has nothing to stop");
    }
}

/// Output chosen for the `play` command
pub enum OutputDevice {
    File(WavFileDevice),
    #[cfg(feature = "sound")]
    Speaker(crate::speaker::SpeakerDevice),
}

impl OutputDevice {
    /// The default sound output when built with `sound` and one opens, else a file at `out`
    pub fn open(out: PathBuf) -> Self {
        #[cfg(feature = "sound")]
        {
            match crate::speaker::SpeakerDevice::open() {
                Ok(speaker) => return OutputDevice::Speaker(speaker),
                Err(e) => tracing::warn!(error = %e, "no sound output, writing the clip to a file instead"),
            }
        }
        OutputDevice::File(WavFileDevice::new(out))
    }
}

impl AudioDevice for OutputDevice {
    fn play(&mut self, audio: Arc<[u8]>) -> Result<(), SignalError> {
        match self {
            OutputDevice::File(device) => device.play(audio),
            #[cfg(feature = "sound")]
            OutputDevice::Speaker(device) => device.play(audio),
        }
    }

    fn purge(&mut self) {
        match self {
            OutputDevice::File(device) => device.purge(),
            #[cfg(feature = "sound")]
            OutputDevice::Speaker(device) => device.purge(),
        }
    }
}

const BAR_WIDTH: usize = 40;

/// Single-line progress display: time, index, amplitude and a bar over the audio span
pub struct TerminalMarker {
    preview: Arc<[f64]>,
    sample_rate: u32,
    audio_samples: usize,
}

impl TerminalMarker {
    pub fn new(preview: Arc<[f64]>, sample_rate: u32, audio_duration: f64) -> Self {
        Self {
            preview,
            sample_rate,
            audio_samples: (audio_duration * sample_rate as f64).floor() as usize,
        }
    }

    fn line(&self, index: usize) -> String {
        let filled = if self.audio_samples == 0 {
            BAR_WIDTH
        } else {
            (index * BAR_WIDTH / self.audio_samples).min(BAR_WIDTH)
        };
        let amplitude = self.preview.get(index).copied().unwrap_or(0.0);
        format!(
            "\r[{}{}] t={:>7.3}s  index={:>8}  amplitude={:>+9.4}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            index as f64 / self.sample_rate as f64,
            index,
            amplitude
        )
    }
}

impl MarkerSink for TerminalMarker {
    fn update_marker(&mut self, index: usize) {
        let mut stderr = std::io::stderr().lock();
        // Display only; a closed stderr must not abort playback
        let _ = write!(stderr, "{}", self.line(index));
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_line() {
        let preview: Arc<[f64]> = (0..200).map(|i| i as f64 / 100.0).collect();
        let marker = TerminalMarker::new(preview, 100, 1.0);
        let line = marker.line(50);
        assert!(line.contains(&format!("[{}{}]", "#".repeat(20), "-".repeat(20))));
        assert!(line.contains("t=  0.500s"));
        assert!(line.contains("amplitude=  +0.5000"));

        let end = marker.line(150);
        assert!(end.contains(&"#".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_file_device_writes_clip() {
        let path = std::env::temp_dir().join(format!("eqsound-device-{}.wav", std::process::id()));
        let mut device = WavFileDevice::new(path.clone());
        device.play(Arc::from(vec![1u8, 2, 3])).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        std::fs::remove_file(&path).unwrap();
    }

    #[cfg(not(feature = "sound"))]
    #[test]
    fn test_output_falls_back_to_file() {
        let path = std::env::temp_dir().join(format!("eqsound-output-{}.wav", std::process::id()));
        let mut output = OutputDevice::open(path.clone());
        assert!(matches!(output, OutputDevice::File(_)));
        output.play(Arc::from(vec![9u8])).unwrap();
        output.purge();
        assert_eq!(std::fs::read(&path).unwrap(), vec![9]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_device_unavailable() {
        let mut device = WavFileDevice::new(PathBuf::from("/nonexistent-dir/eqsound/tone.wav"));
        assert!(matches!(
            device.play(Arc::from(vec![0u8])),
            Err(SignalError::DeviceUnavailable(_))
        ));
    }
}
