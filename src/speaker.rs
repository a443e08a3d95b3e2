//! Real-time output through cpal, enabled with the `sound` feature.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use eqsound::playback::AudioDevice;
use eqsound::{wav, SignalError};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// The clip currently being played, read by the output callback
#[derive(Debug, Default)]
struct Voice {
    samples: Vec<f32>,
    position: f64,
    /// Clip samples advanced per output frame
    step: f64,
}

impl Voice {
    fn load(&mut self, samples: Vec<f32>, clip_rate: u32, output_rate: u32) {
        self.samples = samples;
        self.position = 0.0;
        self.step = clip_rate as f64 / output_rate as f64;
    }

    fn clear(&mut self) {
        self.samples.clear();
        self.position = 0.0;
    }

    /// Write the next frames, mono duplicated to every channel, silence once the clip ends
    fn fill<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        for frame in output.chunks_mut(channels.max(1)) {
            let index = self.position as usize;
            let value = match self.samples.get(index) {
                Some(&sample) => {
                    self.position += self.step;
                    sample
                }
                None => 0.0,
            };
            for channel in frame.iter_mut() {
                *channel = T::from_sample(value);
            }
        }
    }
}

fn unavailable(e: impl std::fmt::Display) -> SignalError {
    SignalError::DeviceUnavailable(e.to_string())
}

/// Plays clips on the default output device without blocking the caller
pub struct SpeakerDevice {
    output_rate: u32,
    voice: Arc<Mutex<Voice>>,
    _stream: cpal::Stream,
}

impl SpeakerDevice {
    /// Open the default output device and start a silent stream
    pub fn open() -> Result<Self, SignalError> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());

        let device = host
            .default_output_device()
            .ok_or_else(|| unavailable("no audio output device found"))?;
        info!("Audio device: {}", device.name().map_err(unavailable)?);

        let config = device.default_output_config().map_err(unavailable)?;
        let output_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let voice = Arc::new(Mutex::new(Voice::default()));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(&device, &config.config(), Arc::clone(&voice), channels),
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(&device, &config.config(), Arc::clone(&voice), channels),
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(&device, &config.config(), Arc::clone(&voice), channels),
            other => Err(unavailable(format!("unsupported sample format {:?}", other))),
        }?;
        stream.play().map_err(unavailable)?;
        info!("Audio stream started at {} Hz", output_rate);

        Ok(Self {
            output_rate,
            voice,
            _stream: stream,
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        voice: Arc<Mutex<Voice>>,
        channels: usize,
    ) -> Result<cpal::Stream, SignalError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if let Ok(mut voice) = voice.lock() {
                        voice.fill(data, channels);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(unavailable)
    }
}

impl AudioDevice for SpeakerDevice {
    fn play(&mut self, audio: Arc<[u8]>) -> Result<(), SignalError> {
        let (format, pcm) = wav::decode(&audio)?;
        let samples = pcm.samples.iter().map(|&s| s as f32 / 32767.0).collect();
        let mut voice = self
            .voice
            .lock()
            .map_err(|_| unavailable("audio callback panicked"))?;
        voice.load(samples, format.sample_rate, self.output_rate);
        info!(samples = pcm.len(), rate = format.sample_rate, "clip queued on speaker");
        Ok(())
    }

    fn purge(&mut self) {
        if let Ok(mut voice) = self.voice.lock() {
            voice.clear();
        }
    }
}
