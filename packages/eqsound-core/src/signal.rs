//! # Signal Conditioning
//!
//! Turns an amplitude vector into 16-bit PCM in three fixed steps:
//! 1. NaN and ±infinity become 0.0 (silence, not an error)
//! 2. Hard clip to [-1.0, 1.0]
//! 3. `round(sample × 32767)`
//!
//! There is no peak normalization. Amplitude in the formula maps straight to loudness:
//! `0.1*sin(...)` is quiet, `5*sin(...)` is clipped to full scale.

use serde::Serialize;

/// Full-scale quantization factor; also the largest magnitude a sample can reach
pub const FULL_SCALE: f64 = 32767.0;

/// Mono 16-bit PCM samples with their sample rate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PcmBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub const CHANNELS: u16 = 1;
    pub const BITS_PER_SAMPLE: u16 = 16;

    /// Condition `amplitudes` and pair the result with `sample_rate`
    pub fn from_amplitudes(amplitudes: &[f64], sample_rate: u32) -> Self {
        Self {
            samples: condition(amplitudes),
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Sanitize, clip and quantize every sample
pub fn condition(amplitudes: &[f64]) -> Vec<i16> {
    amplitudes.iter().map(|&x| quantize(x)).collect()
}

fn quantize(sample: f64) -> i16 {
    let finite = if sample.is_finite() { sample } else { 0.0 };
    // Clipped to ±1.0 first, so the product always fits in ±32767
    (finite.clamp(-1.0, 1.0) * FULL_SCALE).round() as i16
}
