//! Time axis sampling.

use std::sync::Arc;

/// Immutable, strictly increasing sample instants in seconds, starting at 0.
///
/// `len = round(sample_rate × duration)` and sample `i` sits at `i × duration / len`,
/// i.e. a half-open grid that never includes `duration` itself. Cloning is cheap; the
/// samples are shared.
///
/// When `sample_rate × duration` is not a whole number the spacing is `duration / len`,
/// not `1 / sample_rate`. The playback marker maps time to an index with `sample_rate`,
/// so the two differ by at most half a sample over the whole vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeVector {
    samples: Arc<[f64]>,
    sample_rate: u32,
    duration: f64,
}

impl TimeVector {
    pub fn new(sample_rate: u32, duration: f64) -> Self {
        let len = sample_count(sample_rate, duration);
        let step = if len > 0 { duration / len as f64 } else { 0.0 };
        let samples: Arc<[f64]> = (0..len).map(|i| i as f64 * step).collect();
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Shared handle to the samples, used when `t` is bound during evaluation
    pub fn shared(&self) -> Arc<[f64]> {
        Arc::clone(&self.samples)
    }
}

/// `round(sample_rate × duration)`, zero for non-positive or non-finite durations
pub fn sample_count(sample_rate: u32, duration: f64) -> usize {
    let count = (sample_rate as f64 * duration).round();
    if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    }
}
