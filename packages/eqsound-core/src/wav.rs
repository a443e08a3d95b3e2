//! # PCM Container Encoding
//!
//! Serializes a [`PcmBuffer`] into a RIFF/WAVE container with `hound` and reads it
//! back. For mono 16-bit PCM the writer emits the canonical 44-byte header:
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  36 + data_len            (u32 LE)
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  16                       (u32 LE)
//!     20     2  1 = linear PCM           (u16 LE)
//!     22     2  1 channel                (u16 LE)
//!     24     4  sample_rate              (u32 LE)
//!     28     4  sample_rate * 2          (u32 LE, byte rate)
//!     32     2  2                        (u16 LE, block align)
//!     34     2  16                       (u16 LE, bits per sample)
//!     36     4  "data"
//!     40     4  data_len = samples * 2   (u32 LE)
//!     44     …  samples as i16 LE
//! ```

use crate::error::SignalError;
use crate::signal::PcmBuffer;
use std::io::Cursor;

pub const HEADER_LEN: usize = 44;
const BYTES_PER_SAMPLE: u16 = PcmBuffer::BITS_PER_SAMPLE / 8;

/// Largest clip whose RIFF size field still fits in 32 bits
pub const MAX_SAMPLES: usize = (u32::MAX as usize - (HEADER_LEN - 8)) / BYTES_PER_SAMPLE as usize;

/// Format fields read back from a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    fn from_spec(spec: hound::WavSpec) -> Self {
        let block_align = spec.channels * (spec.bits_per_sample / 8);
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            byte_rate: spec.sample_rate * block_align as u32,
            block_align,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

fn spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: PcmBuffer::CHANNELS,
        sample_rate,
        bits_per_sample: PcmBuffer::BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    }
}

fn container_error(e: hound::Error) -> SignalError {
    SignalError::ContainerError(e.to_string())
}

fn check_len(samples: usize) -> Result<(), SignalError> {
    if samples > MAX_SAMPLES {
        return Err(SignalError::ContainerError(format!(
            "{} samples exceed the 32-bit RIFF size limit of {}",
            samples, MAX_SAMPLES
        )));
    }
    Ok(())
}

/// Encode mono 16-bit PCM into a WAVE byte buffer.
///
/// # Errors
/// `ContainerError` if the clip is too long for a 32-bit RIFF header.
pub fn encode(pcm: &PcmBuffer) -> Result<Vec<u8>, SignalError> {
    check_len(pcm.samples.len())?;

    let capacity = HEADER_LEN + pcm.samples.len() * BYTES_PER_SAMPLE as usize;
    let mut cursor = Cursor::new(Vec::with_capacity(capacity));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec(pcm.sample_rate)).map_err(container_error)?;
        for &sample in &pcm.samples {
            writer.write_sample(sample).map_err(container_error)?;
        }
        writer.finalize().map_err(container_error)?;
    }
    Ok(cursor.into_inner())
}

/// Decode a mono 16-bit PCM WAVE buffer.
///
/// Chunks other than `fmt ` and `data` are skipped.
pub fn decode(bytes: &[u8]) -> Result<(WavFormat, PcmBuffer), SignalError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(container_error)?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int
        || spec.channels != PcmBuffer::CHANNELS
        || spec.bits_per_sample != PcmBuffer::BITS_PER_SAMPLE
    {
        return Err(SignalError::ContainerError(format!(
            "expected mono 16-bit PCM, found {} channel(s) at {} bits ({:?})",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(container_error)?;

    Ok((
        WavFormat::from_spec(spec),
        PcmBuffer {
            samples,
            sample_rate: spec.sample_rate,
        },
    ))
}
