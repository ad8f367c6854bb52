//! WAV input: decode PCM audio into the mono double-precision signal the
//! tracker consumes.
//!
//! Integer widths 8/16/24/32 and IEEE float are accepted and normalized to
//! `[-1, 1]`; multi-channel files are downmixed by averaging the channels of
//! each frame. Resampling is out of scope: the decoded rate is returned
//! alongside the samples.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::Result;

/// Decoded mono signal.
pub struct AudioInput {
    pub samples: Vec<f64>,
    pub rate: f64,
}

/// Decode a WAV file from disk.
pub fn read_wav_file(path: &Path) -> Result<AudioInput> {
    let file = File::open(path)?;
    read_wav(BufReader::new(file))
}

/// Decode a WAV stream (file, stdin, in-memory buffer).
pub fn read_wav<R: Read>(reader: R) -> Result<AudioInput> {
    let mut reader = WavReader::new(reader)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let rate = spec.sample_rate as f64;

    let mut samples = Vec::with_capacity(reader.len() as usize / channels);
    let mut acc = 0.0f64;
    let mut in_frame = 0usize;
    match spec.sample_format {
        SampleFormat::Float => {
            for s in reader.samples::<f32>() {
                acc += s? as f64;
                in_frame += 1;
                if in_frame == channels {
                    samples.push(acc / channels as f64);
                    acc = 0.0;
                    in_frame = 0;
                }
            }
        }
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            for s in reader.samples::<i32>() {
                acc += s? as f64 / scale;
                in_frame += 1;
                if in_frame == channels {
                    samples.push(acc / channels as f64);
                    acc = 0.0;
                    in_frame = 0;
                }
            }
        }
    }

    Ok(AudioInput { samples, rate })
}
