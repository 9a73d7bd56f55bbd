// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::io;

use hound::{SampleFormat, WavSpec, WavWriter};

pub const WAV_EXT: &str = "wav";

/// Scale a sample to 16 bit. Samples outside of `[-1, 1]` are not clamped,
/// they saturate at the `i32` range and then wrap around to `i16`.
///
/// ```
/// use puremusic::output::wav::quantize;
/// assert_eq!(quantize(0.0), 0);
/// assert_eq!(quantize(1.0), 32767);
/// assert_eq!(quantize(-0.5), -16384);
/// assert_eq!(quantize(1.5), -16385);
/// ```
pub fn quantize(sample: f32) -> i16 {
    (sample * 32767.0).round() as i32 as i16
}

/// Write mono 16 bit integer PCM.
pub fn write_pcm16<W: io::Write + io::Seek>(
    writer: W,
    sample_rate: u32,
    samples: &[f32],
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut wav = WavWriter::new(writer, spec)?;
    for &sample in samples {
        wav.write_sample(quantize(sample))?;
    }
    wav.finalize()
}
