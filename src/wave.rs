// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

/// A mono buffer of samples. Nominally in `[-1, 1]`, but nothing clips.
pub type Buffer = Vec<f32>;

/// Most samples a 16 bit wav file can hold.
pub const MAX_SAMPLES: usize = u32::MAX as usize / 2;

/// Whether `seconds` at the given sample rate stays within [`MAX_SAMPLES`].
///
/// ```
/// use puremusic::wave::fits;
/// assert!(fits(60.0, 44100));
/// assert!(!fits(1e300, 44100));
/// assert!(!fits(f64::NAN, 44100));
/// ```
pub fn fits(seconds: f64, sample_rate: u32) -> bool {
    (seconds * sample_rate as f64).round() <= MAX_SAMPLES as f64
}

/// Number of samples covering `seconds` at the given sample rate.
///
/// ```
/// use puremusic::wave::samples;
/// assert_eq!(samples(1.0, 44100), 44100);
/// assert_eq!(samples(0.25, 10), 3);
/// assert_eq!(samples(-1.0, 10), 0);
/// ```
pub fn samples(seconds: f64, sample_rate: u32) -> usize {
    let n = (seconds * sample_rate as f64).round();
    if n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// `count` evenly spaced values from `start` to `end`, both inclusive.
/// A single value is just `start`.
///
/// ```
/// use puremusic::wave::linspace;
/// assert_eq!(linspace(0.0, 1.0, 5).collect::<Vec<_>>(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(3.0, 7.0, 1).collect::<Vec<_>>(), vec![3.0]);
/// assert_eq!(linspace(3.0, 7.0, 0).count(), 0);
/// ```
pub fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| {
        if i + 1 == count && count > 1 {
            end
        } else {
            start + step * i as f64
        }
    })
}

/// Multiply `buffer` with `mask` sample by sample.
pub fn apply_mask(buffer: &mut [f32], mask: impl Iterator<Item = f64>) {
    for (sample, gain) in buffer.iter_mut().zip(mask) {
        *sample *= gain as f32;
    }
}

/// Add `source` onto `target`, starting at sample `offset` of the target.
/// Samples that would land past the end of the target are dropped.
///
/// Returns the number of samples actually mixed.
pub fn mix_into(target: &mut [f32], source: &[f32], offset: usize) -> usize {
    let window = target.iter_mut().skip(offset);
    let mut mixed = 0;
    for (out, sample) in window.zip(source) {
        *out += *sample;
        mixed += 1;
    }
    mixed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mix_with_offset() {
        let mut target = vec![0.0; 5];
        assert_eq!(mix_into(&mut target, &[1.0, 2.0], 1), 2);
        assert_eq!(mix_into(&mut target, &[1.0, 1.0, 1.0], 3), 2);
        assert_eq!(target, vec![0.0, 1.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn mask_is_elementwise() {
        let mut buffer = vec![2.0, 2.0, 2.0];
        apply_mask(&mut buffer, linspace(0.0, 1.0, 3));
        assert_eq!(buffer, vec![0.0, 1.0, 2.0]);
    }
}
