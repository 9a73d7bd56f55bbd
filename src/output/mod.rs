// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Getting rendered samples out of the program: wav files and speakers.

pub mod sox;
pub mod wav;

/// Copy the mono `f32` samples to little-endian bytes.
///
/// Returns the number of samples that were actually copied.
/// Might be less than the number of input samples if the output buffer was not large enough.
pub fn copy_f32_bytes(audio: &[f32], bytes: &mut [u8]) -> usize {
    let mut processed = 0;
    for (sample, target) in audio.iter().zip(bytes.chunks_exact_mut(4)) {
        target.copy_from_slice(&sample.to_le_bytes());
        processed += 1;
    }
    processed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_output_buffer() {
        let mut bytes = [0u8; 6];
        assert_eq!(copy_f32_bytes(&[1.0, 2.0], &mut bytes), 1);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    }
}
