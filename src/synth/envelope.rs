// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::{invalid, SynthError};
use crate::wave::{apply_mask, linspace, samples, Buffer};

/// Amplitude shaping over the duration of a single note.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Linear attack from silence, full volume, linear decay back to silence.
    Rectangular,
}

impl EnvelopeKind {
    pub const ALL: [EnvelopeKind; 1] = [EnvelopeKind::Rectangular];

    pub fn name(self) -> &'static str {
        match self {
            EnvelopeKind::Rectangular => "rectangular",
        }
    }
}

impl Default for EnvelopeKind {
    fn default() -> Self {
        EnvelopeKind::Rectangular
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnvelopeKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvelopeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SynthError::UnknownKind {
                category: "envelope",
                name: s.to_string(),
            })
    }
}

impl Serialize for EnvelopeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

pub fn apply(
    kind: EnvelopeKind,
    wave: Buffer,
    sample_rate: u32,
    attack: f64,
    decay: f64,
) -> Result<Buffer, SynthError> {
    match kind {
        EnvelopeKind::Rectangular => rectangular(wave, sample_rate, attack, decay),
    }
}

/// The attack rises from 0.0 to 1.0 over `round(attack * sample_rate)` samples,
/// the decay falls from 1.0 to 0.0 over `round(decay * sample_rate)` samples.
/// Both ramps include their end points.
///
/// # Example
///
/// ```
/// use puremusic::synth::envelope::rectangular;
/// let shaped = rectangular(vec![1.0; 10], 10, 0.3, 0.2).unwrap();
/// assert_eq!(shaped, vec![0.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
/// ```
pub fn rectangular(
    mut wave: Buffer,
    sample_rate: u32,
    attack: f64,
    decay: f64,
) -> Result<Buffer, SynthError> {
    if attack < 0.0 {
        return Err(invalid("attack", attack, "must not be negative"));
    }
    if decay < 0.0 {
        return Err(invalid("decay", decay, "must not be negative"));
    }
    let attack_len = samples(attack, sample_rate);
    let decay_len = samples(decay, sample_rate);
    let sustain_len = match wave.len().checked_sub(attack_len + decay_len) {
        Some(len) => len,
        None => {
            return Err(invalid(
                "attack + decay",
                attack + decay,
                "must not exceed the note duration",
            ))
        }
    };

    let mask = linspace(0.0, 1.0, attack_len)
        .chain(std::iter::repeat(1.0).take(sustain_len))
        .chain(linspace(1.0, 0.0, decay_len));
    apply_mask(&mut wave, mask);
    Ok(wave)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mask_shape() {
        let len = 100;
        let shaped = rectangular(vec![0.5; len], 100, 0.1, 0.2).unwrap();
        assert_eq!(shaped.len(), len);
        assert_eq!(shaped[0], 0.0);
        assert_eq!(shaped[len - 1], 0.0);
        assert!(shaped[10..80].iter().all(|s| *s == 0.5));
        // the attack is rising, the decay falling
        assert!(shaped[..10].windows(2).all(|w| w[0] < w[1]));
        assert!(shaped[80..].windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn no_attack_no_decay() {
        let shaped = rectangular(vec![0.25; 8], 8, 0.0, 0.0).unwrap();
        assert_eq!(shaped, vec![0.25; 8]);
    }

    #[test]
    fn envelope_fills_note() {
        let shaped = rectangular(vec![1.0; 4], 4, 0.5, 0.5).unwrap();
        assert_eq!(shaped, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn envelope_longer_than_note() {
        assert_eq!(
            rectangular(vec![1.0; 4], 4, 0.75, 0.5),
            Err(invalid(
                "attack + decay",
                1.25,
                "must not exceed the note duration"
            ))
        );
        assert!(rectangular(vec![1.0; 4], 4, -0.1, 0.5).is_err());
    }
}
