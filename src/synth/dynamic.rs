// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Loudness changes over the course of a note (crescendo and decrescendo).

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::{invalid, SynthError};
use crate::wave::{apply_mask, linspace, samples, Buffer};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DynamicKind {
    /// Constant loudness.
    Flat,
    /// Linear ramp of the loudness towards a target multiplier.
    Cresc,
}

impl DynamicKind {
    pub const ALL: [DynamicKind; 2] = [DynamicKind::Flat, DynamicKind::Cresc];

    pub fn name(self) -> &'static str {
        match self {
            DynamicKind::Flat => "no_dyn",
            DynamicKind::Cresc => "cresc",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            DynamicKind::Flat => "flat",
            DynamicKind::Cresc => "ramp_dyn",
        }
    }
}

impl Default for DynamicKind {
    fn default() -> Self {
        DynamicKind::Flat
    }
}

impl fmt::Display for DynamicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DynamicKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DynamicKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s || kind.alias() == s)
            .ok_or_else(|| SynthError::UnknownKind {
                category: "dynamic",
                name: s.to_string(),
            })
    }
}

impl Serialize for DynamicKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Where and how far a crescendo goes, relative to the start of the note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicCurve {
    /// Loudness multiplier reached at the end of the ramp.
    #[serde(rename = "to")]
    pub target: f64,
    /// Start of the ramp in seconds.
    #[serde(rename = "start_d")]
    pub start: f64,
    /// End of the ramp in seconds. Without an end, the ramp lasts until the end of the note.
    #[serde(rename = "end_d")]
    pub end: Option<f64>,
}

impl Default for DynamicCurve {
    fn default() -> Self {
        DynamicCurve {
            target: 2.0,
            start: 0.0,
            end: None,
        }
    }
}

pub fn apply(
    kind: DynamicKind,
    wave: Buffer,
    sample_rate: u32,
    curve: &DynamicCurve,
) -> Result<Buffer, SynthError> {
    match kind {
        DynamicKind::Flat => Ok(flat(wave)),
        DynamicKind::Cresc => cresc(wave, sample_rate, curve),
    }
}

pub fn flat(wave: Buffer) -> Buffer {
    wave
}

/// Loudness stays at 1.0 until `curve.start`, ramps linearly to `curve.target`
/// until `curve.end` and stays at the target afterwards.
///
/// ```
/// use puremusic::synth::dynamic::{cresc, DynamicCurve};
/// let curve = DynamicCurve { target: 3.0, start: 0.2, end: Some(0.5) };
/// let shaped = cresc(vec![1.0; 8], 10, &curve).unwrap();
/// assert_eq!(shaped, vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0]);
/// ```
pub fn cresc(mut wave: Buffer, sample_rate: u32, curve: &DynamicCurve) -> Result<Buffer, SynthError> {
    if curve.start < 0.0 {
        return Err(invalid("dynamic start", curve.start, "must not be negative"));
    }
    if let Some(end) = curve.end {
        if end * sample_rate as f64 > wave.len() as f64 {
            return Err(invalid("dynamic end", end, "lies beyond the end of the note"));
        }
        if curve.start >= end {
            return Err(invalid(
                "dynamic start",
                curve.start,
                "must lie before the dynamic end",
            ));
        }
    }

    let start = samples(curve.start, sample_rate);
    let end = curve.end.map_or(wave.len(), |end| samples(end, sample_rate));
    let ramp_len = match end.checked_sub(start) {
        Some(len) => len,
        None => {
            return Err(invalid(
                "dynamic start",
                curve.start,
                "lies beyond the end of the note",
            ))
        }
    };
    let plateau_len = wave.len() - end;

    let mask = std::iter::repeat(1.0)
        .take(start)
        .chain(linspace(1.0, curve.target, ramp_len))
        .chain(std::iter::repeat(curve.target).take(plateau_len));
    apply_mask(&mut wave, mask);
    Ok(wave)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flat_is_identity() {
        let wave = vec![0.1, -0.2, 0.3];
        assert_eq!(
            apply(DynamicKind::Flat, wave.clone(), 10, &DynamicCurve::default()),
            Ok(wave)
        );
    }

    #[test]
    fn crescendo_over_whole_note() {
        let shaped = cresc(vec![1.0; 100], 100, &DynamicCurve::default()).unwrap();
        assert_eq!(shaped[0], 1.0);
        assert_eq!(shaped[99], 2.0);
        assert!(shaped.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn decrescendo_with_plateau() {
        let curve = DynamicCurve {
            target: 0.5,
            start: 0.0,
            end: Some(0.5),
        };
        let shaped = cresc(vec![1.0; 100], 100, &curve).unwrap();
        assert_eq!(shaped[0], 1.0);
        assert!(shaped[..50].windows(2).all(|w| w[0] > w[1]));
        assert!(shaped[50..].iter().all(|s| *s == 0.5));
    }

    #[test]
    fn rejects_bad_ranges() {
        let wave = vec![1.0; 10];
        let curve = |start, end| DynamicCurve {
            target: 2.0,
            start,
            end,
        };
        assert!(cresc(wave.clone(), 10, &curve(-0.1, None)).is_err());
        assert!(cresc(wave.clone(), 10, &curve(0.0, Some(1.1))).is_err());
        assert!(cresc(wave.clone(), 10, &curve(0.5, Some(0.5))).is_err());
        assert!(cresc(wave.clone(), 10, &curve(0.6, Some(0.5))).is_err());
        assert!(cresc(wave.clone(), 10, &curve(2.0, None)).is_err());
        // ending exactly at the end of the note is fine
        assert!(cresc(wave, 10, &curve(0.0, Some(1.0))).is_ok());
    }

    #[test]
    fn kind_names() {
        assert_eq!("no_dyn".parse::<DynamicKind>(), Ok(DynamicKind::Flat));
        assert_eq!("cresc".parse::<DynamicKind>(), Ok(DynamicKind::Cresc));
        assert_eq!("ramp_dyn".parse::<DynamicKind>(), Ok(DynamicKind::Cresc));
        assert!("swell".parse::<DynamicKind>().is_err());
    }
}
