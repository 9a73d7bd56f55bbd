// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Wave generators rendering a whole note at once.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use super::{invalid, SynthError, MASTER_VOLUME};
use crate::wave::{self, linspace, samples, Buffer};

/// The shape of the generated wave.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaveKind {
    Sine,
    /// Rising sawtooth in `[0, 1)`.
    Ramp,
    /// Uniform noise in `[0, 1)`, the frequency is ignored.
    Noise,
    SineWithOvertones,
    /// Sine gliding from the frequency halfway towards the glide target.
    GlideSine,
    GlideSineWithOvertones,
}

impl WaveKind {
    pub const ALL: [WaveKind; 6] = [
        WaveKind::Sine,
        WaveKind::Ramp,
        WaveKind::Noise,
        WaveKind::SineWithOvertones,
        WaveKind::GlideSine,
        WaveKind::GlideSineWithOvertones,
    ];

    /// The name used in notation documents and stored scores.
    pub fn name(self) -> &'static str {
        match self {
            WaveKind::Sine => "sine",
            WaveKind::Ramp => "ramp",
            WaveKind::Noise => "noise",
            WaveKind::SineWithOvertones => "any_acc",
            WaveKind::GlideSine => "gliss_sine",
            WaveKind::GlideSineWithOvertones => "gliss_sine_acc",
        }
    }

    fn alias(self) -> Option<&'static str> {
        match self {
            WaveKind::SineWithOvertones => Some("sine_with_overtones"),
            WaveKind::GlideSine => Some("glide_sine"),
            WaveKind::GlideSineWithOvertones => Some("glide_sine_with_overtones"),
            _ => None,
        }
    }

    pub fn is_glide(self) -> bool {
        matches!(self, WaveKind::GlideSine | WaveKind::GlideSineWithOvertones)
    }
}

impl Default for WaveKind {
    fn default() -> Self {
        WaveKind::Sine
    }
}

impl fmt::Display for WaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaveKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s || kind.alias() == Some(s))
            .ok_or_else(|| SynthError::UnknownKind {
                category: "wave",
                name: s.to_string(),
            })
    }
}

impl Serialize for WaveKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A partial layered on top of the fundamental, stored as `[partial, volume]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Overtone {
    /// Frequency multiplier relative to the fundamental.
    pub partial: f64,
    /// Amplitude multiplier relative to the fundamental.
    pub volume: f64,
}

impl From<(f64, f64)> for Overtone {
    fn from((partial, volume): (f64, f64)) -> Self {
        Overtone { partial, volume }
    }
}

impl From<Overtone> for (f64, f64) {
    fn from(o: Overtone) -> Self {
        (o.partial, o.volume)
    }
}

/// The pitch, length and loudness of a generated wave.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// In Hz.
    pub frequency: f64,
    /// In seconds.
    pub duration: f64,
    /// Between 0.0 and 1.0, scaled by the master volume.
    pub amplitude: f64,
    /// In Hz, only used by the glide waves.
    pub glide_target: f64,
}

impl Tone {
    fn check(&self, kind: WaveKind, sample_rate: u32) -> Result<(), SynthError> {
        if self.duration <= 0.0 || self.duration.is_nan() {
            return Err(invalid("duration", self.duration, "must be positive"));
        }
        if !wave::fits(self.duration, sample_rate) {
            return Err(invalid("duration", self.duration, "is too long"));
        }
        if self.amplitude > 1.0 {
            return Err(invalid("amplitude", self.amplitude, "must not exceed 1.0"));
        }
        if kind != WaveKind::Noise && self.frequency < 0.0 {
            return Err(invalid("frequency", self.frequency, "must not be negative"));
        }
        if kind.is_glide() && self.glide_target < 0.0 {
            return Err(invalid(
                "glide target",
                self.glide_target,
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// The same tone moved to a partial, with the partial's relative volume.
    fn overtone(&self, overtone: &Overtone) -> Tone {
        Tone {
            frequency: self.frequency * overtone.partial,
            duration: self.duration,
            amplitude: self.amplitude * overtone.volume,
            glide_target: self.glide_target * overtone.partial,
        }
    }

    fn gain(&self) -> f64 {
        MASTER_VOLUME * self.amplitude
    }
}

/// Generate `round(sample_rate * duration)` samples of the given wave.
///
/// The overtones are only used by the `*WithOvertones` kinds.
pub fn generate(
    kind: WaveKind,
    tone: &Tone,
    overtones: &[Overtone],
    sample_rate: u32,
) -> Result<Buffer, SynthError> {
    tone.check(kind, sample_rate)?;
    let count = samples(tone.duration, sample_rate);
    let rate = sample_rate as f64;
    match kind {
        WaveKind::Sine => Ok(sine(tone, count, rate)),
        WaveKind::Ramp => Ok(ramp(tone, count, rate)),
        WaveKind::Noise => Ok(noise(tone, count)),
        WaveKind::GlideSine => Ok(glide_sine(tone, count, rate)),
        WaveKind::SineWithOvertones => {
            with_overtones(WaveKind::Sine, tone, overtones, count, sample_rate, sine)
        }
        WaveKind::GlideSineWithOvertones => {
            with_overtones(WaveKind::GlideSine, tone, overtones, count, sample_rate, glide_sine)
        }
    }
}

fn with_overtones(
    base: WaveKind,
    tone: &Tone,
    overtones: &[Overtone],
    count: usize,
    sample_rate: u32,
    wave: fn(&Tone, usize, f64) -> Buffer,
) -> Result<Buffer, SynthError> {
    let rate = sample_rate as f64;
    let mut out = wave(tone, count, rate);
    for overtone in overtones {
        let partial = tone.overtone(overtone);
        partial.check(base, sample_rate)?;
        for (sample, add) in out.iter_mut().zip(wave(&partial, count, rate)) {
            *sample += add;
        }
    }
    Ok(out)
}

fn sine(tone: &Tone, count: usize, rate: f64) -> Buffer {
    let gain = tone.gain();
    (0..count)
        .map(|n| (gain * (2.0 * PI * n as f64 * tone.frequency / rate).sin()) as f32)
        .collect()
}

fn ramp(tone: &Tone, count: usize, rate: f64) -> Buffer {
    let gain = tone.gain();
    (0..count)
        .map(|n| (gain * (n as f64 * tone.frequency / (2.0 * rate)).rem_euclid(1.0)) as f32)
        .collect()
}

fn noise(tone: &Tone, count: usize) -> Buffer {
    let gain = tone.gain() as f32;
    (0..count).map(|_| gain * rand::random::<f32>()).collect()
}

/// The instantaneous frequency moves linearly from the start frequency to the
/// midpoint between start and glide target. The phase is `n * f(n) / rate`,
/// not the integral of the frequency.
fn glide_sine(tone: &Tone, count: usize, rate: f64) -> Buffer {
    let gain = tone.gain();
    let end = tone.frequency + (tone.glide_target - tone.frequency) / 2.0;
    linspace(tone.frequency, end, count)
        .enumerate()
        .map(|(n, freq)| (gain * (2.0 * PI * n as f64 * freq / rate).sin()) as f32)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn tone(frequency: f64, duration: f64, amplitude: f64) -> Tone {
        Tone {
            frequency,
            duration,
            amplitude,
            glide_target: 550.0,
        }
    }

    #[test]
    fn lengths_and_bounds() {
        for &kind in WaveKind::ALL.iter() {
            for &amplitude in [0.0, 0.3, 1.0].iter() {
                let t = tone(440.0, 0.5, amplitude);
                let buffer = generate(kind, &t, &[], 8000).unwrap();
                assert_eq!(buffer.len(), 4000, "{}", kind);
                let bound = (MASTER_VOLUME * amplitude) as f32;
                assert!(
                    buffer.iter().all(|s| s.abs() <= bound + 1e-6),
                    "{} exceeds {}",
                    kind,
                    bound
                );
            }
        }
    }

    #[test]
    fn durations_are_checked() {
        for &kind in WaveKind::ALL.iter() {
            assert_eq!(
                generate(kind, &tone(440.0, 0.0, 0.5), &[], 8000),
                Err(invalid("duration", 0.0, "must be positive"))
            );
            assert!(generate(kind, &tone(440.0, -1.0, 0.5), &[], 8000).is_err());
            assert!(generate(kind, &tone(440.0, f64::NAN, 0.5), &[], 8000).is_err());
        }
        assert_eq!(
            generate(WaveKind::Sine, &tone(440.0, 1e300, 0.5), &[], 8000),
            Err(invalid("duration", 1e300, "is too long"))
        );
    }

    #[test]
    fn sine_is_deterministic() {
        let t = tone(261.63, 0.1, 0.7);
        let a = generate(WaveKind::Sine, &t, &[], 44100).unwrap();
        let b = generate(WaveKind::Sine, &t, &[], 44100).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sine_values() {
        // a quarter period every sample
        let buffer = generate(WaveKind::Sine, &tone(1.0, 1.0, 1.0), &[], 4).unwrap();
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer[0], 0.0);
        assert!((buffer[1] - 0.2).abs() < 1e-6);
        assert!(buffer[2].abs() < 1e-6);
        assert!((buffer[3] + 0.2).abs() < 1e-6);
    }

    #[test]
    fn ramp_values() {
        // 2 Hz ramp at 8 Hz sample rate: phase advances by 1/8 per sample
        let buffer = generate(WaveKind::Ramp, &tone(2.0, 1.0, 1.0), &[], 8).unwrap();
        let expected: Vec<f32> = (0..8).map(|n| (0.2 * (n as f64 / 8.0)) as f32).collect();
        assert_eq!(buffer, expected);
        assert!(buffer.iter().all(|s| *s >= 0.0));
    }

    #[test]
    fn noise_is_positive() {
        let buffer = generate(WaveKind::Noise, &tone(0.0, 1.0, 0.5), &[], 1000).unwrap();
        assert_eq!(buffer.len(), 1000);
        assert!(buffer.iter().all(|s| *s >= 0.0 && *s <= 0.1));
        // noise ignores the frequency
        assert!(generate(WaveKind::Noise, &tone(-5.0, 0.1, 0.5), &[], 1000).is_ok());
    }

    #[test]
    fn overtones_add_up() {
        let t = tone(100.0, 0.05, 0.5);
        let overtones = [Overtone::from((2.0, 0.5)), Overtone::from((3.0, 0.25))];
        let layered = generate(WaveKind::SineWithOvertones, &t, &overtones, 8000).unwrap();
        let base = generate(WaveKind::Sine, &t, &[], 8000).unwrap();
        let second = generate(WaveKind::Sine, &tone(200.0, 0.05, 0.25), &[], 8000).unwrap();
        let third = generate(WaveKind::Sine, &tone(300.0, 0.05, 0.125), &[], 8000).unwrap();
        for i in 0..layered.len() {
            assert_eq!(layered[i], base[i] + second[i] + third[i]);
        }
        // without overtones it is a plain sine
        assert_eq!(
            generate(WaveKind::SineWithOvertones, &t, &[], 8000).unwrap(),
            base
        );
    }

    #[test]
    fn glide_goes_halfway() {
        let t = Tone {
            frequency: 100.0,
            duration: 1.0,
            amplitude: 1.0,
            glide_target: 300.0,
        };
        let rate = 1000;
        let buffer = generate(WaveKind::GlideSine, &t, &[], rate).unwrap();
        // last sample uses 200 Hz, the midpoint between 100 and 300
        let n = 999.0;
        let expected = (0.2 * (2.0 * PI * n * 200.0 / 1000.0).sin()) as f32;
        assert!((buffer[999] - expected).abs() < 1e-6);
        // first sample uses the start frequency
        assert_eq!(buffer[0], 0.0);
        let expected = (0.2 * (2.0 * PI * 1.0 * (100.0 + 100.0 / 999.0) / 1000.0).sin()) as f32;
        assert!((buffer[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn glide_overtones_glide_proportionally() {
        let t = Tone {
            frequency: 100.0,
            duration: 0.1,
            amplitude: 0.5,
            glide_target: 200.0,
        };
        let layered =
            generate(WaveKind::GlideSineWithOvertones, &t, &[Overtone::from((2.0, 0.5))], 8000)
                .unwrap();
        let base = generate(WaveKind::GlideSine, &t, &[], 8000).unwrap();
        let partial = Tone {
            frequency: 200.0,
            duration: 0.1,
            amplitude: 0.25,
            glide_target: 400.0,
        };
        let upper = generate(WaveKind::GlideSine, &partial, &[], 8000).unwrap();
        for i in 0..layered.len() {
            assert_eq!(layered[i], base[i] + upper[i]);
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(generate(WaveKind::Sine, &tone(440.0, 1.0, 1.01), &[], 100).is_err());
        assert!(generate(WaveKind::Ramp, &tone(-1.0, 1.0, 0.5), &[], 100).is_err());
        assert!(generate(WaveKind::Noise, &tone(0.0, 1.0, 2.0), &[], 100).is_err());
        let mut t = tone(440.0, 1.0, 0.5);
        t.glide_target = -1.0;
        assert!(generate(WaveKind::GlideSine, &t, &[], 100).is_err());
        // only glides care about the target
        assert!(generate(WaveKind::Sine, &t, &[], 100).is_ok());
        // an overtone louder than the fundamental allows
        let t = tone(440.0, 1.0, 0.8);
        assert_eq!(
            generate(WaveKind::SineWithOvertones, &t, &[Overtone::from((2.0, 2.0))], 100),
            Err(invalid("amplitude", 1.6, "must not exceed 1.0"))
        );
    }

    #[test]
    fn kind_names() {
        for &kind in WaveKind::ALL.iter() {
            assert_eq!(kind.name().parse::<WaveKind>(), Ok(kind));
        }
        assert_eq!("glide_sine".parse::<WaveKind>(), Ok(WaveKind::GlideSine));
        assert_eq!(
            serde_json::to_string(&WaveKind::SineWithOvertones).unwrap(),
            r#""any_acc""#
        );
    }
}
