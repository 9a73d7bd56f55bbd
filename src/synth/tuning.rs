// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

/// Frequency of C0, the root of the default equal temperament.
pub const C0: f64 = 16.35;

/// An equal temperament dividing every octave into `steps_per_octave` equal steps,
/// counted from a reference frequency at step 0 of octave 0.
///
/// # Examples
///
/// ```
/// use puremusic::synth::tuning::*;
/// let twelve = EqualTemperament::new(12);
/// assert_eq!(twelve.frequency(0, 0), 16.35);
/// assert_eq!(twelve.frequency(0, 4), 261.6);
/// assert_eq!(EqualTemperament::with_reference(12, 440.0).frequency(12, 0), 880.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EqualTemperament {
    pub steps_per_octave: i32,
    pub reference_frequency: f64,
}

impl EqualTemperament {
    pub fn new(steps_per_octave: i32) -> Self {
        Self::with_reference(steps_per_octave, C0)
    }

    pub fn with_reference(steps_per_octave: i32, reference_frequency: f64) -> Self {
        EqualTemperament {
            steps_per_octave,
            reference_frequency,
        }
    }

    /// Return the frequency of a step in an octave of this temperament.
    pub fn frequency(&self, step: i32, octave: i32) -> f64 {
        let step_ratio = 2.0f64.powf(step as f64 / self.steps_per_octave as f64);
        step_ratio * 2.0f64.powi(octave) * self.reference_frequency
    }
}

/// Twelve steps per octave from C0.
impl Default for EqualTemperament {
    fn default() -> Self {
        EqualTemperament::new(12)
    }
}

/// The frequency of a harmonic partial of `fundamental`, shifted by whole octaves.
///
/// ```
/// use puremusic::synth::tuning::partial;
/// assert_eq!(partial(440.0, 2, 0), 880.0);
/// assert_eq!(partial(100.0, 3, -1), 150.0);
/// ```
pub fn partial(fundamental: f64, partial: i32, octave: i32) -> f64 {
    fundamental * partial as f64 * 2.0f64.powi(octave)
}
