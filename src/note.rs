// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.

use serde::Serialize;

use crate::synth::dynamic::DynamicCurve;
use crate::synth::{invalid, DynamicKind, EnvelopeKind, Overtone, SynthError, WaveKind};

/// Default glide target of a note, in Hz.
pub const DEFAULT_GLIDE_TARGET: f64 = 550.0;
/// Default attack and decay of a note, in seconds.
pub const DEFAULT_NOTE_FADE: f64 = 0.05;
/// Default attack and decay of each note of a trill, in seconds.
pub const DEFAULT_TRILL_FADE: f64 = 0.01;

/// A fully resolved sound event: which wave is played, when, for how long and how loud.
///
/// This is also the shape of a note in a stored score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// Hz
    #[serde(rename = "freq")]
    pub frequency: f64,
    /// Seconds
    #[serde(rename = "dur")]
    pub duration: f64,
    /// Between 0.0 and 1.0
    #[serde(rename = "vol")]
    pub amplitude: f64,
    /// Seconds
    #[serde(rename = "attc")]
    pub attack: f64,
    /// Seconds
    #[serde(rename = "dec")]
    pub decay: f64,
    #[serde(rename = "over")]
    pub overtones: Vec<Overtone>,
    /// Hz, only used by the glide waves.
    #[serde(rename = "freq2")]
    pub glide_target: f64,
    pub wave: WaveKind,
    pub envelope: EnvelopeKind,
    #[serde(rename = "dyn")]
    pub dynamic: DynamicKind,
    /// Seconds since the start of the score.
    pub start: f64,
    #[serde(flatten)]
    pub dynamic_curve: DynamicCurve,
}

impl Note {
    /// A sine note starting at the beginning of the score, with every optional parameter at its default.
    pub fn new(frequency: f64, duration: f64, amplitude: f64) -> Self {
        Note {
            frequency,
            duration,
            amplitude,
            attack: DEFAULT_NOTE_FADE,
            decay: DEFAULT_NOTE_FADE,
            overtones: Vec::new(),
            glide_target: DEFAULT_GLIDE_TARGET,
            wave: WaveKind::default(),
            envelope: EnvelopeKind::default(),
            dynamic: DynamicKind::default(),
            start: 0.0,
            dynamic_curve: DynamicCurve::default(),
        }
    }

    /// Time in seconds when the note has finished playing.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Two pitches played in alternation, starting with the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trill {
    pub frequencies: (f64, f64),
    /// Total length of the trill in seconds.
    pub length: f64,
    /// Number of notes the trill is made of.
    pub count: u32,
    /// Everything except frequency, duration and start is shared by all notes of the trill.
    pub template: Note,
}

impl Trill {
    pub fn new(first: f64, second: f64, length: f64, count: u32, amplitude: f64) -> Self {
        let mut template = Note::new(first, length, amplitude);
        template.attack = DEFAULT_TRILL_FADE;
        template.decay = DEFAULT_TRILL_FADE;
        Trill {
            frequencies: (first, second),
            length,
            count,
            template,
        }
    }

    /// Split the trill into `count` notes of equal duration.
    ///
    /// ```
    /// use puremusic::note::Trill;
    /// let notes = Trill::new(440.0, 494.0, 1.0, 4, 0.5).notes().unwrap();
    /// let freqs: Vec<f64> = notes.iter().map(|n| n.frequency).collect();
    /// assert_eq!(freqs, vec![440.0, 494.0, 440.0, 494.0]);
    /// assert_eq!(notes[3].start, 0.75);
    /// ```
    pub fn notes(&self) -> Result<Vec<Note>, SynthError> {
        if self.count == 0 {
            return Err(invalid("trill note count", 0.0, "must be at least 1"));
        }
        let duration = self.length / self.count as f64;
        let mut start = self.template.start;
        let mut notes = Vec::with_capacity(self.count as usize);
        for i in 0..self.count {
            let mut note = self.template.clone();
            note.frequency = if i % 2 == 0 {
                self.frequencies.0
            } else {
                self.frequencies.1
            };
            note.duration = duration;
            note.start = start;
            notes.push(note);
            start += duration;
        }
        Ok(notes)
    }
}
