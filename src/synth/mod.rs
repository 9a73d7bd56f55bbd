// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains all the parts converting from note data to wave data.

pub mod dynamic;
pub mod envelope;
pub mod oscillator;
pub mod tuning;

use log::trace;
use snafu::Snafu;

use crate::note::Note;
use crate::wave::Buffer;

pub use dynamic::DynamicKind;
pub use envelope::EnvelopeKind;
pub use oscillator::{Overtone, Tone, WaveKind};

/// Fixed gain applied to every generated wave so that a handful of
/// overlapping notes stays within `[-1, 1]`.
pub const MASTER_VOLUME: f64 = 0.2;

/// Errors raised while turning a note into samples.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum SynthError {
    #[snafu(display("invalid {} {}: {}", param, value, reason))]
    InvalidParameter {
        param: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[snafu(display("unknown {} kind {:?}", category, name))]
    UnknownKind { category: &'static str, name: String },
}

pub(crate) fn invalid(param: &'static str, value: f64, reason: &'static str) -> SynthError {
    SynthError::InvalidParameter {
        param,
        value,
        reason,
    }
}

/// Render a single note: generate the wave, then apply the envelope, then the dynamic.
pub fn render_note(note: &Note, sample_rate: u32) -> Result<Buffer, SynthError> {
    let tone = Tone {
        frequency: note.frequency,
        duration: note.duration,
        amplitude: note.amplitude,
        glide_target: note.glide_target,
    };
    let wave = oscillator::generate(note.wave, &tone, &note.overtones, sample_rate)?;
    let enveloped = envelope::apply(
        note.envelope,
        wave,
        sample_rate,
        note.attack,
        note.decay,
    )?;
    let shaped = dynamic::apply(note.dynamic, enveloped, sample_rate, &note.dynamic_curve)?;
    trace!(
        "rendered {} Hz {:?}/{:?}/{:?} to {} samples",
        note.frequency,
        note.wave,
        note.envelope,
        note.dynamic,
        shaped.len()
    );
    Ok(shaped)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::note::Note;

    #[test]
    fn render_pipeline_order() {
        let mut note = Note::new(440.0, 1.0, 0.5);
        note.attack = 0.1;
        note.decay = 0.1;
        let buffer = render_note(&note, 1000).unwrap();
        assert_eq!(buffer.len(), 1000);
        // enveloped at both ends
        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[999], 0.0);
        // untouched in the middle
        let raw = oscillator::generate(
            WaveKind::Sine,
            &Tone {
                frequency: 440.0,
                duration: 1.0,
                amplitude: 0.5,
                glide_target: 550.0,
            },
            &[],
            1000,
        )
        .unwrap();
        assert_eq!(buffer[500], raw[500]);
    }

    #[test]
    fn render_propagates_errors() {
        let note = Note::new(440.0, 1.0, 1.5);
        assert_eq!(
            render_note(&note, 1000),
            Err(SynthError::InvalidParameter {
                param: "amplitude",
                value: 1.5,
                reason: "must not exceed 1.0"
            })
        );
    }

    #[test]
    fn error_messages() {
        expect_test::expect![[r#"unknown wave kind "square""#]]
            .assert_eq(&"square".parse::<WaveKind>().unwrap_err().to_string());
        expect_test::expect!["invalid frequency -1: must not be negative"]
            .assert_eq(&invalid("frequency", -1.0, "must not be negative").to_string());
    }
}
