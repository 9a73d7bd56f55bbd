// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Compiling notation documents into scores.
//!
//! A document is a JSON object with an optional `title` and `rate`, and lists of `notes`
//! and `trills`. Each note or trill is either an object with named fields or a list of
//! positional values, and frequencies may be given as `TET`/`OVT` expressions.

pub mod expr;
pub mod package;

use std::collections::BTreeMap;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use snafu::Snafu;

use crate::note::{Note, Trill};
use crate::score::{Score, DEFAULT_RATE, DEFAULT_TITLE};
use crate::synth::{Overtone, SynthError};

pub use expr::FreqExpr;
pub use package::Packages;

/// Errors raised while compiling a document.
#[derive(Debug, Snafu)]
pub enum NotationError {
    #[snafu(display("could not resolve {:?}: {}", expr, reason))]
    Resolution { expr: String, reason: String },
    #[snafu(display("could not resolve overtones {:?}", reference))]
    UnresolvedOvertones { reference: String },
    #[snafu(display("malformed document: {}", reason))]
    Format { reason: String },
    #[snafu(display("invalid JSON: {}", source))]
    Json { source: serde_json::Error },
    #[snafu(display("{}", source))]
    Synth { source: SynthError },
}

impl From<SynthError> for NotationError {
    fn from(source: SynthError) -> Self {
        NotationError::Synth { source }
    }
}

/// Syntax errors stay JSON errors, everything else is a problem with the document's structure.
fn json_error(err: serde_json::Error) -> NotationError {
    if err.is_data() {
        NotationError::Format {
            reason: err.to_string(),
        }
    } else {
        NotationError::Json { source: err }
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    rate: Option<u32>,
    #[serde(default)]
    notes: Vec<Value>,
    #[serde(default)]
    trills: Vec<Value>,
}

/// Compile a document into a score, rendering every note.
///
/// All notes are added before all trills. Stored scores are documents too,
/// so this also restores them.
pub fn compile(source: &str, packages: &Packages) -> Result<Score, NotationError> {
    let document: Document = serde_json::from_str(source).map_err(json_error)?;
    let rate = document.rate.filter(|&r| r > 0).unwrap_or(DEFAULT_RATE);
    let title = document
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let mut score = Score::new(rate, &title);
    let note_count = document.notes.len();
    let trill_count = document.trills.len();
    for value in document.notes {
        score.add(resolve_note(value, packages)?)?;
    }
    for value in document.trills {
        score.add_trill(&resolve_trill(value, packages)?)?;
    }
    info!(
        "compiled {:?} at {} Hz: {} notes, {} trills, {:.2} seconds",
        score.title(),
        rate,
        note_count,
        trill_count,
        score.length()
    );
    Ok(score)
}

/// A frequency in Hz or as an expression.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Freq {
    Hz(f64),
    Expr(String),
}

impl Freq {
    fn resolve(self) -> Result<f64, NotationError> {
        match self {
            Freq::Hz(hz) => Ok(hz),
            Freq::Expr(expr) => match FreqExpr::parse(&expr) {
                Ok(parsed) => {
                    let hz = parsed.eval();
                    debug!("{:?} resolved to {} Hz", expr, hz);
                    Ok(hz)
                }
                Err(reason) => Err(NotationError::Resolution { expr, reason }),
            },
        }
    }
}

/// Overtones listed in place or referenced from a package.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Overtones {
    List(Vec<Overtone>),
    Reference(String),
}

impl Overtones {
    fn resolve(self, packages: &Packages) -> Result<Vec<Overtone>, NotationError> {
        match self {
            Overtones::List(list) => Ok(list),
            Overtones::Reference(reference) => Ok(packages.lookup(&reference)?.to_vec()),
        }
    }
}

/// The optional parameters shared by notes and trills.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Extras {
    attc: Option<f64>,
    dec: Option<f64>,
    over: Option<Overtones>,
    wave: Option<String>,
    envelope: Option<String>,
    #[serde(rename = "dyn")]
    dynamic: Option<String>,
    start: Option<f64>,
    to: Option<f64>,
    start_d: Option<f64>,
    end_d: Option<f64>,
}

impl Extras {
    /// Overwrite the defaults in `note` with everything given here.
    fn apply(self, note: &mut Note, packages: &Packages) -> Result<(), NotationError> {
        if let Some(attack) = self.attc {
            note.attack = attack;
        }
        if let Some(decay) = self.dec {
            note.decay = decay;
        }
        if let Some(over) = self.over {
            note.overtones = over.resolve(packages)?;
        }
        if let Some(wave) = self.wave {
            note.wave = wave.parse()?;
        }
        if let Some(envelope) = self.envelope {
            note.envelope = envelope.parse()?;
        }
        if let Some(dynamic) = self.dynamic {
            note.dynamic = dynamic.parse()?;
        }
        if let Some(start) = self.start {
            note.start = start;
        }
        if let Some(target) = self.to {
            note.dynamic_curve.target = target;
        }
        if let Some(start) = self.start_d {
            note.dynamic_curve.start = start;
        }
        note.dynamic_curve.end = self.end_d;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct NoteObject {
    freq: Freq,
    dur: f64,
    vol: f64,
    #[serde(default)]
    freq2: Option<Freq>,
    #[serde(flatten)]
    extras: Extras,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TrillObject {
    freq1: Freq,
    freq2: Freq,
    length: f64,
    num: u32,
    vol: f64,
    #[serde(flatten)]
    extras: Extras,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

/// The two ways of writing a note or trill, told apart by the JSON type.
enum Form<T> {
    List(Vec<Value>),
    Object(T),
}

impl<T: DeserializeOwned> Form<T> {
    fn from_value(value: Value, what: &str) -> Result<Self, NotationError> {
        match value {
            Value::Array(items) => Ok(Form::List(items)),
            Value::Object(_) => serde_json::from_value(value)
                .map(Form::Object)
                .map_err(|err| NotationError::Format {
                    reason: format!("invalid {}: {}", what, err),
                }),
            other => Err(NotationError::Format {
                reason: format!("{} could not be understood as a {}", other, what),
            }),
        }
    }
}

fn reject_unknown(unknown: &BTreeMap<String, Value>, what: &str) -> Result<(), NotationError> {
    match unknown.keys().next() {
        Some(field) => Err(NotationError::Format {
            reason: format!("unknown {} field {:?}", what, field),
        }),
        None => Ok(()),
    }
}

/// Positional values of a list form, taken from the front.
struct Positional {
    what: &'static str,
    items: std::vec::IntoIter<Value>,
    position: usize,
}

impl Positional {
    /// Check the number of values: `required`, followed by up to three of `start`, `wave`, `over`.
    fn new(items: Vec<Value>, required: usize, what: &'static str) -> Result<Self, NotationError> {
        if items.len() < required || items.len() > required + 3 {
            return Err(NotationError::Format {
                reason: format!(
                    "a {} list takes {} to {} values, {} provided",
                    what,
                    required,
                    required + 3,
                    items.len()
                ),
            });
        }
        Ok(Positional {
            what,
            items: items.into_iter(),
            position: 0,
        })
    }

    fn next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, NotationError> {
        let value = match self.items.next() {
            Some(value) => value,
            None => return Ok(None),
        };
        let position = self.position;
        self.position += 1;
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| NotationError::Format {
                reason: format!("{} value at position {}: {}", self.what, position, err),
            })
    }

    fn required<T: DeserializeOwned>(&mut self) -> Result<T, NotationError> {
        // The length was checked up front, so required values are always present.
        self.next()?.ok_or_else(|| NotationError::Format {
            reason: format!("missing {} value at position {}", self.what, self.position),
        })
    }

    /// The trailing optional values, in the order `start`, `wave`, `over`.
    fn extras(mut self) -> Result<Extras, NotationError> {
        Ok(Extras {
            start: self.next()?,
            wave: self.next()?,
            over: self.next()?,
            ..Extras::default()
        })
    }
}

/// Resolve a note in either form into a canonical note.
///
/// The list form is `[freq, dur, vol, start?, wave?, over?]`.
pub fn resolve_note(value: Value, packages: &Packages) -> Result<Note, NotationError> {
    let (mut note, extras) = match Form::<NoteObject>::from_value(value, "note")? {
        Form::List(items) => {
            let mut values = Positional::new(items, 3, "note")?;
            let freq: Freq = values.required()?;
            let note = Note::new(freq.resolve()?, values.required()?, values.required()?);
            (note, values.extras()?)
        }
        Form::Object(object) => {
            reject_unknown(&object.unknown, "note")?;
            let mut note = Note::new(object.freq.resolve()?, object.dur, object.vol);
            if let Some(freq2) = object.freq2 {
                note.glide_target = freq2.resolve()?;
            }
            (note, object.extras)
        }
    };
    extras.apply(&mut note, packages)?;
    Ok(note)
}

/// Resolve a trill in either form.
///
/// The list form is `[freq1, freq2, length, num, vol, start?, wave?, over?]`.
pub fn resolve_trill(value: Value, packages: &Packages) -> Result<Trill, NotationError> {
    let (mut trill, extras) = match Form::<TrillObject>::from_value(value, "trill")? {
        Form::List(items) => {
            let mut values = Positional::new(items, 5, "trill")?;
            let first: Freq = values.required()?;
            let second: Freq = values.required()?;
            let trill = Trill::new(
                first.resolve()?,
                second.resolve()?,
                values.required()?,
                values.required()?,
                values.required()?,
            );
            (trill, values.extras()?)
        }
        Form::Object(object) => {
            reject_unknown(&object.unknown, "trill")?;
            let trill = Trill::new(
                object.freq1.resolve()?,
                object.freq2.resolve()?,
                object.length,
                object.num,
                object.vol,
            );
            (trill, object.extras)
        }
    };
    extras.apply(&mut trill.template, packages)?;
    Ok(trill)
}
