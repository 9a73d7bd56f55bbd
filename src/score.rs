// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A score is a set of notes placed on a timeline, together with their rendered samples.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use serde::Serialize;

use crate::note::{Note, Trill};
use crate::notation::{self, NotationError, Packages};
use crate::output;
use crate::synth::{self, invalid, SynthError};
use crate::wave::{self, Buffer};

/// File extension of stored scores.
pub const SCORE_EXT: &str = "pmusic";

pub const DEFAULT_RATE: u32 = 44100;
pub const DEFAULT_TITLE: &str = "untitled";

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    sample_rate: u32,
    title: String,
    /// The notes in the order they were added, each with its rendered samples.
    notes: Vec<(Note, Buffer)>,
    /// Time in seconds when the last note has finished.
    length: f64,
}

#[derive(Serialize)]
struct StoredScore<'a> {
    title: &'a str,
    rate: u32,
    notes: Vec<&'a Note>,
}

impl Score {
    pub fn new(sample_rate: u32, title: &str) -> Self {
        Score {
            sample_rate,
            title: title.to_string(),
            notes: Vec::new(),
            length: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Length of the score in seconds. Only ever grows when adding notes.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Iterate the notes in the order they were added.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().map(|(note, _)| note)
    }

    /// Render a note and place it on the timeline.
    /// A note that fails to render leaves the score unchanged.
    pub fn add(&mut self, note: Note) -> Result<(), SynthError> {
        if note.start < 0.0 || note.start.is_nan() {
            return Err(invalid("start", note.start, "must not be negative"));
        }
        let buffer = synth::render_note(&note, self.sample_rate)?;
        if !wave::fits(note.end(), self.sample_rate) {
            return Err(invalid("end", note.end(), "is too far into the score"));
        }
        debug!(
            "added {} Hz {} at {}s for {}s",
            note.frequency, note.wave, note.start, note.duration
        );
        self.length = self.length.max(note.end());
        self.notes.push((note, buffer));
        Ok(())
    }

    /// Add every note of the trill.
    pub fn add_trill(&mut self, trill: &Trill) -> Result<(), SynthError> {
        for note in trill.notes()? {
            self.add(note)?;
        }
        Ok(())
    }

    /// Mix all notes into a single buffer of `round(length * sample_rate)` samples.
    ///
    /// Samples are summed without any clipping or normalization.
    pub fn render(&self) -> Buffer {
        let mut canvas = vec![0.0; wave::samples(self.length, self.sample_rate)];
        for (note, buffer) in self.notes.iter() {
            let offset = wave::samples(note.start, self.sample_rate);
            let mixed = wave::mix_into(&mut canvas, buffer, offset);
            if mixed < buffer.len() {
                trace!(
                    "dropped {} trailing samples of the note at {}s",
                    buffer.len() - mixed,
                    note.start
                );
            }
        }
        info!(
            "rendered {:?}: {} notes, {} samples at {} Hz",
            self.title,
            self.notes.len(),
            canvas.len(),
            self.sample_rate
        );
        canvas
    }

    /// The rendered score as raw little-endian `f32` samples.
    pub fn render_bytes(&self) -> Vec<u8> {
        let samples = self.render();
        let mut bytes = vec![0; samples.len() * std::mem::size_of::<f32>()];
        output::copy_f32_bytes(&samples, &mut bytes);
        bytes
    }

    /// Render and write the score as 16 bit mono PCM wav.
    pub fn export_to<W: io::Write + io::Seek>(&self, writer: W) -> Result<(), hound::Error> {
        output::wav::write_pcm16(writer, self.sample_rate, &self.render())
    }

    /// Render the score into a wav file, appending `.wav` to the path if necessary.
    pub fn export(&self, path: &Path) -> Result<PathBuf, hound::Error> {
        let path = with_extension(path, output::wav::WAV_EXT);
        let file = io::BufWriter::new(fs::File::create(&path)?);
        self.export_to(file)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Serialize the score description. Trills are stored as their individual notes.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&StoredScore {
            title: &self.title,
            rate: self.sample_rate,
            notes: self.notes().collect(),
        })
    }

    /// Rebuild a score from its stored description, rendering every note again.
    pub fn from_json(source: &str) -> Result<Score, NotationError> {
        notation::compile(source, &Packages::default())
    }

    /// Store the score, appending `.pmusic` to the path if necessary.
    pub fn save(&self, path: &Path) -> io::Result<PathBuf> {
        let path = with_extension(path, SCORE_EXT);
        let json = self
            .to_json()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(&path, json)?;
        info!("saved {} notes to {}", self.notes.len(), path.display());
        Ok(path)
    }
}

/// Append `ext` unless the path already ends with it.
pub fn with_extension(path: &Path, ext: &str) -> PathBuf {
    if path.extension().map_or(false, |e| e == ext) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }
}
