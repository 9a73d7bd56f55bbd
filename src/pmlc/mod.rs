// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Implementation of the notation compiler (pmlc): what to do with which files.
//!
//! - Notation documents end in `.pml` or `.json` and may be followed by package files (`.json`).
//! - Stored scores end in `.pmusic`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use serde_json::Value;
use snafu::Snafu;

use crate::notation::{self, NotationError, Packages};
use crate::output::{self, wav::WAV_EXT};
use crate::score::{self, Score, DEFAULT_RATE, SCORE_EXT};

pub const PML_EXT: &str = "pml";
pub const JSON_EXT: &str = "json";

#[derive(Debug, Snafu)]
pub enum PmlcError {
    #[snafu(display("{}", reason))]
    Usage { reason: String },
    #[snafu(display("file {} of unsupported format", path.display()))]
    UnsupportedFormat { path: PathBuf },
    #[snafu(display("{}: {}", path.display(), source))]
    Io { path: PathBuf, source: io::Error },
    #[snafu(display("{}: {}", path.display(), source))]
    Notation { path: PathBuf, source: NotationError },
    #[snafu(display("could not write {}: {}", path.display(), source))]
    Wav { path: PathBuf, source: hound::Error },
    #[snafu(display("could not play audio: {}", source))]
    Player { source: io::Error },
}

fn usage(reason: &str) -> PmlcError {
    PmlcError::Usage {
        reason: reason.to_string(),
    }
}

/// What a single invocation does.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Notation to stored score.
    Compile,
    /// Notation or stored score to wav file.
    Wave,
    /// Notation or stored score to speakers.
    Play,
    /// Write an empty starter document.
    Generate,
}

impl Mode {
    /// Pick the mode from the command line flags. Compiling is the default.
    pub fn from_flags(
        compile: bool,
        wave: bool,
        play: bool,
        generate: bool,
    ) -> Result<Mode, PmlcError> {
        let selected: Vec<Mode> = [
            (compile, Mode::Compile),
            (wave, Mode::Wave),
            (play, Mode::Play),
            (generate, Mode::Generate),
        ]
        .iter()
        .filter(|(flag, _)| *flag)
        .map(|(_, mode)| *mode)
        .collect();
        match selected[..] {
            [] => Ok(Mode::Compile),
            [mode] => Ok(mode),
            _ => Err(usage("cannot specify multiple modes")),
        }
    }
}

/// Run one mode on the given paths. `output` overrides the default output path.
pub fn run(mode: Mode, paths: &[PathBuf], output: Option<&Path>) -> Result<(), PmlcError> {
    if paths.is_empty() && mode != Mode::Generate {
        return Err(usage("no files provided"));
    }
    match mode {
        Mode::Compile => compile(paths, output).map(|_| ()),
        Mode::Wave => wave(paths, output).map(|_| ()),
        Mode::Play => play(paths),
        Mode::Generate => generate(paths, output).map(|_| ()),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Input {
    Document,
    StoredScore,
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().map_or(false, |e| e == ext)
}

fn input_kind(path: &Path) -> Result<Input, PmlcError> {
    if has_extension(path, PML_EXT) || has_extension(path, JSON_EXT) {
        Ok(Input::Document)
    } else if has_extension(path, SCORE_EXT) {
        Ok(Input::StoredScore)
    } else {
        Err(PmlcError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

fn read(path: &Path) -> Result<String, PmlcError> {
    fs::read_to_string(path).map_err(|source| PmlcError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load package files, each named after its file name without the extension.
pub fn load_packages(paths: &[PathBuf]) -> Result<Packages, PmlcError> {
    let mut packages = Packages::new();
    for path in paths {
        let name = match path.file_stem() {
            Some(stem) if has_extension(path, JSON_EXT) => stem.to_string_lossy(),
            _ => {
                return Err(PmlcError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        packages
            .insert_json(&name, &read(path)?)
            .map_err(|source| PmlcError::Notation {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(packages)
}

fn compile_document(paths: &[PathBuf]) -> Result<Score, PmlcError> {
    let packages = load_packages(&paths[1..])?;
    let document = &paths[0];
    info!("compiling {}", document.display());
    notation::compile(&read(document)?, &packages).map_err(|source| PmlcError::Notation {
        path: document.clone(),
        source,
    })
}

/// Build the score described by the input files: either a document followed by
/// its packages, or a single stored score.
pub fn load(paths: &[PathBuf]) -> Result<Score, PmlcError> {
    let first = paths.first().ok_or_else(|| usage("no files provided"))?;
    match input_kind(first)? {
        Input::Document => compile_document(paths),
        Input::StoredScore => {
            if paths.len() > 1 {
                return Err(usage("too many files provided"));
            }
            info!("loading {}", first.display());
            Score::from_json(&read(first)?).map_err(|source| PmlcError::Notation {
                path: first.clone(),
                source,
            })
        }
    }
}

/// Compile a document into a stored score. Returns the path written to.
pub fn compile(paths: &[PathBuf], output: Option<&Path>) -> Result<PathBuf, PmlcError> {
    let first = paths.first().ok_or_else(|| usage("no files provided"))?;
    if input_kind(first)? != Input::Document {
        return Err(PmlcError::UnsupportedFormat {
            path: first.clone(),
        });
    }
    let score = compile_document(paths)?;
    let dest = output.map_or_else(|| first.with_extension(SCORE_EXT), Path::to_path_buf);
    score.save(&dest).map_err(|source| PmlcError::Io { path: dest, source })
}

/// Render the input into a wav file. Returns the path written to.
pub fn wave(paths: &[PathBuf], output: Option<&Path>) -> Result<PathBuf, PmlcError> {
    let score = load(paths)?;
    let dest = output.map_or_else(|| paths[0].with_extension(WAV_EXT), Path::to_path_buf);
    score
        .export(&dest)
        .map_err(|source| PmlcError::Wav { path: dest, source })
}

/// Render the input and play it on the speakers.
pub fn play(paths: &[PathBuf]) -> Result<(), PmlcError> {
    let score = load(paths)?;
    info!("playing {:?} ({:.2} seconds)", score.title(), score.length());
    output::sox::play(score.sample_rate(), &score.render_bytes())
        .map_err(|source| PmlcError::Player { source })
}

#[derive(Serialize)]
struct Starter {
    title: String,
    rate: u32,
    notes: Vec<Value>,
    trills: Vec<Value>,
}

/// Write an empty document. The first path is the title, a second path `json`
/// selects the `.json` extension instead of `.pml`. Returns the path written to.
pub fn generate(paths: &[PathBuf], output: Option<&Path>) -> Result<PathBuf, PmlcError> {
    let (stem, title) = match paths.first() {
        Some(name) => (name.clone(), name.to_string_lossy().into_owned()),
        None => (PathBuf::from("untitled"), "Untitled".to_string()),
    };
    let ext = match paths.get(1) {
        Some(kind) if kind.to_string_lossy().eq_ignore_ascii_case(JSON_EXT) => JSON_EXT,
        _ => PML_EXT,
    };
    let dest = output.map_or_else(|| score::with_extension(&stem, ext), Path::to_path_buf);

    let starter = Starter {
        title,
        rate: DEFAULT_RATE,
        notes: Vec::new(),
        trills: Vec::new(),
    };
    let written = serde_json::to_string_pretty(&starter)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
        .and_then(|json| fs::write(&dest, json));
    match written {
        Ok(()) => {
            info!("wrote {}", dest.display());
            Ok(dest)
        }
        Err(source) => Err(PmlcError::Io { path: dest, source }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DOCUMENT: &str = r#"{
        "title": "test",
        "rate": 8000,
        "notes": [["OVT 220 2", 0.5, 0.5, 0.0, "any_acc", "strings.violin"]],
        "trills": [[300, 400, 0.5, 2, 0.25, 0.5]]
    }"#;

    fn write_inputs(dir: &Path) -> Vec<PathBuf> {
        let doc = dir.join("song.pml");
        let pkg = dir.join("strings.json");
        fs::write(&doc, DOCUMENT).unwrap();
        fs::write(&pkg, r#"{"violin": [[2, 0.5]]}"#).unwrap();
        vec![doc, pkg]
    }

    #[test]
    fn modes_from_flags() {
        assert_eq!(Mode::from_flags(false, false, false, false).unwrap(), Mode::Compile);
        assert_eq!(Mode::from_flags(false, true, false, false).unwrap(), Mode::Wave);
        assert_eq!(Mode::from_flags(false, false, false, true).unwrap(), Mode::Generate);
        expect_test::expect!["cannot specify multiple modes"].assert_eq(
            &Mode::from_flags(true, false, true, false)
                .unwrap_err()
                .to_string(),
        );
    }

    #[test]
    fn missing_paths() {
        assert!(matches!(
            run(Mode::Wave, &[], None),
            Err(PmlcError::Usage { .. })
        ));
        assert!(matches!(
            run(Mode::Compile, &[PathBuf::from("song.mid")], None),
            Err(PmlcError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn compile_then_render() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let inputs = write_inputs(dir);

        let stored = compile(&inputs, None).unwrap();
        assert_eq!(stored, dir.join("song.pmusic"));
        let score = load(&[stored.clone()]).unwrap();
        assert_eq!(score.title(), "test");
        assert_eq!(score.notes().count(), 3);
        assert_eq!(score.notes().next().unwrap().overtones.len(), 1);

        let wav = wave(&[stored.clone()], None).unwrap();
        assert_eq!(wav, dir.join("song.wav"));
        let reader = hound::WavReader::open(&wav).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 8000);

        // rendering straight from the document gives the same file
        let direct = wave(&inputs, Some(dir.join("direct").as_path())).unwrap();
        assert_eq!(direct, dir.join("direct.wav"));
        assert_eq!(fs::read(&direct).unwrap(), fs::read(&wav).unwrap());

        // stored scores stand alone
        assert!(matches!(
            load(&[stored, inputs[1].clone()]),
            Err(PmlcError::Usage { .. })
        ));
    }

    #[test]
    fn bad_inputs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let inputs = write_inputs(dir);

        // the package is missing
        assert!(matches!(
            compile(&inputs[..1], None),
            Err(PmlcError::Notation {
                source: NotationError::UnresolvedOvertones { .. },
                ..
            })
        ));
        let txt = dir.join("strings.txt");
        fs::write(&txt, "{}").unwrap();
        assert!(matches!(
            compile(&[inputs[0].clone(), txt], None),
            Err(PmlcError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            compile(&[dir.join("missing.pml")], None),
            Err(PmlcError::Io { .. })
        ));
        // nothing was written on failure
        assert!(!dir.join("song.pmusic").exists());
    }

    #[test]
    fn starter_document() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let path = generate(
            &[dir.join("fresh"), PathBuf::from("JSON")],
            None,
        )
        .unwrap();
        assert_eq!(path, dir.join("fresh.json"));
        let starter: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(starter["rate"], 44100);
        assert_eq!(starter["notes"], serde_json::json!([]));

        let score = load(&[path]).unwrap();
        assert_eq!(score.length(), 0.0);

        let path = generate(&[], Some(dir.join("default.pml").as_path())).unwrap();
        let starter: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(starter["title"], "Untitled");
    }
}
