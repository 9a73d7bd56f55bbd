// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `pmlc` - the compiler for notation files to stored scores, wav files or speakers.

use std::path::PathBuf;

use log::error;
use structopt::StructOpt;

use puremusic::pmlc::{self, Mode};

#[derive(Debug, StructOpt)]
#[structopt(name = "pmlc", about = "Compiling notation into music")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Compile a notation document (.pml, .json) into a stored score (.pmusic). The default mode.
    #[structopt(short, long)]
    compile: bool,

    /// Export a notation document or stored score to a .wav file.
    #[structopt(short, long)]
    wave: bool,

    /// Play a notation document or stored score through the speakers (needs sox).
    #[structopt(short, long)]
    play: bool,

    /// Write an empty document. Paths are the title and optionally `json` for a .json file.
    #[structopt(short, long)]
    generate: bool,

    /// Output file. Defaults to the input file with the extension of the output format.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// A notation document followed by its package files (.json), or a stored score.
    #[structopt(parse(from_os_str))]
    paths: Vec<PathBuf>,
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("could not set up logging: {}", err);
    }

    let result = Mode::from_flags(opt.compile, opt.wave, opt.play, opt.generate)
        .and_then(|mode| pmlc::run(mode, &opt.paths, opt.output.as_deref()));
    if let Err(err) = result {
        error!("{}", err);
        std::process::exit(1);
    }
}
