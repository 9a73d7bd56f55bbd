// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

fn play_binary() -> PathBuf {
    // For properly recording the sox dependency on nix:
    if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
        debug!("using sox from nix store {}", sox_bin);
        Path::new(sox_bin).join("play")
    } else {
        "play".into()
    }
}

/// Arguments telling sox to read raw mono `f32` samples from stdin.
fn input_args(sample_rate: u32) -> Vec<String> {
    vec![
        "-q".into(),
        "--channels".into(),
        "1".into(),
        "--rate".into(),
        sample_rate.to_string(),
        "--type".into(),
        "f32".into(),
        "/dev/stdin".into(),
    ]
}

/// Play raw little-endian `f32` mono samples on the default speakers and wait until done.
pub fn play(sample_rate: u32, audio: &[u8]) -> io::Result<()> {
    let mut player = Command::new(play_binary())
        .args(input_args(sample_rate))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let written = match player.stdin.take() {
        Some(mut audio_stream) => audio_stream
            .write_all(audio)
            .and_then(|_| audio_stream.flush()),
        None => Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "sox player has no input stream",
        )),
    };
    // sox exits once the input stream is closed, which happened when it was dropped above.
    let status = player.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("sox player failed with {}", status),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn raw_input_format() {
        assert_eq!(
            input_args(22050).join(" "),
            "-q --channels 1 --rate 22050 --type f32 /dev/stdin"
        );
    }
}
