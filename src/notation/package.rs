// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Named collections of overtone sets, referenced from notes as `<package>.<item>`.

use std::collections::HashMap;

use log::debug;

use super::NotationError;
use crate::synth::Overtone;

/// The overtone sets of one package, by name.
pub type Package = HashMap<String, Vec<Overtone>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packages {
    packages: HashMap<String, Package>,
}

impl Packages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, package: Package) {
        debug!("package {:?} with {} overtone sets", name, package.len());
        self.packages.insert(name.to_string(), package);
    }

    /// Parse a package file (a JSON object of overtone lists) and register it under `name`.
    pub fn insert_json(&mut self, name: &str, source: &str) -> Result<(), NotationError> {
        let package: Package =
            serde_json::from_str(source).map_err(|err| NotationError::Json { source: err })?;
        self.insert(name, package);
        Ok(())
    }

    /// Look up a reference of the form `<package>.<item>`.
    /// Only the first dot separates package from item.
    ///
    /// ```
    /// use puremusic::notation::Packages;
    /// let mut packages = Packages::new();
    /// packages.insert_json("strings", r#"{"violin": [[2, 0.5], [3, 0.25]]}"#).unwrap();
    /// assert_eq!(packages.lookup("strings.violin").unwrap().len(), 2);
    /// assert!(packages.lookup("strings.viola").is_err());
    /// assert!(packages.lookup("violin").is_err());
    /// ```
    pub fn lookup(&self, reference: &str) -> Result<&[Overtone], NotationError> {
        reference
            .split_once('.')
            .and_then(|(package, item)| self.packages.get(package)?.get(item))
            .map(|overtones| &overtones[..])
            .ok_or_else(|| NotationError::UnresolvedOvertones {
                reference: reference.to_string(),
            })
    }
}
