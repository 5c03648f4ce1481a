// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Declarative expectations for the System Event Log checks.
//!
//! A manifest lists the log lines a check expects to find in the SEL. Each check is identified by
//! a name (for example `ac_cycle`) and its manifest is fetched from a [`ManifestTree`]:
//! - [`EmbeddedTree`]: the manifests bundled in the library at build time.
//! - [`FileSystemTree`]: a directory holding one `<name>.json` file per check.

#[cfg(feature = "embedded_manifests")]
mod embedded;
#[cfg(feature = "fs_manifests")]
mod fs;

use crate::Error;
use crate::utils::Map;
use serde::de::{self, Deserializer};
use serde::Deserialize;
#[cfg(feature = "serialize")]
use serde::Serialize;

#[cfg(feature = "embedded_manifests")]
pub use embedded::EmbeddedTree;
#[cfg(feature = "fs_manifests")]
pub use fs::FileSystemTree;

/// A single expected log line.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Entry {
    /// Text that must appear in a matching log line
    pub contains: String,
    /// At least one log line must match this entry
    #[serde(default, deserialize_with = "flag")]
    pub required: bool,
    /// The entry may match several log lines
    #[serde(default, rename = "allowduplicates", deserialize_with = "flag")]
    pub allow_duplicates: bool,
}

impl Entry {
    /// Returns a required entry that matches a single log line.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::manifest::Entry;
    ///
    /// let entry = Entry::required("Power off/down");
    /// assert!(entry.required);
    /// assert!(!entry.allow_duplicates);
    /// ```
    pub fn required(contains: &str) -> Self {
        Entry {
            contains: contains.into(),
            required: true,
            allow_duplicates: false,
        }
    }

    /// Returns an optional entry that matches a single log line.
    pub fn optional(contains: &str) -> Self {
        Entry {
            contains: contains.into(),
            required: false,
            allow_duplicates: false,
        }
    }

    /// Allows the entry to match any number of log lines.
    pub fn with_duplicates(self) -> Self {
        Entry {
            allow_duplicates: true,
            ..self
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

/// Accepts both JSON booleans and the `"true"`/`"false"` strings found in legacy manifests.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) if text.trim().eq_ignore_ascii_case("true") => Ok(true),
        Flag::Text(text) if text.trim().eq_ignore_ascii_case("false") => Ok(false),
        Flag::Text(text) => Err(de::Error::custom(format!(
            "expected \"true\" or \"false\", found {text:?}"
        ))),
    }
}

/// The expected content of the System Event Log after a check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Manifest {
    /// Entries that must be matched by at least one log line
    pub required: Vec<Entry>,
    /// Entries that may be matched
    pub optional: Vec<Entry>,
}

impl Manifest {
    /// Parses a manifest stored as a JSON list of entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::manifest::Manifest;
    ///
    /// let manifest = Manifest::from_slice(br#"[
    ///     {"contains": "Power off/down", "required": "true", "allowduplicates": "false"},
    ///     {"contains": "Log area reset/cleared", "required": "false", "allowduplicates": "true"}
    /// ]"#).unwrap();
    ///
    /// assert_eq!(manifest.required.len(), 1);
    /// assert_eq!(manifest.optional.len(), 1);
    /// assert!(manifest.optional[0].allow_duplicates);
    /// ```
    pub fn from_slice(s: &[u8]) -> Result<Self, Error> {
        let entries: Vec<Entry> = serde_json::from_slice(s)?;

        if let Some(entry) = entries.iter().find(|entry| entry.contains.is_empty()) {
            return Err(Error::InvalidManifest(format!(
                "entry with an empty pattern: {entry:?}"
            )));
        }

        Ok(Manifest::from_iter(entries))
    }

    /// Returns all the entries of the manifest, required entries first.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.required.iter().chain(self.optional.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

impl FromIterator<Entry> for Manifest {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let (required, optional) = iter.into_iter().partition(|entry| entry.required);
        Manifest { required, optional }
    }
}

/// A trait representing a data structure that stores the manifest files of the checks.
pub trait ManifestTree {
    /// Returns the raw content of the manifest associated to the check `name`.
    fn get(&self, name: &str) -> Result<Vec<u8>, Error>;
    /// Returns the names of all the checks that have a manifest.
    fn names(&self) -> Result<Vec<String>, Error>;
}

/// Loads and caches the manifests of the checks.
pub struct ManifestManager<T: ManifestTree> {
    tree: T,
    manifests: Map<String, Manifest>,
}

impl<T: ManifestTree> ManifestManager<T> {
    /// Creates a manifest manager for a given manifest `tree`.
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            manifests: Map::default(),
        }
    }

    /// Returns the manifest of the check `name`.
    ///
    /// A missing or malformed manifest is reported as an error: the check cannot be evaluated.
    pub fn get(&mut self, name: &str) -> Result<&Manifest, Error> {
        if !self.manifests.contains_key(name) {
            let raw = self.tree.get(name)?;
            let manifest = Manifest::from_slice(&raw).inspect_err(|err| {
                log::error!("Cannot parse the manifest of {name}: {err}");
            })?;
            log::debug!(
                "Loaded manifest {name}: {} required, {} optional",
                manifest.required.len(),
                manifest.optional.len()
            );
            self.manifests.insert(name.to_string(), manifest);
        }

        self.manifests.get(name).ok_or(Error::InternalError)
    }

    /// Returns the sorted names of the checks available in the tree.
    pub fn names(&self) -> Result<Vec<String>, Error> {
        let mut names = self.tree.names()?;
        names.sort();
        names.dedup();
        Ok(names)
    }
}
