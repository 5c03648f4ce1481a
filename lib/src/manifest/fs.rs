// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::{ManifestManager, ManifestTree};
use crate::Error;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Provides access to manifests stored in the file system.
///
/// The manifest of a check named `NAME` is stored in `ROOT/NAME.json`.
///
/// A [`ManifestManager`] that uses manifests stored in the file system can be created using the
/// [`ManifestManager::file_system_tree`] function.
pub struct FileSystemTree {
    root: PathBuf,
}

impl FileSystemTree {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn build_path(&self, name: &str) -> Option<PathBuf> {
        let base = self.root.canonicalize().ok()?;

        let mut path = base.clone();
        path.push(format!("{name}.{EXTENSION}"));

        path.canonicalize()
            .ok()
            .filter(|path| path.starts_with(&base))
    }
}

impl ManifestTree for FileSystemTree {
    fn get(&self, name: &str) -> Result<Vec<u8>, Error> {
        let Some(path) = self.build_path(name) else {
            return Err(Error::MissingManifest(name.into()));
        };

        log::debug!("Reading manifest {}", path.display());
        Ok(std::fs::read(path)?)
    }

    fn names(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }
}

impl ManifestManager<FileSystemTree> {
    /// Creates a [`ManifestManager`] that reads the manifests from the directory located at
    /// `root`. The manifests are loaded on first use.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::prelude::*;
    /// use std::path::Path;
    ///
    /// let mut manifests = ManifestManager::file_system_tree(Path::new("manifests"));
    /// assert!(manifests.get("ac_cycle").is_ok());
    /// assert!(manifests.get("does_not_exist").is_err());
    /// ```
    pub fn file_system_tree(root: &Path) -> Self {
        Self::new(FileSystemTree::new(root))
    }
}
