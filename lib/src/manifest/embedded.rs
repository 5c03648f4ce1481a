// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::{ManifestManager, ManifestTree};
use crate::Error;
use crate::utils::Map;

/// Provides access to the manifests embedded in the library.
#[derive(Default)]
pub struct EmbeddedTree {
    registry: Map<&'static str, &'static [u8]>,
}

impl EmbeddedTree {
    fn new() -> Self {
        let mut tree = Self::default();
        include!(concat!(env!("OUT_DIR"), "/embedded_manifests.rs"));
        tree
    }

    #[allow(dead_code)]
    fn insert_item(&mut self, name: &'static str, content: &'static [u8]) {
        self.registry.insert(name, content);
    }
}

impl ManifestTree for EmbeddedTree {
    fn get(&self, name: &str) -> Result<Vec<u8>, Error> {
        self.registry
            .get(name)
            .map(|data| Vec::from(*data))
            .ok_or_else(|| Error::MissingManifest(name.into()))
    }

    fn names(&self) -> Result<Vec<String>, Error> {
        Ok(self.registry.keys().map(|name| name.to_string()).collect())
    }
}

impl ManifestManager<EmbeddedTree> {
    /// Creates a [`ManifestManager`] that uses the manifests embedded in the library. This
    /// allows the checks to run without any file system access.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::prelude::*;
    ///
    /// let manifests = ManifestManager::embedded_tree();
    /// assert!(manifests.names().unwrap().contains(&"ac_cycle".to_string()));
    /// ```
    pub fn embedded_tree() -> Self {
        Self::new(EmbeddedTree::new())
    }
}
