// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

#[cfg(feature = "embedded_manifests")]
use std::{
    collections::BTreeSet,
    env,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

#[cfg(feature = "embedded_manifests")]
const MANIFEST_PATH_VAR: &str = "BMCV_MANIFEST_DIR";
#[cfg(feature = "embedded_manifests")]
const CHECKS_VAR: &str = "BMCV_CHECKS";

#[cfg(feature = "embedded_manifests")]
fn embed_manifests() {
    cargo_emit::rerun_if_env_changed!(MANIFEST_PATH_VAR);
    cargo_emit::rerun_if_env_changed!(CHECKS_VAR);

    let manifest_dir = env::var(MANIFEST_PATH_VAR).unwrap_or_else(|_| "manifests".to_string());

    cargo_emit::rerun_if_changed!(manifest_dir);

    let requested_checks: BTreeSet<String> = env::var(CHECKS_VAR)
        .unwrap_or_else(|_| String::new())
        .split(",")
        .filter(|s| !s.is_empty())
        .map(|s| s.trim().to_owned())
        .collect();

    let mut included_checks = BTreeSet::new();

    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("embedded_manifests.rs");
    let mut file = File::create(dest_path).unwrap();

    let root = std::path::absolute(Path::new(&manifest_dir)).unwrap();
    file.write_all("{\n".as_ref()).unwrap();
    for (name, fullpath) in visit_manifests(&root) {
        // Check if the manifest must be embedded
        if !requested_checks.is_empty() && !requested_checks.contains(&name) {
            continue;
        }

        file.write_all(
            format!("    tree.insert_item({name:?}, include_bytes!({fullpath:?}));\n").as_ref(),
        )
        .unwrap();
        included_checks.insert(name);
    }
    file.write_all("}\n".as_ref()).unwrap();

    for requested_check in requested_checks {
        if !included_checks.contains(&requested_check) {
            cargo_emit::warning!("Requested unknown check manifest: {}", requested_check);
        }
    }
}

#[cfg(feature = "embedded_manifests")]
fn visit_manifests(root: &Path) -> Vec<(String, PathBuf)> {
    let mut items = Vec::new();

    let Ok(entries) = std::fs::read_dir(root) else {
        cargo_emit::warning!("No manifest directory found at {}", root.display());
        return items;
    };

    for entry in entries {
        let path = entry.unwrap().path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
            items.push((name.to_string(), path.clone()));
        }
    }

    items.sort();
    items
}

fn main() {
    #[cfg(feature = "embedded_manifests")]
    embed_manifests();
}
