// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::{Connection, Format};
use bmc_validate::prelude::*;
use bmc_validate::sel::{self, observed_lines};
use std::io::Write;
use std::path::Path;

/// Returns the SEL dump stored in `input`, or the one of the BMC if there is no input file.
pub fn dump(connection: &Connection, input: Option<&Path>) -> Result<String, Error> {
    match input {
        Some(input) => Ok(std::fs::read_to_string(input)
            .inspect_err(|err| log::error!("Failed to read {}: {err}", input.display()))?),
        None => connection.bmc().sel_list(),
    }
}

pub fn check<T: ManifestTree>(
    manifests: &mut ManifestManager<T>,
    name: &str,
    dump: &str,
) -> Outcome {
    let manifest = match manifests.get(name) {
        Ok(manifest) => manifest,
        Err(err) => return Outcome::skipped(name, err),
    };

    let observed = observed_lines(dump);
    let result = reconcile(&observed, manifest);

    for pattern in &result.missing {
        println!("Missing: {pattern}");
    }
    for line in result.unexpected.iter().flatten() {
        println!("Unexpected: {line}");
    }

    if result.passed {
        Outcome::pass(name, format!("{} events", observed.len()))
    } else if !result.missing.is_empty() {
        Outcome::fail(name, format!("{} required events missing", result.missing.len()))
    } else {
        let count = result.unexpected.map_or(0, |unexpected| unexpected.len());
        Outcome::fail(name, format!("{count} unexpected events"))
    }
}

pub fn show<O: Write>(dump: &str, format: Format, mut output: O) -> Result<(), Error> {
    let entries: Vec<sel::Entry> = observed_lines(dump)
        .into_iter()
        .filter_map(|line| {
            let entry = sel::Entry::from_line(line);
            if entry.is_none() {
                log::warn!("Skipping malformed SEL line: {line}");
            }
            entry
        })
        .collect();

    match format {
        Format::Compact => {
            for entry in entries {
                writeln!(output, "{entry}")?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut output, &entries)?;
            writeln!(output)?;
        }
    }
    Ok(())
}
