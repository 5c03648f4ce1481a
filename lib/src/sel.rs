// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Verification of the System Event Log against the expectations of a [`Manifest`].
//!
//! The SEL dump produced by the IPMI utility is consumed as plain text, one event per line. A log
//! line matches a manifest entry when it contains the text of the entry, which tolerates the
//! record IDs and timestamps that prefix every line.

mod entry;

use crate::manifest::{Entry as ManifestEntry, Manifest};
#[cfg(feature = "serialize")]
use serde::Serialize;

pub use entry::Entry;

const NO_ENTRIES: &str = "SEL has no entries";

/// Outcome of the comparison of a SEL dump with a [`Manifest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Reconciliation {
    /// Indicates if the SEL matches the manifest
    pub passed: bool,
    /// Log lines that did not match any manifest entry.
    ///
    /// Only computed when all the required entries have been found: this is [`None`] when the
    /// check passed or when a required entry is missing.
    pub unexpected: Option<Vec<String>>,
    /// Patterns of the required entries that no log line matched
    pub missing: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Duplicates {
    Allowed,
    UnusedOnce,
    ConsumedOnce,
}

impl Duplicates {
    fn of(entry: &ManifestEntry) -> Self {
        if entry.allow_duplicates {
            Duplicates::Allowed
        } else {
            Duplicates::UnusedOnce
        }
    }
}

/// Compares the `observed` SEL lines with the entries of a `manifest`.
///
/// The check passes when every required entry is matched by at least one line and every line
/// matches an entry. Each line is attributed to the first entry (required entries first, then
/// optional ones, in manifest order) whose text it contains. An entry that does not allow
/// duplicates is consumed by its first line: any later line whose first match is that entry is
/// reported as unexpected, even if a later entry would also match it.
///
/// # Examples
///
/// ```
/// use bmc_validate::manifest::{Entry, Manifest};
/// use bmc_validate::sel::reconcile;
///
/// let manifest = Manifest::from_iter([
///     Entry::required("Power Off"),
///     Entry::optional("Clear SEL").with_duplicates(),
/// ]);
///
/// let result = reconcile(&["X Power Off Y", "Z Clear SEL W", "Z Clear SEL W2"], &manifest);
/// assert!(result.passed);
/// assert_eq!(result.unexpected, None);
///
/// let result = reconcile(&["X Power Off Y", "Random Unrelated Line"], &manifest);
/// assert!(!result.passed);
/// assert_eq!(result.unexpected, Some(vec!["Random Unrelated Line".to_string()]));
/// ```
pub fn reconcile<S: AsRef<str>>(observed: &[S], manifest: &Manifest) -> Reconciliation {
    let missing: Vec<String> = manifest
        .required
        .iter()
        .filter(|entry| {
            !observed
                .iter()
                .any(|line| line.as_ref().contains(entry.contains.as_str()))
        })
        .map(|entry| entry.contains.clone())
        .collect();

    if !missing.is_empty() {
        for pattern in missing.iter() {
            log::warn!("Required SEL entry not found: {pattern:?}");
        }
        return Reconciliation {
            passed: false,
            unexpected: None,
            missing,
        };
    }

    let mut candidates: Vec<(&ManifestEntry, Duplicates)> = manifest
        .entries()
        .map(|entry| (entry, Duplicates::of(entry)))
        .collect();

    let mut unexpected = Vec::new();

    for line in observed {
        let line = line.as_ref();
        let matched = match candidates
            .iter_mut()
            .find(|(entry, _)| line.contains(entry.contains.as_str()))
        {
            Some((_, Duplicates::Allowed)) => true,
            Some((_, state @ Duplicates::UnusedOnce)) => {
                *state = Duplicates::ConsumedOnce;
                true
            }
            Some((entry, Duplicates::ConsumedOnce)) => {
                log::debug!("Duplicated SEL entry {:?}: {line}", entry.contains);
                false
            }
            None => false,
        };

        if !matched {
            log::warn!("Unexpected SEL entry: {line}");
            unexpected.push(line.to_string());
        }
    }

    if unexpected.is_empty() {
        Reconciliation {
            passed: true,
            ..Reconciliation::default()
        }
    } else {
        Reconciliation {
            passed: false,
            unexpected: Some(unexpected),
            missing,
        }
    }
}

/// Splits a SEL dump into the lines to reconcile.
///
/// Blank lines and the banner printed for an empty SEL are dropped.
///
/// # Examples
///
/// ```
/// use bmc_validate::sel::observed_lines;
///
/// assert!(observed_lines("SEL has no entries\n").is_empty());
/// assert_eq!(
///     observed_lines("   1 | Pre-Init | Power Unit #0x01 | Power off/down  \n\n"),
///     vec!["   1 | Pre-Init | Power Unit #0x01 | Power off/down"]
/// );
/// ```
pub fn observed_lines(dump: &str) -> Vec<&str> {
    dump.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !line.contains(NO_ENTRIES))
        .collect()
}
