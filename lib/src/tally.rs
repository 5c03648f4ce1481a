// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Aggregation of the check outcomes.
//!
//! The checks report their outcome through a [`Reporter`] that can be cloned and moved to other
//! threads. The outcomes are collected by a single [`Tally`] which produces the final
//! [`Summary`].

#[cfg(feature = "serialize")]
use serde::Serialize;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum Status {
    Passed,
    Failed,
    /// The check could not be evaluated
    Skipped,
}

/// Result of a single check.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Outcome {
    pub check: String,
    pub status: Status,
    pub detail: String,
}

impl Outcome {
    pub fn pass(check: &str, detail: impl fmt::Display) -> Self {
        Self::new(check, Status::Passed, detail)
    }

    pub fn fail(check: &str, detail: impl fmt::Display) -> Self {
        Self::new(check, Status::Failed, detail)
    }

    /// Creates the outcome of a check that could not be evaluated because of `reason`.
    pub fn skipped(check: &str, reason: impl fmt::Display) -> Self {
        Self::new(check, Status::Skipped, reason)
    }

    fn new(check: &str, status: Status, detail: impl fmt::Display) -> Self {
        Outcome {
            check: check.into(),
            status,
            detail: detail.to_string(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Passed
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let status = match self.status {
            Status::Passed => "PASS",
            Status::Failed => "FAIL",
            Status::Skipped => "SKIP",
        };
        write!(f, "[{status}] {}", self.check)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Sends outcomes to a [`Tally`].
#[derive(Clone, Debug)]
pub struct Reporter {
    sender: Sender<Outcome>,
}

impl Reporter {
    pub fn report(&self, outcome: Outcome) {
        log::info!("{outcome}");
        if self.sender.send(outcome).is_err() {
            log::warn!("Outcome reported after the tally was closed");
        }
    }
}

/// Collects the outcomes sent by its reporters.
///
/// # Examples
///
/// ```
/// use bmc_validate::tally::{Outcome, Tally};
///
/// let tally = Tally::new();
/// let reporter = tally.reporter();
///
/// std::thread::spawn(move || reporter.report(Outcome::pass("CPU Temp", "45")))
///     .join()
///     .unwrap();
///
/// let summary = tally.finish();
/// assert_eq!(summary.passed, 1);
/// assert!(summary.is_success());
/// ```
pub struct Tally {
    sender: Sender<Outcome>,
    receiver: Receiver<Outcome>,
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

impl Tally {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Tally { sender, receiver }
    }

    pub fn reporter(&self) -> Reporter {
        Reporter {
            sender: self.sender.clone(),
        }
    }

    /// Waits for all the reporters to be dropped and summarizes the reported outcomes.
    pub fn finish(self) -> Summary {
        let Tally { sender, receiver } = self;
        drop(sender);

        receiver.iter().fold(Summary::default(), |mut summary, outcome| {
            if outcome.is_pass() {
                summary.passed += 1;
            } else {
                summary.failed += 1;
                summary.failures.push(outcome);
            }
            summary
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Summary {
    pub passed: usize,
    /// Number of failed and skipped checks
    pub failed: usize,
    pub failures: Vec<Outcome>,
}

impl Summary {
    /// Indicates if every reported check passed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{failure}")?;
        }
        write!(f, "{} passed, {} failed", self.passed, self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn empty() {
        let summary = Tally::new().finish();
        assert_eq!(summary, Summary::default());
        assert!(summary.is_success());
    }

    #[test]
    fn skipped_counts_as_failure() {
        let tally = Tally::new();
        let reporter = tally.reporter();
        reporter.report(Outcome::pass("ac_cycle", ""));
        reporter.report(Outcome::skipped("CPU Temp", "sensor not found"));
        drop(reporter);

        let summary = tally.finish();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].status, Status::Skipped);
        assert!(!summary.is_success());
    }

    #[test]
    fn reporters_on_threads() {
        let tally = Tally::new();

        let handles: Vec<_> = (0..4)
            .map(|sensor| {
                let reporter = tally.reporter();
                thread::spawn(move || {
                    for sample in 0..10 {
                        let check = format!("sensor {sensor}");
                        if sensor == 3 && sample == 7 {
                            reporter.report(Outcome::fail(&check, "reading out of range"));
                        } else {
                            reporter.report(Outcome::pass(&check, sample));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let summary = tally.finish();
        assert_eq!(summary.passed, 39);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.failures,
            [Outcome::fail("sensor 3", "reading out of range")]
        );
    }

    #[test]
    fn display() {
        let outcome = Outcome::fail("dc_cycle", "missing \"Power off\"");
        assert_eq!(outcome.to_string(), "[FAIL] dc_cycle: missing \"Power off\"");
        assert_eq!(Outcome::pass("ac_cycle", "").to_string(), "[PASS] ac_cycle");
    }
}
