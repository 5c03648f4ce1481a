// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Validation checks for Baseboard Management Controllers.
//!
//! This library provides the decision logic of a BMC validation harness:
//! - [`sel`]: reconciles the System Event Log observed after a platform operation (AC cycle,
//!   DC cycle, BMC reset...) with the [`manifest`] of the events expected for it.
//! - [`sdr`]: decodes the full sensor records of the SDR repository into threshold values and
//!   the acceptable range of the sensor readings.
//! - [`ipmi`]: fetches the SEL, the sensor data records and the sensor readings from the BMC.
//! - [`tally`]: aggregates the outcomes of checks running concurrently.
//!
//! # Example
//!
//! ```
//! use bmc_validate::prelude::*;
//!
//! let manifest = Manifest::from_iter([Entry::required("Power off/down")]);
//! let observed = ["   2 | 10/17/2026 | 08:01:12 | Power Unit #0x01 | Power off/down | Asserted"];
//!
//! assert!(reconcile(&observed, &manifest).passed);
//! ```

pub mod error;
pub mod ipmi;
pub mod manifest;
pub mod prelude;
pub mod sdr;
pub mod sel;
pub mod tally;
pub mod utils;

pub use error::Error;
