// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Convenience re-export of common structs

pub use crate::error::Error;
pub use crate::ipmi::{Bmc, RawResponse, Transport};
#[cfg(feature = "ipmitool")]
pub use crate::ipmi::{Interface, IpmiTool};
pub use crate::manifest::{Entry, Manifest, ManifestManager, ManifestTree};
pub use crate::sdr::{AcceptableRange, SdrRecord, ThresholdKind};
pub use crate::sel::{Reconciliation, reconcile};
pub use crate::tally::{Outcome, Reporter, Summary, Tally};
