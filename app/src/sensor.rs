// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use bmc_validate::prelude::*;

/// Reads `record` once and checks the reading against `range`.
pub fn sample<T: Transport>(
    bmc: &mut Bmc<T>,
    record: &SdrRecord,
    range: &AcceptableRange,
) -> Outcome {
    let name = record.sensor_name.as_str();
    match bmc.read_sensor(record) {
        Ok(reading) if range.contains(reading) => {
            Outcome::pass(name, format!("{reading} within {range}"))
        }
        Ok(reading) => Outcome::fail(name, format!("{reading} outside of {range}")),
        Err(err @ Error::UnsupportedLinearization(_)) => Outcome::fail(name, err),
        Err(err) => Outcome::skipped(name, err),
    }
}

pub fn check<T: Transport>(bmc: &mut Bmc<T>, name: &str) -> Outcome {
    let record = match bmc.find_sensor(name) {
        Ok(record) => record,
        Err(err) => return Outcome::skipped(name, err),
    };

    let range = record.acceptable_range();
    if !range.is_complete() {
        log::warn!("{name}: no upper threshold, only checking the lower bound");
    }
    sample(bmc, &record, &range)
}
