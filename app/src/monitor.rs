// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::{Connection, sensor};
use bmc_validate::prelude::*;
use std::thread;
use std::time::Duration;

fn watch<T: Transport>(
    mut bmc: Bmc<T>,
    name: &str,
    samples: usize,
    interval: Duration,
    reporter: &Reporter,
) {
    let record = match bmc.find_sensor(name) {
        Ok(record) => record,
        Err(err) => return reporter.report(Outcome::skipped(name, err)),
    };
    let range = record.acceptable_range();

    for i in 0..samples {
        if i > 0 {
            thread::sleep(interval);
        }
        reporter.report(sensor::sample(&mut bmc, &record, &range));
    }
}

/// Samples every sensor from its own thread, each with its own transport.
pub fn monitor(
    connection: &Connection,
    sensors: &[String],
    samples: usize,
    interval: Duration,
    reporter: &Reporter,
) {
    thread::scope(|scope| {
        for name in sensors {
            let bmc = connection.bmc();
            let reporter = reporter.clone();
            scope.spawn(move || watch(bmc, name, samples, interval, &reporter));
        }
    });
}
