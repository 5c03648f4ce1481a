// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::Format;
use bmc_validate::prelude::*;
use bmc_validate::sdr::{Direction, offsets};
use bmc_validate::utils::parse_hex;
use std::io::Write;

pub fn decode<O: Write>(
    hex: &str,
    name: Option<&str>,
    format: Format,
    mut output: O,
) -> Result<(), Error> {
    let data = parse_hex(hex)?;
    let sensor_id = match data.get(offsets::RECORD_ID..offsets::RECORD_ID + 2) {
        Some(&[ls, ms]) => [ls, ms],
        _ => [0, 0],
    };

    let mut record = SdrRecord::from_slice(&data, sensor_id, name.unwrap_or_default())?;
    if name.is_none() {
        record.sensor_name = record.id_string.clone().unwrap_or_default();
    }
    let range = record.acceptable_range();

    if format == Format::Json {
        let report = serde_json::json!({
            "record": record,
            "acceptable_range": range,
        });
        serde_json::to_writer_pretty(&mut output, &report)?;
        writeln!(output)?;
        return Ok(());
    }

    writeln!(
        output,
        "Sensor:     {} (number {:#04x}, record {:#06x})",
        record.sensor_name,
        record.sensor_number,
        record.record_id()
    )?;
    writeln!(
        output,
        "Conversion: M={} B={} Rexp={} Bexp={} {:?}",
        record.m, record.b, record.r_exp, record.b_exp, record.linearization
    )?;
    writeln!(output, "Thresholds:")?;
    for (kind, threshold) in record.thresholds.iter() {
        let direction = match threshold.direction {
            Direction::GoingHigh => "going high",
            Direction::GoingLow => "going low",
            Direction::Neither => "",
        };
        let value = match threshold.value {
            Some(value) => value.to_string(),
            None if !threshold.readable => "not readable".into(),
            None => "excluded".into(),
        };
        writeln!(
            output,
            "  {:<4} raw={:#04x} {:<14} {}",
            kind.abbreviation(),
            threshold.raw,
            value,
            direction
        )?;
    }

    if !range.is_complete() {
        log::warn!("{}: no upper threshold", record.sensor_name);
    }
    writeln!(output, "Acceptable range: {range}")?;
    Ok(())
}
