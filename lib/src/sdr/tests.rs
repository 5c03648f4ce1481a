// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::*;
use crate::utils::to_twos_complement;

/// Builds a Get SDR response of a linear sensor with every threshold readable.
fn full_sensor_record() -> Vec<u8> {
    let mut data = vec![0u8; 64];
    data[offsets::NEXT_RECORD_ID] = 0x02;
    data[offsets::RECORD_ID] = 0x01;
    data[offsets::RECORD_TYPE] = FULL_SENSOR_RECORD;
    data[offsets::SENSOR_NUMBER] = 0x30;
    data[offsets::SENSOR_INITIALIZATION] = 0x7F;
    data[offsets::READABLE_MASK] = 0x3F;
    data[offsets::M] = 1;
    data
}

fn set_thresholds(data: &mut [u8], raw: [u8; 6]) {
    data[offsets::THRESHOLDS..offsets::THRESHOLDS + 6].copy_from_slice(&raw);
}

fn set_assertion_mask(data: &mut [u8], mask: u16) {
    let [ls, ms] = mask.to_le_bytes();
    data[offsets::ASSERTION_MASK] = ls;
    data[offsets::ASSERTION_MASK + 1] = ms;
}

#[test]
fn linear_conversion() {
    let mut data = full_sensor_record();
    data[offsets::M] = 10;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    assert_eq!(record.m, 10);
    assert_eq!(record.b, 0);
    assert_eq!(record.r_exp, 0);
    assert_eq!(record.b_exp, 0);
    assert_eq!(record.linearization, Linearization::Linear);
    assert_eq!(record.convert(0x05).unwrap(), 50.0);
}

#[test]
fn negative_coefficients() {
    let mut data = full_sensor_record();
    let m = to_twos_complement(-5, 10);
    data[offsets::M] = (m & 0xFF) as u8;
    data[offsets::M + 1] = ((m >> 8) << 6) as u8 | 0x15;
    let b = to_twos_complement(-300, 10);
    data[offsets::B] = (b & 0xFF) as u8;
    data[offsets::B + 1] = ((b >> 8) << 6) as u8;
    // Rexp = -1, Bexp = 2
    data[offsets::EXPONENTS] = ((to_twos_complement(-1, 4) << 4) | 2) as u8;

    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Volt").unwrap();
    assert_eq!(record.m, -5);
    assert_eq!(record.b, -300);
    assert_eq!(record.r_exp, -1);
    assert_eq!(record.b_exp, 2);

    // (-5 * 10 + -300 * 100) / 10
    let value = record.convert(10).unwrap();
    assert!((value - -3005.0).abs() < 1e-9);
}

#[test]
fn logarithmic_conversion() {
    let mut data = full_sensor_record();
    data[offsets::LINEARIZATION] = 2;
    data[offsets::M] = 10;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Log").unwrap();

    assert_eq!(record.linearization, Linearization::Log10);
    assert!((record.convert(10).unwrap() - 2.0).abs() < 1e-9);

    let record = SdrRecord {
        linearization: Linearization::Log2,
        m: 1,
        ..SdrRecord::default()
    };
    assert!((record.convert(8).unwrap() - 3.0).abs() < 1e-9);

    let record = SdrRecord {
        linearization: Linearization::Ln,
        m: 1,
        ..SdrRecord::default()
    };
    assert!((record.convert(1).unwrap()).abs() < 1e-9);
}

#[test]
fn unsupported_linearization() {
    let mut data = full_sensor_record();
    data[offsets::LINEARIZATION] = 0x07;
    set_thresholds(&mut data, [100, 90, 80, 5, 10, 15]);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Fan").unwrap();

    assert_eq!(record.linearization, Linearization::Unsupported(0x07));
    assert!(matches!(
        record.convert(1),
        Err(Error::UnsupportedLinearization(0x07))
    ));
    for (_, threshold) in record.thresholds.iter() {
        assert_eq!(threshold.value, None);
    }
}

#[test]
fn threshold_gating() {
    let mut data = full_sensor_record();
    set_thresholds(&mut data, [0xFF; 6]);
    // Only Upper Critical and Lower Critical can be read
    data[offsets::READABLE_MASK] = (1 << 4) | (1 << 1);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    for (kind, threshold) in record.thresholds.iter() {
        match kind {
            ThresholdKind::UpperCritical | ThresholdKind::LowerCritical => {
                assert!(threshold.settable);
                assert_eq!(threshold.value, Some(255.0));
            }
            _ => {
                assert!(!threshold.settable);
                assert_eq!(threshold.value, None);
            }
        }
        assert_eq!(threshold.raw, 0xFF);
    }
}

#[test]
fn thresholds_not_readable() {
    let mut data = full_sensor_record();
    set_thresholds(&mut data, [1, 2, 3, 4, 5, 6]);
    data[offsets::SENSOR_INITIALIZATION] = 0x6F;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    assert!(!record.thresholds_readable);
    for (_, threshold) in record.thresholds.iter() {
        assert!(!threshold.readable);
        assert_eq!(threshold.value, None);
    }
    assert_eq!(record.acceptable_range(), AcceptableRange::default());
}

#[test]
fn threshold_order() {
    let mut data = full_sensor_record();
    set_thresholds(&mut data, [1, 2, 3, 4, 5, 6]);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    assert_eq!(record.thresholds.upper_non_recoverable.raw, 1);
    assert_eq!(record.thresholds.upper_critical.raw, 2);
    assert_eq!(record.thresholds.upper_non_critical.raw, 3);
    assert_eq!(record.thresholds.lower_non_recoverable.raw, 4);
    assert_eq!(record.thresholds.lower_critical.raw, 5);
    assert_eq!(record.thresholds.lower_non_critical.raw, 6);
}

#[test]
fn assertion_directions() {
    let mut data = full_sensor_record();
    // UNR, UC, UNC going high; LNR, LC going low; LNC both (going high wins)
    set_assertion_mask(&mut data, 0x0A80 | 0x0200 | 0x0014 | 0x0003);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    assert_eq!(record.thresholds.upper_non_recoverable.direction, Direction::GoingHigh);
    assert_eq!(record.thresholds.upper_critical.direction, Direction::GoingHigh);
    assert_eq!(record.thresholds.upper_non_critical.direction, Direction::GoingHigh);
    assert_eq!(record.thresholds.lower_non_recoverable.direction, Direction::GoingLow);
    assert_eq!(record.thresholds.lower_critical.direction, Direction::GoingLow);
    assert_eq!(record.thresholds.lower_non_critical.direction, Direction::GoingHigh);

    set_assertion_mask(&mut data, 0);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();
    for (_, threshold) in record.thresholds.iter() {
        assert_eq!(threshold.direction, Direction::Neither);
    }
}

#[test]
fn acceptable_range_bounds() {
    let mut data = full_sensor_record();
    // UNR=100, UC=80, UNC=120 going high; LNR=20, LC=35 going low; LNC not asserted
    set_thresholds(&mut data, [100, 80, 120, 20, 35, 50]);
    set_assertion_mask(&mut data, (1 << 11) | (1 << 9) | (1 << 7) | (1 << 4) | (1 << 2));
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    let range = record.acceptable_range();
    assert_eq!(range.high, Some(80.0));
    assert_eq!(range.low, 35.0);
    assert!(range.is_complete());
    assert!(range.contains(50.0));
    assert!(!range.contains(80.0));
    assert_eq!(range.to_string(), "[35, 80)");
}

#[test]
fn acceptable_range_without_upper_bound() {
    let mut data = full_sensor_record();
    set_thresholds(&mut data, [0, 0, 0, 20, 35, 50]);
    set_assertion_mask(&mut data, (1 << 4) | (1 << 2));
    data[offsets::READABLE_MASK] = 0x07;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Fan").unwrap();

    let range = record.acceptable_range();
    assert_eq!(range.low, 35.0);
    assert_eq!(range.high, None);
    assert!(!range.is_complete());
    assert!(range.contains(1e9));
    assert_eq!(range.to_string(), "[35, +inf)");
}

#[test]
fn acceptable_range_ignores_gated_thresholds() {
    let mut data = full_sensor_record();
    set_thresholds(&mut data, [100, 10, 120, 0, 0, 0]);
    set_assertion_mask(&mut data, (1 << 11) | (1 << 9) | (1 << 7));
    // Upper Critical is not readable: its low raw value must not bound the range
    data[offsets::READABLE_MASK] = 0x3F & !(1 << 4);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

    let range = record.acceptable_range();
    assert_eq!(range.high, Some(100.0));
    assert_eq!(range.low, 0.0);
}

#[test]
fn signed_readings() {
    let mut data = full_sensor_record();
    // Sensor Units 1, after the settable threshold mask
    data[22] = 0x80;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Delta").unwrap();
    assert_eq!(record.analog_format, AnalogFormat::TwosComplement);
    assert_eq!(record.convert(0xFB).unwrap(), -5.0);

    data[22] = 0x40;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Delta").unwrap();
    assert_eq!(record.analog_format, AnalogFormat::OnesComplement);
    assert_eq!(record.convert(0xFB).unwrap(), -4.0);

    data[22] = 0x00;
    data[21] = 0xC0;
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Delta").unwrap();
    assert_eq!(record.analog_format, AnalogFormat::Unsigned);
    assert_eq!(record.convert(0xFB).unwrap(), 251.0);
}

#[test]
fn linearization_high_bit_is_unsupported() {
    let mut data = full_sensor_record();
    for code in [0x80, 0x81, 0x83] {
        data[offsets::LINEARIZATION] = code;
        let record = SdrRecord::from_slice(&data, [0x01, 0x00], "Temp").unwrap();

        assert_eq!(record.linearization, Linearization::Unsupported(code));
        assert!(matches!(
            record.convert(10),
            Err(Error::UnsupportedLinearization(c)) if c == code
        ));
    }
}

#[test]
fn id_string_and_identifiers() {
    let mut data = full_sensor_record();
    let name = b"CPU Temp";
    // OEM byte, then the ID string type/length and the string
    data[48] = 0x5A;
    data[49] = 0xC0 | name.len() as u8;
    data[50..50 + name.len()].copy_from_slice(name);
    let record = SdrRecord::from_slice(&data, [0x01, 0x00], "CPU Temp").unwrap();

    assert_eq!(record.id_string.as_deref(), Some("CPU Temp"));
    assert_eq!(record.sensor_number, 0x30);
    assert_eq!(record.next_record_id, 0x0002);
    assert_eq!(record.record_id(), 0x0001);
    assert_eq!(id_string(&data).as_deref(), Some("CPU Temp"));
}

#[test]
fn truncated_record() {
    let data = full_sensor_record();
    assert!(matches!(
        SdrRecord::from_slice(&data[..43], [0x01, 0x00], "Temp"),
        Err(Error::TruncatedRecord(43))
    ));
    assert!(SdrRecord::from_slice(&data[..44], [0x01, 0x00], "Temp").is_ok());
}

#[test]
fn compact_record_is_rejected() {
    let mut data = full_sensor_record();
    data[offsets::RECORD_TYPE] = 0x02;
    assert!(matches!(
        SdrRecord::from_slice(&data, [0x01, 0x00], "Temp"),
        Err(Error::InvalidRecordType(0x02))
    ));
}

#[test]
fn sample_response() {
    let hex = std::fs::read_to_string("tests/samples/cpu_temp.sdr").unwrap();
    let record = SdrRecord::from_hex(&hex, [0x01, 0x00], "CPU Temp").unwrap();

    assert_eq!(record.id_string.as_deref(), Some("CPU Temp"));
    assert_eq!(record.thresholds.upper_critical.value, Some(95.0));
    assert_eq!(record.thresholds.upper_non_critical.value, Some(85.0));
    assert_eq!(record.thresholds.upper_non_recoverable.value, Some(100.0));
    assert_eq!(record.thresholds.lower_critical.value, Some(5.0));

    let range = record.acceptable_range();
    assert_eq!(range.high, Some(85.0));
    assert_eq!(range.low, 10.0);
}
