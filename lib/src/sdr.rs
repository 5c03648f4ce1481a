// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Decoding of the IPMI full sensor records.
//!
//! A full sensor record describes how the raw readings of an analog sensor are converted into
//! engineering units and which thresholds trigger events. [`SdrRecord`] reconstructs these
//! parameters from the response of a Get SDR command and derives the [`AcceptableRange`] of the
//! sensor readings.

mod threshold;
#[cfg(test)]
mod tests;

use crate::Error;
use crate::utils::{from_twos_complement, parse_hex};
#[cfg(feature = "serialize")]
use serde::Serialize;
use std::fmt;

pub use threshold::{Direction, Threshold, ThresholdKind, Thresholds};

/// Offsets of the fields in the Get SDR response data.
///
/// The response starts with the ID of the next record in the repository followed by the full
/// sensor record itself.
pub mod offsets {
    pub const NEXT_RECORD_ID: usize = 0;
    pub const RECORD_ID: usize = 2;
    pub const RECORD_TYPE: usize = 5;
    pub const RECORD_LENGTH: usize = 6;
    pub const SENSOR_NUMBER: usize = 9;
    pub const SENSOR_INITIALIZATION: usize = 12;
    pub const ASSERTION_MASK: usize = 16;
    pub const READABLE_MASK: usize = 20;
    pub const SENSOR_UNITS: usize = 22;
    pub const LINEARIZATION: usize = 25;
    pub const M: usize = 26;
    pub const B: usize = 28;
    pub const EXPONENTS: usize = 31;
    pub const THRESHOLDS: usize = 38;
    pub const ID_STRING_TYPE_LENGTH: usize = 49;
    pub const ID_STRING: usize = 50;
}

/// Record type of the full sensor records.
pub const FULL_SENSOR_RECORD: u8 = 0x01;

const MIN_RECORD_SIZE: usize = offsets::THRESHOLDS + ThresholdKind::ALL.len();
const THRESHOLDS_READABLE: u8 = 1 << 4;

/// Function applied to the reading once converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum Linearization {
    #[default]
    Linear,
    Ln,
    Log10,
    Log2,
    Unsupported(u8),
}

impl From<u8> for Linearization {
    fn from(value: u8) -> Self {
        match value {
            0 => Linearization::Linear,
            1 => Linearization::Ln,
            2 => Linearization::Log10,
            3 => Linearization::Log2,
            _ => Linearization::Unsupported(value),
        }
    }
}

/// Encoding of the raw readings and thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum AnalogFormat {
    #[default]
    Unsigned,
    OnesComplement,
    TwosComplement,
    NoAnalogReading,
}

impl AnalogFormat {
    fn from_units(units: u8) -> Self {
        match units >> 6 {
            0 => AnalogFormat::Unsigned,
            1 => AnalogFormat::OnesComplement,
            2 => AnalogFormat::TwosComplement,
            _ => AnalogFormat::NoAnalogReading,
        }
    }

    /// Returns the signed value of a raw byte.
    pub fn value(self, raw: u8) -> i32 {
        match self {
            AnalogFormat::OnesComplement if raw & 0x80 != 0 => -((!raw) as i32),
            AnalogFormat::TwosComplement => from_twos_complement(raw as u32, 8),
            _ => raw as i32,
        }
    }
}

/// The range a live reading must fall within: `low <= reading < high`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct AcceptableRange {
    /// Highest going-low threshold, 0 if there is none
    pub low: f64,
    /// Lowest going-high threshold, [`None`] if there is none
    pub high: Option<f64>,
}

impl Default for AcceptableRange {
    fn default() -> Self {
        AcceptableRange {
            low: 0.0,
            high: None,
        }
    }
}

impl AcceptableRange {
    /// Indicates if an upper bound has been found.
    pub fn is_complete(&self) -> bool {
        self.high.is_some()
    }

    /// Checks if a `reading` lies within the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::sdr::AcceptableRange;
    ///
    /// let range = AcceptableRange { low: 35.0, high: Some(80.0) };
    /// assert!(range.contains(35.0));
    /// assert!(range.contains(79.9));
    /// assert!(!range.contains(80.0));
    /// assert!(!range.contains(20.0));
    /// ```
    pub fn contains(&self, reading: f64) -> bool {
        reading >= self.low && self.high.is_none_or(|high| reading < high)
    }
}

impl fmt::Display for AcceptableRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.high {
            Some(high) => write!(f, "[{}, {})", self.low, high),
            None => write!(f, "[{}, +inf)", self.low),
        }
    }
}

/// Decoded full sensor record of one sensor.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct SdrRecord {
    /// Record ID of the sensor in the SDR repository (LS byte first)
    pub sensor_id: [u8; 2],
    pub sensor_name: String,
    /// Sensor number used to query the sensor reading
    pub sensor_number: u8,
    /// ID of the following record in the SDR repository
    pub next_record_id: u16,
    /// Name of the sensor stored in the record
    pub id_string: Option<String>,
    pub analog_format: AnalogFormat,
    pub linearization: Linearization,
    /// Multiplier (signed 10-bit)
    pub m: i16,
    /// Offset (signed 10-bit)
    pub b: i16,
    /// Result exponent (signed 4-bit)
    pub r_exp: i8,
    /// Offset exponent (signed 4-bit)
    pub b_exp: i8,
    /// Thresholds can be read at all
    pub thresholds_readable: bool,
    pub thresholds: Thresholds,
}

impl SdrRecord {
    /// Decodes the data of a Get SDR response.
    ///
    /// The threshold values are only converted when the sensor initialization byte marks the
    /// thresholds as readable and the threshold mask has the bit of the threshold set. The other
    /// thresholds keep a [`None`] value.
    pub fn from_slice(data: &[u8], sensor_id: [u8; 2], sensor_name: &str) -> Result<Self, Error> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(Error::TruncatedRecord(data.len()));
        }

        let record_type = data[offsets::RECORD_TYPE];
        if record_type != FULL_SENSOR_RECORD {
            return Err(Error::InvalidRecordType(record_type));
        }

        let exponents = data[offsets::EXPONENTS] as u32;

        let mut record = SdrRecord {
            sensor_id,
            sensor_name: sensor_name.into(),
            sensor_number: data[offsets::SENSOR_NUMBER],
            next_record_id: u16::from_le_bytes([
                data[offsets::NEXT_RECORD_ID],
                data[offsets::NEXT_RECORD_ID + 1],
            ]),
            id_string: id_string(data),
            analog_format: AnalogFormat::from_units(data[offsets::SENSOR_UNITS]),
            linearization: Linearization::from(data[offsets::LINEARIZATION]),
            m: coefficient(data[offsets::M], data[offsets::M + 1]),
            b: coefficient(data[offsets::B], data[offsets::B + 1]),
            r_exp: from_twos_complement(exponents >> 4, 4) as i8,
            b_exp: from_twos_complement(exponents & 0xF, 4) as i8,
            thresholds_readable: data[offsets::SENSOR_INITIALIZATION] & THRESHOLDS_READABLE != 0,
            thresholds: Thresholds::default(),
        };

        log::debug!(
            "{sensor_name}: M={}, B={}, Rexp={}, Bexp={}, {:?}",
            record.m,
            record.b,
            record.r_exp,
            record.b_exp,
            record.linearization
        );

        let readable_mask = data[offsets::READABLE_MASK];
        let assertion_mask = u16::from_le_bytes([
            data[offsets::ASSERTION_MASK],
            data[offsets::ASSERTION_MASK + 1],
        ]);

        for kind in ThresholdKind::ALL {
            let raw = data[offsets::THRESHOLDS + kind.position()];
            let settable = (readable_mask >> kind.mask_bit()) & 1 == 1;
            let readable = record.thresholds_readable;

            let value = if readable && settable {
                record
                    .convert(raw)
                    .inspect_err(|err| log::warn!("{sensor_name}: cannot convert {kind}: {err}"))
                    .ok()
            } else {
                None
            };

            log::trace!("{sensor_name}: {kind} raw={raw:#04x} value={value:?}");

            *record.thresholds.get_mut(kind) = Threshold {
                raw,
                value,
                settable,
                readable,
                direction: Direction::from_assertion_mask(assertion_mask, kind),
            };
        }

        Ok(record)
    }

    /// Decodes a Get SDR response printed as hex bytes.
    pub fn from_hex(s: &str, sensor_id: [u8; 2], sensor_name: &str) -> Result<Self, Error> {
        Self::from_slice(&parse_hex(s)?, sensor_id, sensor_name)
    }

    /// Returns the record ID of the sensor.
    pub fn record_id(&self) -> u16 {
        u16::from_le_bytes(self.sensor_id)
    }

    /// Converts a raw reading into engineering units.
    ///
    /// The reading is computed as `(M * raw + B * 10^Bexp) * 10^Rexp` before the linearization
    /// function is applied to the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::sdr::SdrRecord;
    ///
    /// let record = SdrRecord { m: 10, ..SdrRecord::default() };
    /// assert_eq!(record.convert(0x05).unwrap(), 50.0);
    /// ```
    pub fn convert(&self, raw: u8) -> Result<f64, Error> {
        let raw = self.analog_format.value(raw) as f64;
        let value = (self.m as f64 * raw + self.b as f64 * 10f64.powi(self.b_exp as i32))
            * 10f64.powi(self.r_exp as i32);

        match self.linearization {
            Linearization::Linear => Ok(value),
            Linearization::Ln => Ok(value.ln()),
            Linearization::Log10 => Ok(value.log10()),
            Linearization::Log2 => Ok(value.log2()),
            Linearization::Unsupported(code) => Err(Error::UnsupportedLinearization(code)),
        }
    }

    /// Returns the range the readings of the sensor must fall within.
    ///
    /// The upper bound is the lowest threshold asserted when going high and the lower bound is
    /// the highest threshold asserted when going low. Only the thresholds with a value are
    /// considered.
    pub fn acceptable_range(&self) -> AcceptableRange {
        let mut range = AcceptableRange::default();
        let mut low: Option<f64> = None;

        for (_, threshold) in self.thresholds.iter() {
            let Some(value) = threshold.value else {
                continue;
            };
            match threshold.direction {
                Direction::GoingHigh => {
                    range.high = Some(range.high.map_or(value, |high| high.min(value)))
                }
                Direction::GoingLow => low = Some(low.map_or(value, |low| low.max(value))),
                Direction::Neither => (),
            }
        }

        if let Some(low) = low {
            range.low = low;
        }
        range
    }
}

/// Decodes a 10-bit two's complement coefficient: 8 LS bits in `ls`, 2 MS bits in the top of `ms`.
fn coefficient(ls: u8, ms: u8) -> i16 {
    let raw = ls as u32 | ((ms as u32 >> 6) << 8);
    from_twos_complement(raw, 10) as i16
}

pub(crate) fn id_string(data: &[u8]) -> Option<String> {
    let length = (*data.get(offsets::ID_STRING_TYPE_LENGTH)? & 0x1F) as usize;
    if length == 0 {
        return None;
    }
    let end = (offsets::ID_STRING + length).min(data.len());
    let bytes = data.get(offsets::ID_STRING..end)?;
    let name = String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .trim()
        .to_string();
    Some(name).filter(|name| !name.is_empty())
}
