// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

#[cfg(feature = "serialize")]
use serde::Serialize;
use std::fmt;

const SEPARATOR: char = '|';

/// A SEL event as listed by the IPMI utility.
///
/// Events follow the `ID | DATE | TIME | SENSOR | EVENT | DIRECTION` layout, where the direction
/// and any trailing detail columns are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Entry {
    /// Record ID of the event in the SEL
    pub id: u16,
    pub date: String,
    pub time: String,
    /// Sensor that generated the event
    pub sensor: String,
    /// Description of the event
    pub event: String,
    /// Asserted or Deasserted
    #[cfg_attr(feature = "serialize", serde(skip_serializing_if = "Option::is_none"))]
    pub direction: Option<String>,
    /// Extra columns, such as the reading that triggered a threshold event
    #[cfg_attr(feature = "serialize", serde(skip_serializing_if = "Option::is_none"))]
    pub detail: Option<String>,
}

impl Entry {
    /// Parses a line of a SEL dump. Returns [`None`] if the line does not follow the SEL layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::sel::Entry;
    ///
    /// let entry = Entry::from_line("  1a | 10/17/2026 | 08:15:02 | Power Unit #0x01 | Power off/down | Asserted").unwrap();
    /// assert_eq!(entry.id, 0x1a);
    /// assert_eq!(entry.sensor, "Power Unit #0x01");
    /// assert_eq!(entry.direction.as_deref(), Some("Asserted"));
    /// assert!(Entry::from_line("garbage").is_none());
    /// ```
    pub fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
        if fields.len() < 5 {
            return None;
        }

        let id = u16::from_str_radix(fields[0], 16).ok()?;
        let detail = if fields.len() > 6 {
            Some(fields[6..].join(" | "))
        } else {
            None
        };

        Some(Entry {
            id,
            date: fields[1].into(),
            time: fields[2].into(),
            sensor: fields[3].into(),
            event: fields[4].into(),
            direction: fields.get(5).map(|direction| direction.to_string()),
            detail,
        })
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:>4x} | {} {} | {} | {}",
            self.id, self.date, self.time, self.sensor, self.event
        )?;
        if let Some(direction) = &self.direction {
            write!(f, " | {direction}")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " | {detail}")?;
        }
        Ok(())
    }
}
