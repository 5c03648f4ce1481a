// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

#[cfg(feature = "serialize")]
use serde::Serialize;
use std::fmt;

/// Identifies one of the six thresholds of an analog sensor.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum ThresholdKind {
    UpperNonRecoverable,
    UpperCritical,
    UpperNonCritical,
    LowerNonRecoverable,
    LowerCritical,
    LowerNonCritical,
}

impl ThresholdKind {
    /// All the thresholds, in the order of their raw values in the sensor record.
    pub const ALL: [ThresholdKind; 6] = [
        ThresholdKind::UpperNonRecoverable,
        ThresholdKind::UpperCritical,
        ThresholdKind::UpperNonCritical,
        ThresholdKind::LowerNonRecoverable,
        ThresholdKind::LowerCritical,
        ThresholdKind::LowerNonCritical,
    ];

    /// Position of the raw threshold value among the six threshold bytes.
    pub fn position(self) -> usize {
        match self {
            ThresholdKind::UpperNonRecoverable => 0,
            ThresholdKind::UpperCritical => 1,
            ThresholdKind::UpperNonCritical => 2,
            ThresholdKind::LowerNonRecoverable => 3,
            ThresholdKind::LowerCritical => 4,
            ThresholdKind::LowerNonCritical => 5,
        }
    }

    /// Bit of the threshold in the readable threshold mask.
    ///
    /// The assertion event mask uses two bits per threshold: the going-low bit is at twice this
    /// index and the going-high bit right after it.
    pub fn mask_bit(self) -> u32 {
        match self {
            ThresholdKind::LowerNonCritical => 0,
            ThresholdKind::LowerCritical => 1,
            ThresholdKind::LowerNonRecoverable => 2,
            ThresholdKind::UpperNonCritical => 3,
            ThresholdKind::UpperCritical => 4,
            ThresholdKind::UpperNonRecoverable => 5,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            ThresholdKind::UpperNonRecoverable => "UNR",
            ThresholdKind::UpperCritical => "UC",
            ThresholdKind::UpperNonCritical => "UNC",
            ThresholdKind::LowerNonRecoverable => "LNR",
            ThresholdKind::LowerCritical => "LC",
            ThresholdKind::LowerNonCritical => "LNC",
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ThresholdKind::UpperNonRecoverable => "Upper Non-Recoverable",
            ThresholdKind::UpperCritical => "Upper Critical",
            ThresholdKind::UpperNonCritical => "Upper Non-Critical",
            ThresholdKind::LowerNonRecoverable => "Lower Non-Recoverable",
            ThresholdKind::LowerCritical => "Lower Critical",
            ThresholdKind::LowerNonCritical => "Lower Non-Critical",
        };
        write!(f, "{name}")
    }
}

/// Crossing direction that triggers the assertion of a threshold event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum Direction {
    GoingHigh,
    GoingLow,
    #[default]
    Neither,
}

impl Direction {
    /// Reads the direction of the `kind` threshold from the assertion event mask.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::sdr::{Direction, ThresholdKind};
    ///
    /// // Upper Critical going high (bit 9) and Lower Critical going low (bit 2)
    /// let mask = (1 << 9) | (1 << 2);
    /// assert_eq!(Direction::from_assertion_mask(mask, ThresholdKind::UpperCritical), Direction::GoingHigh);
    /// assert_eq!(Direction::from_assertion_mask(mask, ThresholdKind::LowerCritical), Direction::GoingLow);
    /// assert_eq!(Direction::from_assertion_mask(mask, ThresholdKind::UpperNonCritical), Direction::Neither);
    /// ```
    pub fn from_assertion_mask(mask: u16, kind: ThresholdKind) -> Self {
        let going_low = 2 * kind.mask_bit();
        let going_high = going_low + 1;

        if (mask >> going_high) & 1 == 1 {
            Direction::GoingHigh
        } else if (mask >> going_low) & 1 == 1 {
            Direction::GoingLow
        } else {
            Direction::Neither
        }
    }
}

/// A single sensor threshold.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Threshold {
    /// Raw value stored in the sensor record
    pub raw: u8,
    /// Value in engineering units. Only available when the threshold is readable and settable.
    pub value: Option<f64>,
    pub settable: bool,
    pub readable: bool,
    pub direction: Direction,
}

/// The six thresholds of an analog sensor.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Thresholds {
    pub upper_non_recoverable: Threshold,
    pub upper_critical: Threshold,
    pub upper_non_critical: Threshold,
    pub lower_non_recoverable: Threshold,
    pub lower_critical: Threshold,
    pub lower_non_critical: Threshold,
}

impl Thresholds {
    pub fn get(&self, kind: ThresholdKind) -> &Threshold {
        match kind {
            ThresholdKind::UpperNonRecoverable => &self.upper_non_recoverable,
            ThresholdKind::UpperCritical => &self.upper_critical,
            ThresholdKind::UpperNonCritical => &self.upper_non_critical,
            ThresholdKind::LowerNonRecoverable => &self.lower_non_recoverable,
            ThresholdKind::LowerCritical => &self.lower_critical,
            ThresholdKind::LowerNonCritical => &self.lower_non_critical,
        }
    }

    pub fn get_mut(&mut self, kind: ThresholdKind) -> &mut Threshold {
        match kind {
            ThresholdKind::UpperNonRecoverable => &mut self.upper_non_recoverable,
            ThresholdKind::UpperCritical => &mut self.upper_critical,
            ThresholdKind::UpperNonCritical => &mut self.upper_non_critical,
            ThresholdKind::LowerNonRecoverable => &mut self.lower_non_recoverable,
            ThresholdKind::LowerCritical => &mut self.lower_critical,
            ThresholdKind::LowerNonCritical => &mut self.lower_non_critical,
        }
    }

    /// Returns an iterator over the thresholds, upper thresholds first.
    pub fn iter(&self) -> impl Iterator<Item = (ThresholdKind, &Threshold)> {
        ThresholdKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }
}
