// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Access to the BMC through IPMI commands.
//!
//! The IPMI protocol itself is handled by an external utility: this module only defines the
//! [`Transport`] used to issue raw commands and the few requests needed to fetch the sensor data
//! records, sensor readings and the System Event Log.

#[cfg(feature = "ipmitool")]
mod ipmitool;

use crate::Error;
use crate::sdr::{self, SdrRecord};

#[cfg(feature = "ipmitool")]
pub use ipmitool::{Interface, IpmiTool};

/// Network functions and commands used by the library.
pub mod commands {
    pub const NETFN_SENSOR: u8 = 0x04;
    pub const NETFN_STORAGE: u8 = 0x0A;

    pub const GET_SENSOR_READING: u8 = 0x2D;
    pub const RESERVE_SDR_REPOSITORY: u8 = 0x22;
    pub const GET_SDR: u8 = 0x23;
    pub const RESERVE_SEL: u8 = 0x42;
    pub const CLEAR_SEL: u8 = 0x47;
}

/// Completion codes handled by the library.
pub mod completion_codes {
    pub const SUCCESS: u8 = 0x00;
    pub const RESERVATION_CANCELLED: u8 = 0xC5;
}

/// ID of the first record of the SDR repository.
pub const FIRST_RECORD_ID: u16 = 0x0000;
/// Next record ID returned with the last record of the SDR repository.
pub const LAST_RECORD_ID: u16 = 0xFFFF;

const SDR_HEADER_SIZE: usize = 5;
const SDR_CHUNK_SIZE: usize = 16;
const MAX_RESERVATION_ATTEMPTS: usize = 3;
const READING_UNAVAILABLE: u8 = 1 << 5;
const INITIATE_ERASE: u8 = 0xAA;

/// Response to a raw IPMI command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub completion_code: u8,
    pub data: Vec<u8>,
}

impl RawResponse {
    /// Returns the response data if the command completed successfully.
    pub fn into_data(self) -> Result<Vec<u8>, Error> {
        if self.completion_code != completion_codes::SUCCESS {
            return Err(Error::CompletionCode(self.completion_code));
        }
        Ok(self.data)
    }
}

/// A channel to the BMC.
pub trait Transport {
    /// Sends a raw IPMI request and returns the response.
    fn raw(&mut self, netfn: u8, cmd: u8, data: &[u8]) -> Result<RawResponse, Error>;
    /// Returns the text dump of the System Event Log, one event per line.
    fn sel_list(&mut self) -> Result<String, Error>;
}

/// Issues the requests of the validation checks to a BMC.
pub struct Bmc<T: Transport> {
    transport: T,
}

impl<T: Transport> Bmc<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn request(&mut self, netfn: u8, cmd: u8, data: &[u8]) -> Result<Vec<u8>, Error> {
        log::trace!("Request netfn={netfn:#04x} cmd={cmd:#04x} data={data:02x?}");
        let response = self.transport.raw(netfn, cmd, data)?;
        log::trace!(
            "Response cc={:#04x} data={:02x?}",
            response.completion_code,
            response.data
        );
        response.into_data()
    }

    fn reservation(data: &[u8]) -> Result<u16, Error> {
        match data.get(0..2) {
            Some(&[ls, ms]) => Ok(u16::from_le_bytes([ls, ms])),
            _ => Err(Error::TransportError(format!(
                "invalid reservation ID: {data:02x?}"
            ))),
        }
    }

    /// Reserves the SDR repository and returns the reservation ID.
    pub fn reserve_sdr_repository(&mut self) -> Result<u16, Error> {
        let data = self.request(
            commands::NETFN_STORAGE,
            commands::RESERVE_SDR_REPOSITORY,
            &[],
        )?;
        Self::reservation(&data)
    }

    fn get_sdr(
        &mut self,
        reservation: u16,
        record_id: u16,
        offset: usize,
        count: usize,
    ) -> Result<Vec<u8>, Error> {
        let [res_ls, res_ms] = reservation.to_le_bytes();
        let [rec_ls, rec_ms] = record_id.to_le_bytes();
        let data = self.request(
            commands::NETFN_STORAGE,
            commands::GET_SDR,
            &[res_ls, res_ms, rec_ls, rec_ms, offset as u8, count as u8],
        )?;

        if data.len() <= 2 {
            return Err(Error::TruncatedRecord(data.len()));
        }
        Ok(data)
    }

    /// Reads the record `record_id` of the SDR repository.
    ///
    /// The record is read in small chunks as not all the BMCs can return a full record at once.
    /// The returned data starts with the ID of the next record, like a single Get SDR response
    /// would, so that it can be decoded with [`SdrRecord::from_slice`].
    pub fn read_sdr(&mut self, reservation: u16, record_id: u16) -> Result<Vec<u8>, Error> {
        let header = self.get_sdr(reservation, record_id, 0, SDR_HEADER_SIZE)?;
        let mut data = header[..2].to_vec();
        let mut record = header[2..].to_vec();

        if record.len() < SDR_HEADER_SIZE {
            return Err(Error::TruncatedRecord(header.len()));
        }

        let size = SDR_HEADER_SIZE + record[SDR_HEADER_SIZE - 1] as usize;
        log::debug!("SDR record {record_id:#06x}: {size} bytes");

        while record.len() < size {
            let offset = record.len();
            let count = (size - offset).min(SDR_CHUNK_SIZE);
            let chunk = self.get_sdr(reservation, record_id, offset, count)?;
            record.extend_from_slice(&chunk[2..]);
        }

        record.truncate(size);
        data.append(&mut record);
        Ok(data)
    }

    /// Reads a record of the SDR repository, reserving the repository beforehand.
    ///
    /// The reservation is renewed when the BMC cancels it while the record is being read.
    pub fn fetch_sdr(&mut self, record_id: u16) -> Result<Vec<u8>, Error> {
        let mut attempt = 0;
        loop {
            let reservation = self.reserve_sdr_repository()?;
            match self.read_sdr(reservation, record_id) {
                Err(Error::CompletionCode(completion_codes::RESERVATION_CANCELLED))
                    if attempt + 1 < MAX_RESERVATION_ATTEMPTS =>
                {
                    log::info!("SDR reservation cancelled, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Reads the record `record_id` and decodes it if it is a full sensor record.
    ///
    /// Returns the decoded record, if any, and the ID of the next record.
    fn next_full_record(&mut self, record_id: u16) -> Result<(Option<SdrRecord>, u16), Error> {
        let data = self.fetch_sdr(record_id)?;
        let next = u16::from_le_bytes([data[0], data[1]]);

        if data.get(sdr::offsets::RECORD_TYPE) != Some(&sdr::FULL_SENSOR_RECORD) {
            return Ok((None, next));
        }

        let sensor_id = [
            data[sdr::offsets::RECORD_ID],
            data[sdr::offsets::RECORD_ID + 1],
        ];
        let name = sdr::id_string(&data).unwrap_or_default();

        match SdrRecord::from_slice(&data, sensor_id, &name) {
            Ok(record) => Ok((Some(record), next)),
            Err(err) => {
                log::warn!("Cannot decode SDR record {record_id:#06x}: {err}");
                Ok((None, next))
            }
        }
    }

    fn walk(&mut self, mut visit: impl FnMut(SdrRecord) -> bool) -> Result<(), Error> {
        let mut record_id = FIRST_RECORD_ID;

        for _ in 0..=u16::MAX {
            let (record, next) = self.next_full_record(record_id)?;
            if let Some(record) = record {
                if !visit(record) {
                    return Ok(());
                }
            }
            if next == LAST_RECORD_ID || next == record_id {
                break;
            }
            record_id = next;
        }

        Ok(())
    }

    /// Returns all the full sensor records of the SDR repository.
    pub fn sensors(&mut self) -> Result<Vec<SdrRecord>, Error> {
        let mut records = Vec::new();
        self.walk(|record| {
            records.push(record);
            true
        })?;
        Ok(records)
    }

    /// Searches the SDR repository for the full sensor record named `name`.
    pub fn find_sensor(&mut self, name: &str) -> Result<SdrRecord, Error> {
        let mut found = None;
        self.walk(|record| {
            if record.id_string.as_deref() == Some(name) {
                found = Some(record);
                false
            } else {
                true
            }
        })?;

        found
            .inspect(|record| {
                log::info!(
                    "Found sensor {name:?}: record {:#06x}, sensor number {:#04x}",
                    record.record_id(),
                    record.sensor_number
                )
            })
            .ok_or_else(|| Error::SensorNotFound(name.into()))
    }

    /// Returns the raw reading of the sensor `sensor_number`.
    pub fn sensor_reading(&mut self, sensor_number: u8) -> Result<u8, Error> {
        let data = self.request(
            commands::NETFN_SENSOR,
            commands::GET_SENSOR_READING,
            &[sensor_number],
        )?;

        match data.as_slice() {
            [_, flags, ..] if flags & READING_UNAVAILABLE != 0 => {
                Err(Error::ReadingUnavailable(sensor_number))
            }
            [reading, ..] => Ok(*reading),
            [] => Err(Error::ReadingUnavailable(sensor_number)),
        }
    }

    /// Reads `record` once and converts the reading into engineering units.
    pub fn read_sensor(&mut self, record: &SdrRecord) -> Result<f64, Error> {
        let raw = self.sensor_reading(record.sensor_number)?;
        record.convert(raw)
    }

    /// Returns the text dump of the System Event Log.
    pub fn sel_list(&mut self) -> Result<String, Error> {
        self.transport.sel_list()
    }

    /// Erases the content of the System Event Log.
    pub fn clear_sel(&mut self) -> Result<(), Error> {
        let data = self.request(commands::NETFN_STORAGE, commands::RESERVE_SEL, &[])?;
        let [res_ls, res_ms] = Self::reservation(&data)?.to_le_bytes();
        self.request(
            commands::NETFN_STORAGE,
            commands::CLEAR_SEL,
            &[res_ls, res_ms, b'C', b'L', b'R', INITIATE_ERASE],
        )?;
        log::info!("SEL cleared");
        Ok(())
    }
}
