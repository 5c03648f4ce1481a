// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use std::{fmt, io, str};

/// Errors reported by the BMC validation functions.
///
/// With the exception of [`Error::UnsupportedLinearization`], which only affects the conversion
/// of a single reading, every variant denotes a setup failure: the check that triggered it cannot
/// be evaluated and must be reported as skipped.
#[derive(Debug)]
pub enum Error {
    InternalError,
    MissingManifest(String),
    InvalidManifest(String),
    CompletionCode(u8),
    TruncatedRecord(usize),
    InvalidRecordType(u8),
    SensorNotFound(String),
    ReadingUnavailable(u8),
    UnsupportedLinearization(u8),
    InvalidHexString(String),
    TransportError(String),
    JsonError(serde_json::Error),
    Utf8Error(str::Utf8Error),
    IOError(io::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InternalError => write!(f, "Internal error in the BMC validation library"),
            Error::MissingManifest(name) => write!(f, "No manifest defined for {name}"),
            Error::InvalidManifest(reason) => write!(f, "Invalid manifest: {reason}"),
            Error::CompletionCode(cc) => write!(f, "IPMI command failed: completion code {cc:#04x}"),
            Error::TruncatedRecord(size) => {
                write!(f, "Sensor Data Record is truncated ({size} bytes)")
            }
            Error::InvalidRecordType(rt) => {
                write!(f, "Not a full sensor record: record type {rt:#04x}")
            }
            Error::SensorNotFound(name) => write!(f, "Sensor {name:?} not found in the SDR repository"),
            Error::ReadingUnavailable(sensor) => {
                write!(f, "Reading of sensor {sensor:#04x} is unavailable")
            }
            Error::UnsupportedLinearization(code) => {
                write!(f, "Unsupported linearization type: {code:#04x}")
            }
            Error::InvalidHexString(s) => write!(f, "Invalid hex byte: {s:?}"),
            Error::TransportError(reason) => write!(f, "IPMI transport error: {reason}"),
            Error::JsonError(err) => write!(f, "Invalid JSON file: {err}"),
            Error::Utf8Error(err) => write!(f, "UTF8 Error: {err}"),
            Error::IOError(err) => write!(f, "Encountered IO error: {err}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

impl From<str::Utf8Error> for Error {
    fn from(err: str::Utf8Error) -> Self {
        Error::Utf8Error(err)
    }
}
