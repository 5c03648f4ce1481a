// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::{Bmc, RawResponse, Transport};
use crate::Error;
use crate::utils::parse_hex;
use std::path::PathBuf;
use std::process::{Command, Output};

const DEFAULT_PROGRAM: &str = "ipmitool";
const PASSWORD_VAR: &str = "IPMI_PASSWORD";
const COMPLETION_CODE_MARKER: &str = "rsp=0x";

/// Interface used by `ipmitool` to reach the BMC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interface {
    /// In-band access through the KCS interface of the host
    #[default]
    Open,
    /// IPMI 1.5 over LAN
    Lan,
    /// IPMI 2.0 over LAN
    LanPlus,
}

impl Interface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interface::Open => "open",
            Interface::Lan => "lan",
            Interface::LanPlus => "lanplus",
        }
    }
}

/// A [`Transport`] that runs the `ipmitool` utility.
///
/// The password is handed over to `ipmitool` through its environment rather than its command
/// line.
#[derive(Clone, Debug, Default)]
pub struct IpmiTool {
    program: Option<PathBuf>,
    interface: Interface,
    host: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

impl IpmiTool {
    /// Returns a transport that uses the in-band interface of the host.
    pub fn in_band() -> Self {
        IpmiTool::default()
    }

    /// Returns a transport that reaches the BMC at `host` over the network.
    pub fn lan(interface: Interface, host: &str) -> Self {
        IpmiTool {
            interface,
            host: Some(host.into()),
            ..IpmiTool::default()
        }
    }

    pub fn with_credentials(self, user: Option<String>, password: Option<String>) -> Self {
        IpmiTool {
            user,
            password,
            ..self
        }
    }

    /// Uses the `ipmitool` binary located at `program` instead of the one found in `PATH`.
    pub fn with_program(self, program: PathBuf) -> Self {
        IpmiTool {
            program: Some(program),
            ..self
        }
    }

    pub(super) fn arguments(&self, command: &[String]) -> Vec<String> {
        let mut args = vec!["-I".to_string(), self.interface.as_str().to_string()];

        if let Some(host) = &self.host {
            args.extend(["-H".to_string(), host.clone()]);
        }
        if let Some(user) = &self.user {
            args.extend(["-U".to_string(), user.clone()]);
        }
        if self.password.is_some() {
            args.push("-E".to_string());
        }

        args.extend(command.iter().cloned());
        args
    }

    fn run(&self, command: &[String]) -> Result<Output, Error> {
        let program = self
            .program
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));
        let args = self.arguments(command);
        log::debug!("Running {} {}", program.display(), args.join(" "));

        let mut process = Command::new(&program);
        process.args(&args);
        if let Some(password) = &self.password {
            process.env(PASSWORD_VAR, password);
        }

        process.output().map_err(|err| {
            log::error!("Cannot run {}: {err}", program.display());
            Error::from(err)
        })
    }
}

/// Extracts the completion code reported in an `ipmitool` error message.
pub(super) fn completion_code(stderr: &str) -> Option<u8> {
    let start = stderr.find(COMPLETION_CODE_MARKER)? + COMPLETION_CODE_MARKER.len();
    let digits: String = stderr[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u8::from_str_radix(&digits, 16).ok()
}

impl Transport for IpmiTool {
    fn raw(&mut self, netfn: u8, cmd: u8, data: &[u8]) -> Result<RawResponse, Error> {
        let mut command = vec![
            "raw".to_string(),
            format!("{netfn:#04x}"),
            format!("{cmd:#04x}"),
        ];
        command.extend(data.iter().map(|byte| format!("{byte:#04x}")));

        let output = self.run(&command)?;
        if output.status.success() {
            return Ok(RawResponse {
                completion_code: 0,
                data: parse_hex(std::str::from_utf8(&output.stdout)?)?,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        match completion_code(&stderr) {
            Some(completion_code) => Ok(RawResponse {
                completion_code,
                data: Vec::new(),
            }),
            None => Err(Error::TransportError(stderr.trim().to_string())),
        }
    }

    fn sel_list(&mut self) -> Result<String, Error> {
        let output = self.run(&["sel".to_string(), "list".to_string()])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::TransportError(stderr.trim().to_string()));
        }
        Ok(std::str::from_utf8(&output.stdout)?.to_string())
    }
}

impl Bmc<IpmiTool> {
    /// Creates a [`Bmc`] that issues its requests through `ipmitool`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bmc_validate::ipmi::{Bmc, Interface, IpmiTool};
    ///
    /// let bmc = Bmc::ipmitool(
    ///     IpmiTool::lan(Interface::LanPlus, "10.0.0.2")
    ///         .with_credentials(Some("admin".into()), Some("secret".into())),
    /// );
    /// ```
    pub fn ipmitool(tool: IpmiTool) -> Self {
        Self::new(tool)
    }
}
