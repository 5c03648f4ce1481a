// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

mod monitor;
mod sdr;
mod sel;
mod sensor;

use bmc_validate::prelude::*;
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "Validate the event log and the sensors of a BMC.")]
struct Cli {
    /// Path to the manifest directory. If not specified, the builtin manifests will be used.
    #[arg(short, long, value_name = "dir")]
    manifest_dir: Option<PathBuf>,

    #[command(flatten)]
    connection: Connection,

    /// Sets the verbosity of the logging messages
    /// -v: Warning, -vv: Info, -vvv: Debug, -vvvv: Trace
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
enum InterfaceArg {
    #[default]
    Open,
    Lan,
    #[value(name = "lanplus")]
    LanPlus,
}

impl From<InterfaceArg> for Interface {
    fn from(interface: InterfaceArg) -> Self {
        match interface {
            InterfaceArg::Open => Interface::Open,
            InterfaceArg::Lan => Interface::Lan,
            InterfaceArg::LanPlus => Interface::LanPlus,
        }
    }
}

/// Options used to reach the BMC through `ipmitool`
#[derive(Args, Clone)]
struct Connection {
    /// Interface used to reach the BMC
    #[arg(short = 'I', long, value_enum, default_value_t = InterfaceArg::default())]
    interface: InterfaceArg,

    /// Address of the BMC
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// User name for the LAN interfaces
    #[arg(short = 'U', long)]
    user: Option<String>,

    /// Password for the LAN interfaces
    #[arg(long, env = "BMCV_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to the ipmitool binary
    #[arg(long, value_name = "path")]
    ipmitool: Option<PathBuf>,
}

impl Connection {
    fn transport(&self) -> IpmiTool {
        let tool = match &self.host {
            Some(host) => IpmiTool::lan(self.interface.into(), host),
            None => {
                if self.interface != InterfaceArg::Open {
                    log::warn!("No host specified, using the in-band interface");
                }
                IpmiTool::in_band()
            }
        }
        .with_credentials(self.user.clone(), self.password.clone());

        match &self.ipmitool {
            Some(program) => tool.with_program(program.clone()),
            None => tool,
        }
    }

    fn bmc(&self) -> Bmc<IpmiTool> {
        Bmc::ipmitool(self.transport())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum)]
enum Format {
    #[default]
    Compact,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Check the System Event Log against the manifest of a check
    SelCheck {
        check: String,
        /// Read the SEL dump from a file instead of the BMC
        #[arg(short, long, value_name = "file")]
        input: Option<PathBuf>,
        /// Clear the SEL of the BMC once checked
        #[arg(long, conflicts_with = "input")]
        clear: bool,
    },
    /// List the events of the System Event Log
    SelShow {
        #[arg(short, long, value_name = "file")]
        input: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::default())]
        format: Format,
    },
    /// Decode a Get SDR response
    SdrDecode {
        /// Response data as hex bytes
        #[arg(long, required_unless_present = "input", conflicts_with = "input")]
        hex: Option<String>,
        /// File holding the response data as hex bytes
        #[arg(short, long, value_name = "file")]
        input: Option<PathBuf>,
        /// Name of the sensor. Defaults to the ID string of the record.
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, value_enum, default_value_t = Format::default())]
        format: Format,
    },
    /// Check that the sensor readings are within their acceptable range
    SensorCheck {
        #[arg(required = true)]
        sensors: Vec<String>,
    },
    /// Sample the sensor readings periodically
    Monitor {
        #[arg(required = true)]
        sensors: Vec<String>,
        /// Number of readings per sensor
        #[arg(short, long, default_value_t = 10)]
        samples: usize,
        /// Delay between two readings, in seconds
        #[arg(long, value_name = "secs", default_value_t = 1)]
        interval: u64,
    },
    /// List the checks that have a manifest
    Checks,
}

impl Command {
    fn run<T: ManifestTree>(
        &self,
        mut manifests: ManifestManager<T>,
        connection: &Connection,
        reporter: &Reporter,
    ) -> Result<(), Error> {
        match self {
            Command::SelCheck {
                check,
                input,
                clear,
            } => {
                let outcome = match sel::dump(connection, input.as_deref()) {
                    Ok(dump) => sel::check(&mut manifests, check, &dump),
                    Err(err) => Outcome::skipped(check, err),
                };
                reporter.report(outcome);
                if *clear {
                    connection.bmc().clear_sel()?;
                }
            }
            Command::SelShow { input, format } => {
                let dump = sel::dump(connection, input.as_deref())?;
                sel::show(&dump, *format, std::io::stdout().lock())?
            }
            Command::SdrDecode {
                hex,
                input,
                name,
                format,
            } => {
                let hex = match (hex, input) {
                    (Some(hex), _) => hex.clone(),
                    (None, Some(input)) => std::fs::read_to_string(input)?,
                    (None, None) => return Err(Error::InvalidHexString(String::new())),
                };
                sdr::decode(&hex, name.as_deref(), *format, std::io::stdout().lock())?
            }
            Command::SensorCheck { sensors } => {
                let mut bmc = connection.bmc();
                for name in sensors {
                    reporter.report(sensor::check(&mut bmc, name));
                }
            }
            Command::Monitor {
                sensors,
                samples,
                interval,
            } => monitor::monitor(
                connection,
                sensors,
                *samples,
                Duration::from_secs(*interval),
                reporter,
            ),
            Command::Checks => {
                for name in manifests.names()? {
                    println!("{name}");
                }
            }
        }
        Ok(())
    }
}

fn run(cli: &Cli, reporter: &Reporter) -> Result<(), Error> {
    if let Some(manifest_dir) = &cli.manifest_dir {
        cli.command.run(
            ManifestManager::file_system_tree(manifest_dir),
            &cli.connection,
            reporter,
        )
    } else {
        cli.command
            .run(ManifestManager::embedded_tree(), &cli.connection, reporter)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level.to_string())).init();

    let tally = Tally::new();
    let result = run(&cli, &tally.reporter());
    let summary = tally.finish();

    if summary.passed + summary.failed > 0 {
        println!("{summary}");
    }

    match result {
        Err(err) => {
            log::error!("Fatal Error: {err}");
            ExitCode::FAILURE
        }
        Ok(()) if !summary.is_success() => ExitCode::FAILURE,
        Ok(()) => ExitCode::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clear_requires_live_sel() {
        assert!(Cli::try_parse_from(["bmcv", "sel-check", "dc_cycle", "--clear"]).is_ok());
        assert!(Cli::try_parse_from(["bmcv", "sel-check", "dc_cycle", "-i", "dc_cycle.sel"]).is_ok());
        assert!(
            Cli::try_parse_from([
                "bmcv",
                "sel-check",
                "dc_cycle",
                "--input",
                "dc_cycle.sel",
                "--clear"
            ])
            .is_err()
        );
    }
}
