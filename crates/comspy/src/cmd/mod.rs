use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod ports;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bridge two serial ports and log the messages between them.
    Run(RunArgs),
    /// List serial ports on this machine.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (TOML). Defaults to ./comspy.toml when present.
    #[arg(long, short = 'c', value_name = "FILE", env = "COMSPY_CONFIG")]
    pub config: Option<PathBuf>,
    /// Device on side A (overrides `serial.port1`).
    #[arg(long, value_name = "PATH")]
    pub port1: Option<String>,
    /// Device on side B (overrides `serial.port2`).
    #[arg(long, value_name = "PATH")]
    pub port2: Option<String>,
    /// Name of the device on side A.
    #[arg(long)]
    pub name1: Option<String>,
    /// Name of the device on side B.
    #[arg(long)]
    pub name2: Option<String>,
    /// Quiet interval in seconds that ends a message (overrides `serial.new_msg_timeout`).
    #[arg(long, value_name = "SECONDS")]
    pub quiet: Option<f64>,
    /// Logger name; the log file is `<name>.txt`, lowercased.
    #[arg(long, value_name = "NAME")]
    pub log_name: Option<String>,
    /// Directory for the log file.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    /// Echo logged messages to stdout.
    #[arg(long, conflicts_with = "no_echo")]
    pub echo: bool,
    /// Never echo logged messages to stdout.
    #[arg(long)]
    pub no_echo: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> Overrides {
        let echo = match (self.echo, self.no_echo) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            port1: self.port1.clone(),
            port2: self.port2.clone(),
            name1: self.name1.clone(),
            name2: self.name2.clone(),
            quiet: self.quiet,
            log_name: self.log_name.clone(),
            log_dir: self.log_dir.clone(),
            echo,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
