use comspy_port::list_ports;

use crate::cmd::PortsArgs;
use crate::exit::{port_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = list_ports().map_err(|err| port_error("port listing failed", err))?;
    tracing::debug!(count = ports.len(), "listing serial ports");
    print_ports(&ports, format);
    Ok(SUCCESS)
}
