use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use comspy_bridge::{Bridge, EventLog};
use comspy_port::SerialLink;

use crate::cmd::RunArgs;
use crate::config::{FileConfig, Settings};
use crate::exit::{bridge_error, config_error, io_error, port_error, CliError, CliResult, SUCCESS};

pub fn run(args: RunArgs) -> CliResult<i32> {
    let file = FileConfig::load(args.config.as_deref()).map_err(config_error)?;
    let settings = Settings::resolve(file, args.overrides()).map_err(config_error)?;

    let port_a = SerialLink::open(settings.port_a.clone())
        .map_err(|err| port_error("open failed", err))?;
    let port_b = SerialLink::open(settings.port_b.clone())
        .map_err(|err| port_error("open failed", err))?;

    let log = EventLog::create(&settings.log_path)
        .map_err(|err| {
            io_error(
                &format!("failed creating {}", settings.log_path.display()),
                err,
            )
        })?
        .with_echo(settings.echo);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    println!(
        "Messages exchanged will be logged in file {}. Type Ctrl-C to stop.",
        settings.log_path.display()
    );

    let mut bridge = Bridge::new(port_a, port_b, log, settings.bridge);
    bridge
        .run(&running)
        .map_err(|err| bridge_error("bridge stopped", err))?;

    println!("Closing log file");
    drop(bridge);
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
