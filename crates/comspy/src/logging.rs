use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Crates whose events follow `--log-level`.
const COMSPY_TARGETS: [&str; 4] = ["comspy", "comspy_bridge", "comspy_frame", "comspy_port"];

/// Filter that applies `level` to the comspy crates and caps everything else
/// at warn.
pub fn targets(level: LogLevel) -> Targets {
    let level = level.as_filter();
    Targets::new()
        .with_targets(COMSPY_TARGETS.map(|target| (target, level)))
        .with_default(level.min(LevelFilter::WARN))
}

/// Diagnostics go to stderr so they never mix with the message log echoed on
/// stdout.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.finish().with(targets(level)).try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().finish().with(targets(level)).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn comspy_targets_follow_requested_level() {
        let filter = targets(LogLevel::Trace);
        assert!(filter.would_enable("comspy_frame::framer", &Level::TRACE));
        assert!(filter.would_enable("comspy_bridge", &Level::DEBUG));
        assert!(!filter.would_enable("serialport", &Level::INFO));
        assert!(filter.would_enable("serialport", &Level::WARN));
    }

    #[test]
    fn off_silences_everything() {
        let filter = targets(LogLevel::Off);
        assert!(!filter.would_enable("comspy", &Level::ERROR));
        assert!(!filter.would_enable("other", &Level::ERROR));
    }
}
