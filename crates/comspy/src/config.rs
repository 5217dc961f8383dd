use std::path::{Path, PathBuf};
use std::time::Duration;

use comspy_bridge::{BridgeConfig, DEFAULT_IDLE_SLEEP};
use comspy_port::SerialSettings;
use serde::Deserialize;

/// Config file read when `--config` is not given. Its absence is not an error.
pub const DEFAULT_CONFIG_PATH: &str = "comspy.toml";

/// Logger name whose log file is echoed to the console unless told otherwise.
pub const DEFAULT_LOG_NAME: &str = "log";

/// Errors in loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Contents of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub serial: SerialSection,
    #[serde(default)]
    pub log: LogSection,
}

/// `[serial]` table. Timeouts are fractional seconds.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerialSection {
    pub port1: Option<String>,
    pub port2: Option<String>,
    pub read_timeout: Option<f64>,
    pub write_timeout: Option<f64>,
    pub inter_byte_timeout: Option<f64>,
    pub name1: Option<String>,
    pub name2: Option<String>,
    pub new_msg_timeout: Option<f64>,
    pub max_message_len: Option<usize>,
}

/// `[log]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    pub name: Option<String>,
    pub dir: Option<PathBuf>,
    pub echo: Option<bool>,
}

impl FileConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_PATH`] if it exists when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port1: Option<String>,
    pub port2: Option<String>,
    pub name1: Option<String>,
    pub name2: Option<String>,
    pub quiet: Option<f64>,
    pub log_name: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub echo: Option<bool>,
}

/// Fully validated settings for one bridge run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port_a: SerialSettings,
    pub port_b: SerialSettings,
    pub bridge: BridgeConfig,
    pub log_path: PathBuf,
    pub echo: bool,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let serial = file.serial;

        let port1 = required("port1", overrides.port1.or(serial.port1))?;
        let port2 = required("port2", overrides.port2.or(serial.port2))?;
        if port1 == port2 {
            return Err(ConfigError::Invalid {
                key: "port2",
                reason: format!("both sides use {port1}"),
            });
        }
        let name1 = non_empty("name1", required("name1", overrides.name1.or(serial.name1))?)?;
        let name2 = non_empty("name2", required("name2", overrides.name2.or(serial.name2))?)?;

        let read_timeout = seconds("read_timeout", serial.read_timeout.unwrap_or(1.0))?;
        let write_timeout = seconds("write_timeout", serial.write_timeout.unwrap_or(1.0))?;
        let inter_byte_timeout = serial
            .inter_byte_timeout
            .map(|v| seconds("inter_byte_timeout", v))
            .transpose()?;

        let quiet = required("new_msg_timeout", overrides.quiet.or(serial.new_msg_timeout))?;
        let quiet_interval = seconds("new_msg_timeout", quiet)?;
        if quiet_interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: "new_msg_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        if serial.max_message_len.is_some_and(|max| max < comspy_frame::HEADER.len()) {
            return Err(ConfigError::Invalid {
                key: "max_message_len",
                reason: format!("must be at least {}", comspy_frame::HEADER.len()),
            });
        }

        let log_name = overrides
            .log_name
            .or(file.log.name)
            .unwrap_or_else(|| DEFAULT_LOG_NAME.to_string());
        let log_name = non_empty("log.name", log_name)?.to_lowercase();
        let log_dir = overrides.log_dir.or(file.log.dir).unwrap_or_default();
        let log_path = log_dir.join(format!("{log_name}.txt"));
        let echo = overrides
            .echo
            .or(file.log.echo)
            .unwrap_or(log_name == DEFAULT_LOG_NAME);

        let port_settings = |path: String| SerialSettings {
            path,
            read_timeout,
            write_timeout,
            inter_byte_timeout,
        };

        let mut bridge = BridgeConfig::new(name1, name2, quiet_interval);
        bridge.idle_sleep = DEFAULT_IDLE_SLEEP.min(read_timeout);
        bridge.max_message_len = serial.max_message_len;

        Ok(Self {
            port_a: port_settings(port1),
            port_b: port_settings(port2),
            bridge,
            log_path,
            echo,
        })
    }
}

fn required<T>(key: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::Missing(key))
}

fn non_empty(key: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn seconds(key: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|err| ConfigError::Invalid {
        key,
        reason: format!("{value} is not a valid number of seconds ({err})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[serial]
port1 = "/dev/ttyUSB0"
port2 = "/dev/ttyUSB1"
read_timeout = 0.5
write_timeout = 2.0
inter_byte_timeout = 0.01
name1 = "PC"
name2 = "Device"
new_msg_timeout = 0.05

[log]
name = "Capture"
dir = "/var/log/comspy"
"#;

    fn resolve(text: &str, overrides: Overrides) -> Result<Settings, ConfigError> {
        Settings::resolve(FileConfig::parse(text).unwrap(), overrides)
    }

    #[test]
    fn resolves_full_file() {
        let settings = resolve(FULL, Overrides::default()).unwrap();

        assert_eq!(settings.port_a.path, "/dev/ttyUSB0");
        assert_eq!(settings.port_b.path, "/dev/ttyUSB1");
        assert_eq!(settings.port_a.read_timeout, Duration::from_millis(500));
        assert_eq!(settings.port_b.write_timeout, Duration::from_secs(2));
        assert_eq!(
            settings.port_a.inter_byte_timeout,
            Some(Duration::from_millis(10))
        );
        assert_eq!(settings.bridge.name_a, "PC");
        assert_eq!(settings.bridge.name_b, "Device");
        assert_eq!(settings.bridge.quiet_interval, Duration::from_millis(50));
        assert_eq!(settings.bridge.idle_sleep, DEFAULT_IDLE_SLEEP);
        assert_eq!(settings.log_path, PathBuf::from("/var/log/comspy/capture.txt"));
        assert!(!settings.echo, "custom logger name should not echo");
    }

    #[test]
    fn overrides_win_over_file() {
        let overrides = Overrides {
            port1: Some("/dev/ttyS0".to_string()),
            name2: Some("Meter".to_string()),
            quiet: Some(0.2),
            log_name: Some("log".to_string()),
            log_dir: Some(PathBuf::from("out")),
            ..Overrides::default()
        };
        let settings = resolve(FULL, overrides).unwrap();

        assert_eq!(settings.port_a.path, "/dev/ttyS0");
        assert_eq!(settings.bridge.name_b, "Meter");
        assert_eq!(settings.bridge.quiet_interval, Duration::from_millis(200));
        assert_eq!(settings.log_path, PathBuf::from("out/log.txt"));
        assert!(settings.echo, "default logger name echoes to console");
    }

    #[test]
    fn defaults_apply_when_optional_keys_absent() {
        let text = r#"
[serial]
port1 = "COM3"
port2 = "COM4"
name1 = "A"
name2 = "B"
new_msg_timeout = 0.1
"#;
        let settings = resolve(text, Overrides::default()).unwrap();
        assert_eq!(settings.port_a.read_timeout, Duration::from_secs(1));
        assert_eq!(settings.port_a.write_timeout, Duration::from_secs(1));
        assert!(settings.port_a.inter_byte_timeout.is_none());
        assert_eq!(settings.log_path, PathBuf::from("log.txt"));
        assert!(settings.echo);
        assert!(settings.bridge.max_message_len.is_none());
    }

    #[test]
    fn missing_port_is_reported() {
        let text =
            "[serial]\nport1 = \"COM3\"\nname1 = \"A\"\nname2 = \"B\"\nnew_msg_timeout = 0.1\n";
        let err = resolve(text, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("port2")));
    }

    #[test]
    fn rejects_blank_device_names() {
        let text = FULL.replace("name1 = \"PC\"", "name1 = \"\"");
        let err = resolve(&text, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "name1", .. }));

        let overrides = Overrides {
            name2: Some("  ".to_string()),
            ..Overrides::default()
        };
        let err = resolve(FULL, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "name2", .. }));
    }

    #[test]
    fn default_log_name_matches_case_insensitively() {
        let overrides = Overrides {
            log_name: Some("LOG".to_string()),
            ..Overrides::default()
        };
        let settings = resolve(FULL, overrides).unwrap();
        assert_eq!(settings.log_path, PathBuf::from("/var/log/comspy/log.txt"));
        assert!(settings.echo);
    }

    #[test]
    fn missing_quiet_interval_is_reported() {
        let text = "[serial]\nport1 = \"COM3\"\nport2 = \"COM4\"\nname1 = \"A\"\nname2 = \"B\"\n";
        let err = resolve(text, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("new_msg_timeout")));
    }

    #[test]
    fn rejects_negative_and_zero_intervals() {
        let negative = Overrides {
            quiet: Some(-1.0),
            ..Overrides::default()
        };
        let err = resolve(FULL, negative).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "new_msg_timeout", .. }));

        let zero = Overrides {
            quiet: Some(0.0),
            ..Overrides::default()
        };
        let err = resolve(FULL, zero).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "new_msg_timeout", .. }));
    }

    #[test]
    fn rejects_same_port_twice() {
        let overrides = Overrides {
            port2: Some("/dev/ttyUSB0".to_string()),
            ..Overrides::default()
        };
        let err = resolve(FULL, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "port2", .. }));
    }

    #[test]
    fn rejects_cap_shorter_than_header() {
        let text = FULL.replace("[log]", "max_message_len = 2\n\n[log]");
        let err = resolve(&text, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "max_message_len", .. }));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        assert!(FileConfig::parse("[serial]\nbaudrate = 9600\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("comspy-no-such-config.toml");
        let err = FileConfig::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("comspy-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("comspy.toml");
        std::fs::write(&path, FULL).unwrap();

        let file = FileConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(file.serial.name1.as_deref(), Some("PC"));
        assert_eq!(file.log.name.as_deref(), Some("Capture"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
