#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "comspy-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn comspy(dir: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_comspy"))
        .current_dir(dir)
        .env_remove("COMSPY_CONFIG")
        .env_remove("COMSPY_LOG_LEVEL")
        .arg("--log-level")
        .arg("off")
        .args(args)
        .output()
        .expect("comspy should run")
}

#[test]
fn version_prints_package_version() {
    let dir = unique_temp_dir("version");
    let output = comspy(&dir, &["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("comspy {}", env!("CARGO_PKG_VERSION")));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn extended_version_reports_line_profile() {
    let dir = unique_temp_dir("version-ext");
    let output = comspy(&dir, &["version", "--extended"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("baud: 115200 8N1"));
    assert!(stdout.contains("header: 0x1 0xff 0x2"));
    assert!(stdout.contains("profile: "));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_with_missing_config_file_returns_60() {
    let dir = unique_temp_dir("missing-config");
    let output = comspy(&dir, &["run", "--config", "nope.toml"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read nope.toml"), "stderr: {stderr}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_without_any_settings_reports_missing_port() {
    let dir = unique_temp_dir("no-settings");
    let output = comspy(&dir, &["run"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required setting `port1`"), "stderr: {stderr}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_with_absent_devices_returns_port_error() {
    let dir = unique_temp_dir("absent-devices");
    std::fs::write(
        dir.join("comspy.toml"),
        r#"
[serial]
port1 = "/dev/comspy-missing-a"
port2 = "/dev/comspy-missing-b"
name1 = "PC"
name2 = "Device"
new_msg_timeout = 0.05
"#,
    )
    .expect("config should be writable");

    let output = comspy(&dir, &["run"]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("open failed"), "stderr: {stderr}");
    assert!(stderr.contains("/dev/comspy-missing-a"), "stderr: {stderr}");
    assert!(
        !dir.join("log.txt").exists(),
        "log file must not be created before ports open"
    );
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn ports_json_listing_is_valid_json() {
    let dir = unique_temp_dir("ports");
    let output = comspy(&dir, &["--format", "json", "ports"]);

    match output.status.code() {
        Some(0) => {
            let value: serde_json::Value = serde_json::from_slice(&output.stdout)
                .expect("ports output should be json");
            let ports = value["ports"].as_array().expect("ports should be an array");
            assert_eq!(value["count"].as_u64(), Some(ports.len() as u64));
        }
        // Hosts without a readable device tree cannot enumerate at all.
        Some(3) => {}
        other => panic!("unexpected exit code {other:?}"),
    }
    let _ = std::fs::remove_dir_all(&dir);
}
