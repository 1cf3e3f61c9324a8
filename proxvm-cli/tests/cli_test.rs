//! Integration tests for settings handling and inventory-backed commands.

use clap::Parser;
use proxvm_cli::commands::{load_inventory, run};
use proxvm_cli::{Args, Command, OutputFormat, Settings};
use proxvm_common::LogFormat;
use std::io::Write;

const INVENTORY_YAML: &str = r#"
vms:
  - vmid: 100
    name: web-01
    node: pve1
    type: qemu
    config:
      description: frontend
      cores: 2
      memory: 2048
      scsi0: local-lvm:vm-100-disk-0,size=32G
    snapshots:
      - name: snap1
        snaptime: 1700000100
        config:
          cores: 1
  - vmid: 200
    name: db-01
    node: pve2
    type: lxc
    config:
      rootfs: local:vm-200-disk-0,size=8G
"#;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write temp file");
    file
}

/// Test settings loading from YAML.
#[test]
fn test_settings_yaml_parsing() {
    let file = write_temp(
        ".yaml",
        r#"
inventory: /srv/cluster.yaml
output: json
log:
  level: debug
  format: json
"#,
    );

    let settings = Settings::load(file.path()).expect("Failed to load settings");
    assert_eq!(settings.inventory.as_deref(), Some("/srv/cluster.yaml"));
    assert_eq!(settings.output, OutputFormat::Json);
    assert_eq!(settings.log.level, "debug");
    assert_eq!(settings.log.format().unwrap(), LogFormat::Json);
}

/// Test that defaults are valid and missing files are reported.
#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.output, OutputFormat::Text);
    assert_eq!(settings.log.level, "warn");
    assert!(settings.inventory_path().is_err());

    assert!(Settings::load("/nonexistent/proxvm.yaml").is_err());
}

/// Test that the default settings file lives under the platform config directory.
#[test]
fn test_default_settings_path() {
    let path = Settings::default_path();
    match dirs::config_dir() {
        Some(dir) => {
            let path = path.expect("Expected a default settings path");
            assert!(path.starts_with(&dir));
            assert!(path.ends_with("proxvm/config.yaml"));
        }
        None => assert!(path.is_none()),
    }
}

/// Test that an invalid log format is rejected.
#[test]
fn test_invalid_log_format() {
    let file = write_temp(".yaml", "log:\n  format: xml\n");
    assert!(Settings::load(file.path()).is_err());
}

/// Test CLI overrides on top of a settings file.
#[test]
fn test_cli_overrides() {
    let file = write_temp(".yaml", "inventory: /from/file.yaml\n");
    let config_path = file.path().to_str().unwrap().to_string();

    let args = Args::try_parse_from([
        "proxvm",
        "--config",
        &config_path,
        "--inventory",
        "/from/cli.yaml",
        "--output",
        "json",
        "--log-level",
        "trace",
        "list",
        "all",
    ])
    .expect("Failed to parse args");

    assert_eq!(args.command, Command::List { expression: "all".to_string() });

    let settings = Settings::from_args(&args).expect("Failed to resolve settings");
    assert_eq!(settings.inventory.as_deref(), Some("/from/cli.yaml"));
    assert_eq!(settings.output, OutputFormat::Json);
    assert_eq!(settings.log.level, "trace");
}

/// Test parsing of the config subcommand flags.
#[test]
fn test_config_subcommand() {
    let args = Args::try_parse_from(["proxvm", "config", "web-01", "--current-only"]).unwrap();
    assert_eq!(
        args.command,
        Command::Config { vm: "web-01".to_string(), current_only: true }
    );
}

/// Test that YAML and JSON inventories load to the same data.
#[test]
fn test_load_inventory_formats() {
    let yaml = write_temp(".yaml", INVENTORY_YAML);
    let from_yaml = load_inventory(yaml.path()).expect("Failed to load YAML inventory");
    assert_eq!(from_yaml.vms.len(), 2);

    let json_text = serde_json::to_string(&from_yaml).unwrap();
    let json = write_temp(".json", &json_text);
    let from_json = load_inventory(json.path()).expect("Failed to load JSON inventory");
    assert_eq!(from_json, from_yaml);

    let broken = write_temp(".json", "{ not json");
    assert!(load_inventory(broken.path()).is_err());
}

/// Test running a command end to end from an inventory file.
#[tokio::test]
async fn test_run_config_command() {
    let inventory = write_temp(".yaml", INVENTORY_YAML);
    let settings = Settings {
        inventory: Some(inventory.path().to_str().unwrap().to_string()),
        ..Settings::default()
    };

    let out = run(&settings, &Command::Config { vm: "web%".to_string(), current_only: false })
        .await
        .expect("Command failed");

    assert_eq!(
        out,
        "#frontend\ncores: 2\nlock: \nmemory: 2048\nscsi0: local-lvm:vm-100-disk-0,size=32G\n\n[snap1]\ncores: 1\n"
    );
}

/// Test that a missing inventory is a clear error.
#[tokio::test]
async fn test_run_without_inventory() {
    let err = run(&Settings::default(), &Command::List { expression: "all".to_string() })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No inventory"));
}
