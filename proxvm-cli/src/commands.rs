//! Command execution against an inventory-backed cluster.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use tracing::{info, instrument};

use proxvm_core::{service, ClusterApi, DiskDescriptor, Inventory, MockCluster, VmConfig, VmRecord};

use crate::cli::{Command, OutputFormat};
use crate::config::Settings;

/// Load an inventory file; `.json` files are read as JSON, anything else as YAML.
pub fn load_inventory<P: AsRef<Path>>(path: P) -> Result<Inventory> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inventory: {}", path.display()))?;

    let inventory: Inventory = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON inventory: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML inventory: {}", path.display()))?
    };

    Ok(inventory)
}

/// Run a command with the configured inventory and return its output.
pub async fn run(settings: &Settings, command: &Command) -> Result<String> {
    let path = settings.inventory_path()?;
    let cluster = MockCluster::from_inventory(load_inventory(path)?)?;
    info!(inventory = %path, "Inventory loaded");
    execute(&cluster, command, settings.output).await
}

/// Run a command against any cluster implementation.
#[instrument(skip(api))]
pub async fn execute<A: ClusterApi + ?Sized>(
    api: &A,
    command: &Command,
    output: OutputFormat,
) -> Result<String> {
    match command {
        Command::List { expression } => {
            let vms = service::get_vms(api, expression).await?;
            Ok(match output {
                OutputFormat::Text => vm_table(&vms),
                OutputFormat::Json => to_json(&vms)?,
            })
        }
        Command::Disks { vm } => {
            let record = service::get_vm(api, vm).await?;
            let disks = service::get_config(api, &record).await?.disks();
            Ok(match output {
                OutputFormat::Text => disk_table(&disks),
                OutputFormat::Json => to_json(&disks)?,
            })
        }
        Command::Show { vm } => {
            let record = service::get_vm(api, vm).await?;
            let config = service::get_config(api, &record).await?;
            Ok(match output {
                OutputFormat::Text => summary_text(&record, &config),
                OutputFormat::Json => to_json(&summary_json(&record, &config))?,
            })
        }
        Command::Config { vm, current_only } => {
            let record = service::get_vm(api, vm).await?;
            let text = if *current_only {
                service::get_config(api, &record).await?.render()
            } else {
                service::get_all_configs(api, &record).await?
            };
            Ok(match output {
                OutputFormat::Text => text,
                OutputFormat::Json => to_json(&json!({ "vmid": record.vmid, "config": text }))?,
            })
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    text.push('\n');
    Ok(text)
}

fn vm_table(vms: &[VmRecord]) -> String {
    let mut out = format!("{:<8} {:<24} {:<12} {:<6} {}\n", "VMID", "NAME", "NODE", "KIND", "STATUS");
    for vm in vms {
        out.push_str(&format!(
            "{:<8} {:<24} {:<12} {:<6} {}\n",
            vm.vmid,
            vm.name,
            vm.node,
            vm.kind,
            vm.status().unwrap_or("-")
        ));
    }
    out
}

fn disk_table(disks: &[DiskDescriptor]) -> String {
    let mut out = format!("{:<10} {:<7} {:<14} {:<8} {}\n", "SLOT", "BACKUP", "STORAGE", "SIZE", "VOLUME");
    for disk in disks {
        out.push_str(&format!(
            "{:<10} {:<7} {:<14} {:<8} {}\n",
            disk.slot,
            if disk.backup { "yes" } else { "no" },
            disk.storage().unwrap_or("-"),
            disk.size().unwrap_or("-"),
            disk.volume()
        ));
    }
    out
}

fn summary_text(record: &VmRecord, config: &VmConfig) -> String {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let lines = [
        ("vmid", record.vmid.to_string()),
        ("name", record.name.clone()),
        ("node", record.node.clone()),
        ("kind", record.kind.to_string()),
        ("cores", show(config.cores().ok().map(|c| c.to_string()))),
        ("memory", show(config.memory().ok().map(|m| format!("{} MiB", m)))),
        ("ostype", show(config.os_type().ok().map(str::to_string))),
        ("lock", if config.is_locked() { config.lock().to_string() } else { "-".to_string() }),
        ("disks", config.disks().len().to_string()),
    ];
    lines
        .iter()
        .map(|(key, value)| format!("{:<8} {}\n", format!("{}:", key), value))
        .collect()
}

fn summary_json(record: &VmRecord, config: &VmConfig) -> serde_json::Value {
    json!({
        "vmid": record.vmid,
        "name": record.name,
        "node": record.node,
        "kind": record.kind,
        "cores": config.cores().ok(),
        "memory": config.memory().ok(),
        "ostype": config.os_type().ok(),
        "lock": config.lock(),
        "locked": config.is_locked(),
        "disks": config.disks(),
    })
}
