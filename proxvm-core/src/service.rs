//! Cluster-facing operations.
//!
//! Each function fetches what it needs through a [`ClusterApi`] and hands the
//! data to the pure selector, configuration and rendering code.

use tracing::{debug, info, instrument};

use crate::config::VmConfig;
use crate::error::Result;
use crate::resolve::{resolve, resolve_one};
use crate::traits::ClusterApi;
use crate::types::*;

/// Fetch the catalog, ordered by node and then by id.
pub async fn catalog<A: ClusterApi + ?Sized>(api: &A) -> Result<Vec<VmRecord>> {
    let mut vms = api.list_vms().await?;
    vms.sort_by(|a, b| a.node.cmp(&b.node).then(a.vmid.cmp(&b.vmid)));
    Ok(vms)
}

/// Resolve a selector expression against the cluster.
#[instrument(skip(api))]
pub async fn get_vms<A: ClusterApi + ?Sized>(api: &A, jolly: &str) -> Result<Vec<VmRecord>> {
    let vms = resolve(&catalog(api).await?, jolly);
    debug!(count = vms.len(), "Resolved selector");
    Ok(vms)
}

/// Find a single guest by id or name.
#[instrument(skip(api))]
pub async fn get_vm<A: ClusterApi + ?Sized>(api: &A, id_or_name: &str) -> Result<VmRecord> {
    resolve_one(&catalog(api).await?, id_or_name)
}

/// Fetch and normalize the live configuration of a guest.
#[instrument(skip(api, record), fields(vmid = record.vmid))]
pub async fn get_config<A: ClusterApi + ?Sized>(api: &A, record: &VmRecord) -> Result<VmConfig> {
    let data = api.vm_config(&record.node, record.kind, record.vmid).await?;
    Ok(VmConfig::new(record.kind, data))
}

/// Fetch the snapshots of a guest, oldest first, without the `current` entry.
#[instrument(skip(api, record), fields(vmid = record.vmid))]
pub async fn get_snapshots<A: ClusterApi + ?Sized>(api: &A, record: &VmRecord) -> Result<Vec<Snapshot>> {
    let snapshots = api.list_snapshots(&record.node, record.kind, record.vmid).await?;
    Ok(order_snapshots(snapshots))
}

/// Fetch the configuration of every snapshot, oldest first.
pub async fn get_snapshot_configs<A: ClusterApi + ?Sized>(
    api: &A,
    record: &VmRecord,
) -> Result<Vec<SnapshotConfig>> {
    let mut configs = Vec::new();
    for snapshot in get_snapshots(api, record).await? {
        let config = api
            .snapshot_config(&record.node, record.kind, record.vmid, &snapshot.name)
            .await?;
        configs.push(SnapshotConfig::new(snapshot.name, config));
    }
    Ok(configs)
}

/// Render the live configuration and every snapshot configuration.
#[instrument(skip(api, record), fields(vmid = record.vmid))]
pub async fn get_all_configs<A: ClusterApi + ?Sized>(api: &A, record: &VmRecord) -> Result<String> {
    let config = get_config(api, record).await?;
    let snapshots = get_snapshot_configs(api, record).await?;
    debug!(snapshots = snapshots.len(), "Aggregating configurations");
    Ok(config.all_configs(&snapshots))
}

/// Request a power-state change after checking it exists for the guest's kind.
#[instrument(skip(api, record), fields(vmid = record.vmid, kind = %record.kind))]
pub async fn change_status<A: ClusterApi + ?Sized>(
    api: &A,
    record: &VmRecord,
    action: PowerAction,
) -> Result<()> {
    action.validate_for(record.kind)?;
    api.change_status(&record.node, record.kind, record.vmid, action).await?;
    info!(action = %action, "Power action requested");
    Ok(())
}
