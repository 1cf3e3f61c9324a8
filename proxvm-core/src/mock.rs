//! In-memory cluster for testing and offline use.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::error::{ProxvmError, Result};
use crate::inventory::Inventory;
use crate::traits::ClusterApi;
use crate::types::*;

/// In-memory cluster.
///
/// Serves VM records, configurations and snapshots from memory without a
/// real cluster. Useful for:
/// - Unit and integration testing
/// - Working offline against a captured [`Inventory`]
///
/// Snapshot listings include the `current` pseudo-entry the real API
/// returns. Power actions are recorded, not executed.
pub struct MockCluster {
    vms: RwLock<IndexMap<u64, MockVm>>,
    power_log: RwLock<Vec<(u64, PowerAction)>>,
}

struct MockVm {
    record: VmRecord,
    config: ConfigMap,
    snapshots: Vec<(Snapshot, ConfigMap)>,
}

impl MockCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        Self {
            vms: RwLock::new(IndexMap::new()),
            power_log: RwLock::new(Vec::new()),
        }
    }

    /// Build a cluster from a captured inventory.
    pub fn from_inventory(inventory: Inventory) -> Result<Self> {
        let cluster = Self::new();
        for vm in inventory.vms {
            let vmid = vm.record.vmid;
            cluster.add_vm(vm.record, vm.config)?;
            for snap in vm.snapshots {
                cluster.add_snapshot(vmid, snap.snapshot, snap.config)?;
            }
        }
        info!(vms = cluster.len()?, "Loaded inventory into mock cluster");
        Ok(cluster)
    }

    /// Add a guest with its live configuration.
    pub fn add_vm(&self, record: VmRecord, config: ConfigMap) -> Result<()> {
        let mut vms = self.vms.write().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;

        if vms.contains_key(&record.vmid) {
            return Err(ProxvmError::Api(format!("VM {} already exists", record.vmid)));
        }

        debug!(vmid = record.vmid, node = %record.node, "Adding mock VM");
        vms.insert(record.vmid, MockVm {
            record,
            config,
            snapshots: Vec::new(),
        });
        Ok(())
    }

    /// Add a snapshot to an existing guest.
    pub fn add_snapshot(&self, vmid: u64, snapshot: Snapshot, config: ConfigMap) -> Result<()> {
        let mut vms = self.vms.write().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;

        let vm = vms.get_mut(&vmid)
            .ok_or_else(|| ProxvmError::NotFound(vmid.to_string()))?;

        if snapshot.is_current() {
            return Err(ProxvmError::Api(format!(
                "snapshot name '{}' is reserved", CURRENT_SNAPSHOT
            )));
        }

        vm.snapshots.push((snapshot, config));
        Ok(())
    }

    /// Number of guests.
    pub fn len(&self) -> Result<usize> {
        let vms = self.vms.read().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;
        Ok(vms.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Power actions requested so far, oldest first.
    pub fn power_log(&self) -> Result<Vec<(u64, PowerAction)>> {
        let log = self.power_log.read().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;
        Ok(log.clone())
    }

    /// Run `f` on the guest addressed by node, kind and id.
    fn with_vm<T>(
        &self,
        node: &str,
        kind: VmKind,
        vmid: u64,
        f: impl FnOnce(&MockVm) -> Result<T>,
    ) -> Result<T> {
        let vms = self.vms.read().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;

        let vm = vms.get(&vmid)
            .filter(|vm| vm.record.node == node && vm.record.kind == kind)
            .ok_or_else(|| ProxvmError::NotFound(format!("{}/{}/{}", node, kind, vmid)))?;

        f(vm)
    }
}

impl Default for MockCluster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn list_vms(&self) -> Result<Vec<VmRecord>> {
        let vms = self.vms.read().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;

        let result: Vec<VmRecord> = vms.values().map(|vm| vm.record.clone()).collect();

        debug!(count = result.len(), "Listed VMs");
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn vm_config(&self, node: &str, kind: VmKind, vmid: u64) -> Result<ConfigMap> {
        self.with_vm(node, kind, vmid, |vm| Ok(vm.config.clone()))
    }

    #[instrument(skip(self))]
    async fn list_snapshots(&self, node: &str, kind: VmKind, vmid: u64) -> Result<Vec<Snapshot>> {
        self.with_vm(node, kind, vmid, |vm| {
            let mut snapshots: Vec<Snapshot> = vm.snapshots.iter().map(|(s, _)| s.clone()).collect();
            let newest = snapshots.iter().max_by_key(|s| s.snaptime).map(|s| s.name.clone());
            snapshots.push(Snapshot {
                name: CURRENT_SNAPSHOT.to_string(),
                description: "You are here!".to_string(),
                snaptime: None,
                parent: newest,
                vmstate: false,
            });
            Ok(snapshots)
        })
    }

    #[instrument(skip(self))]
    async fn snapshot_config(
        &self,
        node: &str,
        kind: VmKind,
        vmid: u64,
        name: &str,
    ) -> Result<ConfigMap> {
        self.with_vm(node, kind, vmid, |vm| {
            vm.snapshots
                .iter()
                .find(|(s, _)| s.name == name)
                .map(|(_, config)| config.clone())
                .ok_or_else(|| ProxvmError::SnapshotNotFound(name.to_string()))
        })
    }

    #[instrument(skip(self))]
    async fn change_status(
        &self,
        node: &str,
        kind: VmKind,
        vmid: u64,
        action: PowerAction,
    ) -> Result<()> {
        self.with_vm(node, kind, vmid, |_| Ok(()))?;

        let mut log = self.power_log.write().map_err(|_| {
            ProxvmError::Internal("Lock poisoned".to_string())
        })?;
        log.push((vmid, action));

        info!("Mock power action recorded");
        Ok(())
    }
}
