//! Offline inventory documents.
//!
//! An inventory captures what the cluster API would return: every guest with
//! its live configuration and its snapshots. It is the on-disk input of
//! [`MockCluster`](crate::MockCluster).
//!
//! ```yaml
//! vms:
//!   - vmid: 100
//!     name: web-01
//!     node: pve1
//!     type: qemu
//!     status: running
//!     config:
//!       cores: 2
//!       scsi0: local-lvm:vm-100-disk-0,size=32G
//!     snapshots:
//!       - name: before-upgrade
//!         snaptime: 1700000000
//!         config:
//!           cores: 1
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{ConfigMap, Snapshot, VmRecord};

/// A captured cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub vms: Vec<InventoryVm>,
}

/// One guest of an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryVm {
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub snapshots: Vec<InventorySnapshot>,
    #[serde(flatten)]
    pub record: VmRecord,
}

/// One snapshot of an inventory guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}
