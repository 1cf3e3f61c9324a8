//! Cluster API abstraction trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;

/// Remote operations the core depends on.
///
/// Implementations wrap the cluster's REST API (or, for tests and offline
/// use, an in-memory inventory). Transport, authentication and task polling
/// are the implementation's concern.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    // =========================================================================
    // Inventory
    // =========================================================================

    /// List every VM and container in the cluster.
    async fn list_vms(&self) -> Result<Vec<VmRecord>>;

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Get the live configuration of a guest.
    async fn vm_config(&self, node: &str, kind: VmKind, vmid: u64) -> Result<ConfigMap>;

    /// List the snapshots of a guest, as returned by the API.
    ///
    /// The list may contain the `current` pseudo-entry and is not ordered.
    async fn list_snapshots(&self, node: &str, kind: VmKind, vmid: u64) -> Result<Vec<Snapshot>>;

    /// Get the configuration captured by a snapshot.
    async fn snapshot_config(
        &self,
        node: &str,
        kind: VmKind,
        vmid: u64,
        name: &str,
    ) -> Result<ConfigMap>;

    // =========================================================================
    // Power
    // =========================================================================

    /// Request a power-state change.
    async fn change_status(
        &self,
        node: &str,
        kind: VmKind,
        vmid: u64,
        action: PowerAction,
    ) -> Result<()>;
}
