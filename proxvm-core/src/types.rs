//! Type definitions for cluster VM records, snapshots and power actions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ProxvmError, Result};

/// Untyped configuration of one VM at one point in time.
///
/// Keys are the cluster's own vocabulary (`cores`, `memory`, `scsi0`, ...).
/// Insertion order follows the payload the map was built from.
pub type ConfigMap = IndexMap<String, Value>;

// =============================================================================
// VM KIND
// =============================================================================

/// How a guest is virtualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum VmKind {
    /// Fully virtualized machine managed by QEMU/KVM.
    Qemu,
    /// OS-level container managed by LXC.
    Lxc,
}

impl VmKind {
    /// Get the API name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            VmKind::Qemu => "qemu",
            VmKind::Lxc => "lxc",
        }
    }
}

impl fmt::Display for VmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VmKind {
    type Err = ProxvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "qemu" => Ok(VmKind::Qemu),
            "lxc" => Ok(VmKind::Lxc),
            other => Err(ProxvmError::UnsupportedKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for VmKind {
    type Error = ProxvmError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// =============================================================================
// VM RECORD
// =============================================================================

/// One VM or container as listed by the cluster inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmRecord {
    /// Cluster-wide numeric identifier
    pub vmid: u64,
    /// Display name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Node currently hosting the guest
    pub node: String,
    /// Virtualization kind
    #[serde(rename = "type")]
    pub kind: VmKind,
    /// Any other attributes reported by the inventory (status, maxmem, ...)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl VmRecord {
    /// Create a record without extra attributes.
    pub fn new(vmid: u64, name: impl Into<String>, node: impl Into<String>, kind: VmKind) -> Self {
        Self {
            vmid,
            name: name.into(),
            node: node.into(),
            kind,
            extra: IndexMap::new(),
        }
    }

    /// Attach an extra attribute.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Power status as reported by the inventory, if any.
    pub fn status(&self) -> Option<&str> {
        self.extra.get("status").and_then(Value::as_str)
    }

    /// Whether the inventory flags this guest as a template.
    pub fn is_template(&self) -> bool {
        self.extra.get("template").map(value_as_flag).unwrap_or(false)
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// Name the API uses for the pseudo-snapshot that represents the live state.
pub const CURRENT_SNAPSHOT: &str = "current";

/// One entry of a VM's snapshot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Creation time in unix seconds (absent on the `current` entry)
    #[serde(default)]
    pub snaptime: Option<i64>,
    /// Parent snapshot name
    #[serde(default)]
    pub parent: Option<String>,
    /// Whether RAM state was saved with the snapshot
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub vmstate: bool,
}

impl Snapshot {
    /// Create a snapshot entry with a creation time.
    pub fn new(name: impl Into<String>, snaptime: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            snaptime: Some(snaptime),
            parent: None,
            vmstate: false,
        }
    }

    /// Creation time, if known.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.snaptime.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Whether this is the `current` pseudo-entry rather than a real snapshot.
    pub fn is_current(&self) -> bool {
        self.name == CURRENT_SNAPSHOT
    }
}

/// A snapshot name paired with the configuration captured by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub name: String,
    pub config: ConfigMap,
}

impl SnapshotConfig {
    pub fn new(name: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

/// Sort snapshots oldest first, dropping the `current` pseudo-entry.
///
/// Entries without a creation time sort before dated ones; equal times are
/// ordered by name.
pub fn order_snapshots(snapshots: Vec<Snapshot>) -> Vec<Snapshot> {
    let mut ordered: Vec<Snapshot> = snapshots
        .into_iter()
        .filter(|s| !s.is_current())
        .collect();
    ordered.sort_by(|a, b| a.snaptime.cmp(&b.snaptime).then_with(|| a.name.cmp(&b.name)));
    ordered
}

// =============================================================================
// POWER ACTIONS
// =============================================================================

/// Power-state change that can be requested for a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Start,
    Stop,
    Shutdown,
    Reboot,
    Reset,
    Suspend,
    Resume,
}

impl PowerAction {
    /// Get the API path segment for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
            PowerAction::Reset => "reset",
            PowerAction::Suspend => "suspend",
            PowerAction::Resume => "resume",
        }
    }

    /// Check that the action exists for guests of `kind`.
    ///
    /// Containers have no hardware reset.
    pub fn validate_for(&self, kind: VmKind) -> Result<()> {
        match (kind, self) {
            (VmKind::Lxc, PowerAction::Reset) => Err(ProxvmError::UnsupportedKind(
                "reset is not possible on a container".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = ProxvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(PowerAction::Start),
            "stop" => Ok(PowerAction::Stop),
            "shutdown" => Ok(PowerAction::Shutdown),
            "reboot" => Ok(PowerAction::Reboot),
            "reset" => Ok(PowerAction::Reset),
            "suspend" => Ok(PowerAction::Suspend),
            "resume" => Ok(PowerAction::Resume),
            other => Err(ProxvmError::Internal(format!("Unknown power action: {}", other))),
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// The API encodes booleans as 0/1, sometimes quoted.
fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_flag(&value))
}
