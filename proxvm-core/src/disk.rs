//! Disk descriptors derived from configuration maps.
//!
//! Hypervisor guests expose disks under `<bus><index>` slots (`scsi0`,
//! `virtio1`, ...); containers have a single `rootfs` volume. Empty slots and
//! CD-ROM drives are not disks.

use serde::{Deserialize, Serialize};

use crate::config::value_text;
use crate::types::{ConfigMap, VmKind};

/// Slot key of a container's root volume.
pub const CONTAINER_ROOT_SLOT: &str = "rootfs";

const EMPTY_SLOT: &str = "none";
const CDROM_MARKER: &str = "cdrom";
const BACKUP_ATTRIBUTE: &str = "backup=";
const SIZE_ATTRIBUTE: &str = "size=";

/// Disk bus of a hypervisor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskBus {
    Ide,
    Sata,
    Scsi,
    Virtio,
}

impl DiskBus {
    pub const ALL: [DiskBus; 4] = [DiskBus::Ide, DiskBus::Sata, DiskBus::Scsi, DiskBus::Virtio];

    /// Get the slot prefix used in configuration keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskBus::Ide => "ide",
            DiskBus::Sata => "sata",
            DiskBus::Scsi => "scsi",
            DiskBus::Virtio => "virtio",
        }
    }

    /// Split a slot key such as `scsi0` into its bus and index.
    pub fn parse_slot(key: &str) -> Option<(DiskBus, u32)> {
        DiskBus::ALL.iter().find_map(|bus| {
            let index = key.strip_prefix(bus.as_str())?;
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            index.parse().ok().map(|index| (*bus, index))
        })
    }
}

/// One disk of a VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskDescriptor {
    /// Configuration key (`scsi0`, `rootfs`)
    pub slot: String,
    /// Raw definition, e.g. `local-lvm:vm-100-disk-0,size=32G`
    pub definition: String,
    /// Whether backups include this disk
    pub backup: bool,
    /// Kind of the owning guest
    pub kind: VmKind,
    /// Bus for hypervisor slots
    pub bus: Option<DiskBus>,
    /// Slot index for hypervisor slots
    pub index: Option<u32>,
}

impl DiskDescriptor {
    /// Storage name: the part of the volume before the first colon.
    ///
    /// `None` for pass-through devices such as `/dev/sdb`.
    pub fn storage(&self) -> Option<&str> {
        self.volume_spec().split_once(':').map(|(storage, _)| storage)
    }

    /// Volume name within the storage (or the device path).
    pub fn volume(&self) -> &str {
        let spec = self.volume_spec();
        spec.split_once(':').map(|(_, volume)| volume).unwrap_or(spec)
    }

    /// Declared size, e.g. `32G`.
    pub fn size(&self) -> Option<&str> {
        attributes(&self.definition).find_map(|a| a.strip_prefix(SIZE_ATTRIBUTE))
    }

    fn volume_spec(&self) -> &str {
        self.definition.split([',', ';']).next().unwrap_or_default()
    }
}

/// Extract the disks of a configuration map, in map iteration order.
pub fn extract_disks(config: &ConfigMap, kind: VmKind) -> Vec<DiskDescriptor> {
    config
        .iter()
        .filter_map(|(key, value)| {
            let definition = value_text(value);
            match kind {
                VmKind::Qemu => qemu_disk(key, &definition),
                VmKind::Lxc => lxc_disk(key, &definition),
            }
        })
        .collect()
}

fn qemu_disk(key: &str, definition: &str) -> Option<DiskDescriptor> {
    let (bus, index) = DiskBus::parse_slot(key)?;
    if definition == EMPTY_SLOT || definition.contains(CDROM_MARKER) {
        return None;
    }
    Some(DiskDescriptor {
        slot: key.to_string(),
        definition: definition.to_string(),
        backup: parse_backup_flag(definition),
        kind: VmKind::Qemu,
        bus: Some(bus),
        index: Some(index),
    })
}

fn lxc_disk(key: &str, definition: &str) -> Option<DiskDescriptor> {
    if key != CONTAINER_ROOT_SLOT {
        return None;
    }
    Some(DiskDescriptor {
        slot: key.to_string(),
        definition: definition.to_string(),
        backup: true,
        kind: VmKind::Lxc,
        bus: None,
        index: None,
    })
}

/// Attributes following the volume, e.g. `backup=0`, `size=32G`.
fn attributes(definition: &str) -> impl Iterator<Item = &str> {
    let rest = definition
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(definition);
    rest.split([',', ';']).map(str::trim)
}

/// `backup=0` (or another false spelling) opts a disk out of backups.
fn parse_backup_flag(definition: &str) -> bool {
    match attributes(definition).find_map(|a| a.strip_prefix(BACKUP_ATTRIBUTE)) {
        Some(value) => !matches!(value, "0" | "no" | "off" | "false"),
        None => true,
    }
}
