//! # proxvm Core
//!
//! VM selection and configuration modeling for Proxmox VE clusters.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              service                    │
//! │  (get_vms, get_vm, get_all_configs...)  │
//! └──────────┬───────────────────┬──────────┘
//!            │                   │
//!            ▼                   ▼
//! ┌───────────────────┐ ┌───────────────────┐
//! │  ClusterApi trait │ │   pure core       │
//! │  (MockCluster,    │ │ selector, resolve │
//! │   REST clients)   │ │ config, disk,     │
//! └───────────────────┘ │ render            │
//!                       └───────────────────┘
//! ```
//!
//! ## Selector expressions
//!
//! Comma-separated tokens: `all`, `all-<node>`, ids (`100`), ranges
//! (`100:199`), names (`web-01`), wildcards (`web%`, `%01`, `%web%`), and
//! exclusions prefixed with `-`.
//!
//! ```rust
//! use proxvm_core::{resolve, VmKind, VmRecord};
//!
//! let catalog = vec![
//!     VmRecord::new(100, "web-01", "pve1", VmKind::Qemu),
//!     VmRecord::new(101, "web-02", "pve1", VmKind::Qemu),
//!     VmRecord::new(200, "db-01", "pve2", VmKind::Lxc),
//! ];
//!
//! let selected = resolve(&catalog, "all-pve1,db-01,-101");
//! let ids: Vec<u64> = selected.iter().map(|vm| vm.vmid).collect();
//! assert_eq!(ids, vec![100, 200]);
//! ```

pub mod config;
pub mod disk;
pub mod error;
pub mod inventory;
pub mod mock;
pub mod render;
pub mod resolve;
pub mod selector;
pub mod service;
pub mod traits;
pub mod types;

pub use config::{ConfigAccess, VmConfig};
pub use disk::{extract_disks, DiskBus, DiskDescriptor};
pub use error::{ProxvmError, Result};
pub use inventory::{Inventory, InventorySnapshot, InventoryVm};
pub use mock::MockCluster;
pub use render::{aggregate_all_configs, render_config};
pub use resolve::{resolve, resolve_one, Selector};
pub use selector::{matches, SelectorToken, WildcardAnchor};
pub use traits::ClusterApi;
pub use types::*;
