//! Integration tests for the cluster service.
//!
//! These tests drive the service functions against an in-memory cluster
//! loaded from a YAML inventory.

use proxvm_core::{
    service, ClusterApi, DiskBus, Inventory, MockCluster, PowerAction, ProxvmError, VmKind,
};

const INVENTORY: &str = r#"
vms:
  - vmid: 300
    name: backup
    node: pve2
    type: qemu
    config:
      cores: 1
      memory: 1024
      ostype: l26
      scsi0: local-lvm:vm-300-disk-0,size=500G,backup=0
  - vmid: 101
    name: web-02
    node: pve1
    type: qemu
    status: stopped
    config:
      cores: 2
      memory: 2048
      ostype: l26
      scsi0: local-lvm:vm-101-disk-0,size=32G
  - vmid: 100
    name: web-01
    node: pve1
    type: qemu
    status: running
    config:
      description: frontend
      cores: 4
      memory: "4096"
      ostype: l26
      lock: backup
      ide2: local:iso/debian-12.iso,media=cdrom
      scsi0: local-lvm:vm-100-disk-0,size=32G
      virtio1: ceph:vm-100-disk-1,backup=0
    snapshots:
      - name: snap2
        snaptime: 1700000200
        config:
          cores: 2
          memory: 4096
      - name: snap1
        snaptime: 1700000100
        vmstate: 1
        config:
          cores: 1
          memory: 2048
  - vmid: 200
    name: db-01
    node: pve2
    type: lxc
    config:
      cores: 2
      memory: 512
      ostype: debian
      rootfs: local:vm-200-disk-0,size=8G
      mp0: local:vm-200-disk-1,mp=/var/lib/db
"#;

fn cluster() -> MockCluster {
    let inventory: Inventory = serde_yaml::from_str(INVENTORY).expect("Failed to parse inventory");
    MockCluster::from_inventory(inventory).expect("Failed to load inventory")
}

fn ids(vms: &[proxvm_core::VmRecord]) -> Vec<u64> {
    vms.iter().map(|vm| vm.vmid).collect()
}

/// The catalog is ordered by node, then id, before resolution.
#[tokio::test]
async fn test_get_vms_orders_catalog() {
    let cluster = cluster();

    let all = service::get_vms(&cluster, "all").await.unwrap();
    assert_eq!(ids(&all), vec![100, 101, 200, 300]);

    let pve2 = service::get_vms(&cluster, "all-pve2").await.unwrap();
    assert_eq!(ids(&pve2), vec![200, 300]);

    let mixed = service::get_vms(&cluster, "backup,web%,-web-01,db-01").await.unwrap();
    assert_eq!(ids(&mixed), vec![300, 200]);
}

/// Single lookups fail with NotFound only when nothing matches.
#[tokio::test]
async fn test_get_vm() {
    let cluster = cluster();

    assert_eq!(service::get_vm(&cluster, "%02").await.unwrap().vmid, 101);
    assert_eq!(service::get_vm(&cluster, "WEB-01").await.unwrap().vmid, 100);
    assert_eq!(service::get_vm(&cluster, "100:300").await.unwrap().vmid, 100);

    let err = service::get_vm(&cluster, "999").await.unwrap_err();
    assert_eq!(err, ProxvmError::NotFound("999".to_string()));
}

/// Configuration accessors, lock state and disks.
#[tokio::test]
async fn test_get_config() {
    let cluster = cluster();

    let web = service::get_vm(&cluster, "web-01").await.unwrap();
    let config = service::get_config(&cluster, &web).await.unwrap();
    assert_eq!(config.cores().unwrap(), 4);
    assert_eq!(config.memory().unwrap(), 4096);
    assert_eq!(config.os_type().unwrap(), "l26");
    assert!(config.is_locked());

    let disks = config.disks();
    assert_eq!(disks.len(), 2);
    let scsi0 = disks.iter().find(|d| d.slot == "scsi0").unwrap();
    assert!(scsi0.backup);
    assert_eq!(scsi0.bus, Some(DiskBus::Scsi));
    assert_eq!(scsi0.size(), Some("32G"));
    let virtio1 = disks.iter().find(|d| d.slot == "virtio1").unwrap();
    assert!(!virtio1.backup);

    let db = service::get_vm(&cluster, "db-01").await.unwrap();
    let config = service::get_config(&cluster, &db).await.unwrap();
    assert_eq!(config.lock(), "");
    assert!(!config.is_locked());
    let disks = config.disks();
    assert_eq!(disks.len(), 1);
    assert_eq!(disks[0].slot, "rootfs");
    assert_eq!(disks[0].kind, VmKind::Lxc);
}

/// Snapshots come back oldest first, without the `current` entry.
#[tokio::test]
async fn test_get_snapshots() {
    let cluster = cluster();
    let web = service::get_vm(&cluster, "web-01").await.unwrap();

    let listed = cluster.list_snapshots(&web.node, web.kind, web.vmid).await.unwrap();
    assert!(listed.iter().any(|s| s.is_current()));

    let snapshots = service::get_snapshots(&cluster, &web).await.unwrap();
    let names: Vec<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["snap1", "snap2"]);
    assert!(snapshots[0].vmstate);
}

/// The aggregated document has the live block then one block per snapshot.
#[tokio::test]
async fn test_get_all_configs() {
    let cluster = cluster();
    let web = service::get_vm(&cluster, "web-01").await.unwrap();

    let text = service::get_all_configs(&cluster, &web).await.unwrap();
    let blocks: Vec<&str> = text.split("\n\n").collect();
    assert_eq!(blocks.len(), 3);

    let current: Vec<&str> = blocks[0].lines().collect();
    assert_eq!(current[0], "#frontend");
    assert_eq!(current[1], "cores: 4");
    assert!(current.contains(&"lock: backup"));

    assert_eq!(blocks[1], "[snap1]\ncores: 1\nmemory: 2048");
    assert_eq!(blocks[2], "[snap2]\ncores: 2\nmemory: 4096\n");
}

/// A guest without snapshots renders a single block with a normalized lock.
#[tokio::test]
async fn test_get_all_configs_without_snapshots() {
    let cluster = cluster();
    let db = service::get_vm(&cluster, "db-01").await.unwrap();

    let text = service::get_all_configs(&cluster, &db).await.unwrap();
    assert!(!text.contains('['));
    assert!(text.contains("lock: \n"));
    assert!(text.starts_with("cores: 2\nlock: \nmemory: 512\n"));
}

/// Power actions are validated against the guest kind before delegating.
#[tokio::test]
async fn test_change_status() {
    let cluster = cluster();
    let web = service::get_vm(&cluster, "web-01").await.unwrap();
    let db = service::get_vm(&cluster, "db-01").await.unwrap();

    service::change_status(&cluster, &web, PowerAction::Reset).await.unwrap();
    service::change_status(&cluster, &db, PowerAction::Shutdown).await.unwrap();

    let err = service::change_status(&cluster, &db, PowerAction::Reset).await.unwrap_err();
    assert!(matches!(err, ProxvmError::UnsupportedKind(_)));

    assert_eq!(
        cluster.power_log().unwrap(),
        vec![(100, PowerAction::Reset), (200, PowerAction::Shutdown)]
    );
}

/// Services work through a trait object as well as a concrete type.
#[tokio::test]
async fn test_dyn_cluster_api() {
    let cluster = cluster();
    let api: &dyn ClusterApi = &cluster;

    let vms = service::get_vms(api, "200,100").await.unwrap();
    assert_eq!(ids(&vms), vec![200, 100]);
}
