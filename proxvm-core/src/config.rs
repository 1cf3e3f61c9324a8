//! Typed access to untyped VM configuration maps.

use std::borrow::Cow;

use serde_json::Value;

use crate::disk::{extract_disks, DiskDescriptor};
use crate::error::{ProxvmError, Result};
use crate::render::{aggregate_all_configs, render_config};
use crate::types::{ConfigMap, SnapshotConfig, VmKind};

/// Key holding the lock reason (`backup`, `snapshot`, `migrate`, ...).
pub const LOCK_KEY: &str = "lock";

/// Typed accessors over a [`ConfigMap`].
///
/// Shape mismatches are reported as [`ProxvmError::MalformedConfig`].
pub trait ConfigAccess {
    /// Integer value; numeric strings are accepted.
    fn get_int(&self, key: &str) -> Result<i64>;

    /// Required string value.
    fn get_string(&self, key: &str) -> Result<&str>;

    /// String value that may be absent or null.
    fn get_optional_string(&self, key: &str) -> Result<Option<&str>>;
}

impl ConfigAccess for ConfigMap {
    fn get_int(&self, key: &str) -> Result<i64> {
        match self.get(key) {
            None | Some(Value::Null) => Err(ProxvmError::malformed(key, "missing")),
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| ProxvmError::malformed(key, format!("{} is not an integer", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| ProxvmError::malformed(key, format!("'{}' is not an integer", s))),
            Some(other) => Err(ProxvmError::malformed(
                key,
                format!("expected an integer, found {}", value_type(other)),
            )),
        }
    }

    fn get_string(&self, key: &str) -> Result<&str> {
        self.get_optional_string(key)?
            .ok_or_else(|| ProxvmError::malformed(key, "missing"))
    }

    fn get_optional_string(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ProxvmError::malformed(
                key,
                format!("expected a string, found {}", value_type(other)),
            )),
        }
    }
}

/// Text form of a configuration value as it appears in a config file.
pub(crate) fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(true) => Cow::Borrowed("1"),
        Value::Bool(false) => Cow::Borrowed("0"),
        other => Cow::Owned(other.to_string()),
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The live configuration of one VM.
///
/// Construction normalizes the map so that `lock` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct VmConfig {
    kind: VmKind,
    data: ConfigMap,
}

impl VmConfig {
    pub fn new(kind: VmKind, mut data: ConfigMap) -> Self {
        data.entry(LOCK_KEY.to_string())
            .or_insert_with(|| Value::String(String::new()));
        Self { kind, data }
    }

    pub fn kind(&self) -> VmKind {
        self.kind
    }

    /// The normalized map.
    pub fn data(&self) -> &ConfigMap {
        &self.data
    }

    pub fn into_data(self) -> ConfigMap {
        self.data
    }

    /// Number of CPU cores.
    pub fn cores(&self) -> Result<u32> {
        let cores = self.data.get_int("cores")?;
        u32::try_from(cores)
            .map_err(|_| ProxvmError::malformed("cores", format!("{} is out of range", cores)))
    }

    /// Memory size in MiB.
    pub fn memory(&self) -> Result<u64> {
        let memory = self.data.get_int("memory")?;
        u64::try_from(memory)
            .map_err(|_| ProxvmError::malformed("memory", format!("{} is out of range", memory)))
    }

    /// Guest operating system type (`l26`, `win11`, `debian`, ...).
    pub fn os_type(&self) -> Result<&str> {
        self.data.get_string("ostype")
    }

    pub fn description(&self) -> Option<&str> {
        self.data.get("description").and_then(Value::as_str)
    }

    /// Lock reason, empty when unlocked.
    pub fn lock(&self) -> &str {
        self.data.get(LOCK_KEY).and_then(Value::as_str).unwrap_or("")
    }

    pub fn is_locked(&self) -> bool {
        !self.lock().trim().is_empty()
    }

    /// Disks attached to the VM, recomputed on every call.
    pub fn disks(&self) -> Vec<DiskDescriptor> {
        extract_disks(&self.data, self.kind)
    }

    /// Render the live configuration without a section header.
    pub fn render(&self) -> String {
        render_config(&self.data, None)
    }

    /// Render the live configuration followed by each snapshot section.
    pub fn all_configs(&self, snapshots: &[SnapshotConfig]) -> String {
        aggregate_all_configs(&self.data, snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ConfigMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lock_is_always_present() {
        let config = VmConfig::new(VmKind::Qemu, map(json!({ "cores": 2 })));
        assert_eq!(config.data().get(LOCK_KEY), Some(&json!("")));
        assert_eq!(config.lock(), "");
        assert!(!config.is_locked());

        let locked = VmConfig::new(VmKind::Qemu, map(json!({ "lock": "backup" })));
        assert_eq!(locked.lock(), "backup");
        assert!(locked.is_locked());
    }

    #[test]
    fn test_typed_accessors() {
        let config = VmConfig::new(
            VmKind::Qemu,
            map(json!({ "cores": 4, "memory": "2048", "ostype": "l26" })),
        );
        assert_eq!(config.cores().unwrap(), 4);
        assert_eq!(config.memory().unwrap(), 2048);
        assert_eq!(config.os_type().unwrap(), "l26");
        assert_eq!(config.description(), None);
    }

    #[test]
    fn test_shape_mismatch_is_malformed() {
        let data = map(json!({ "cores": "many", "ostype": 26, "memory": -1, "net0": null }));

        assert!(matches!(
            data.get_int("cores"),
            Err(ProxvmError::MalformedConfig { ref key, .. }) if key == "cores"
        ));
        assert!(matches!(data.get_string("ostype"), Err(ProxvmError::MalformedConfig { .. })));
        assert!(matches!(data.get_int("sockets"), Err(ProxvmError::MalformedConfig { .. })));
        assert_eq!(data.get_optional_string("net0").unwrap(), None);
        assert_eq!(data.get_optional_string("absent").unwrap(), None);

        let config = VmConfig::new(VmKind::Qemu, data);
        assert!(matches!(config.memory(), Err(ProxvmError::MalformedConfig { .. })));
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("a,b")), "a,b");
        assert_eq!(value_text(&json!(2048)), "2048");
        assert_eq!(value_text(&json!(true)), "1");
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!(["x", 1])), r#"["x",1]"#);
    }
}
