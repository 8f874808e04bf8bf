//! The store facade: flows and credentials against a resolved layout.
//!
//! `FlowStore` owns nothing but the frozen [`StorePaths`]; all state lives
//! on disk. Reads prefer the per-record directory and fall back to the
//! whole-collection snapshot; writes refresh the snapshot first so a crash
//! mid-synchronization still leaves a recent consistent copy, then bring
//! the directory in line.

use serde_json::Value;
use tracing::info;

use crate::config::{StoreConfig, StorePaths};
use crate::error::Result;
use crate::model::Record;
use crate::sync::{dir, file};

/// Handle to one flow store on disk.
#[derive(Debug)]
pub struct FlowStore {
    paths: StorePaths,
}

impl FlowStore {
    /// Resolve the layout and open the store.
    ///
    /// # Errors
    ///
    /// Fails when the layout cannot be resolved (see
    /// [`StorePaths::resolve`]).
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            paths: StorePaths::resolve(config)?,
        })
    }

    /// The resolved file layout.
    #[must_use]
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Load the flow collection.
    ///
    /// The per-record directory is the primary source. When it yields
    /// nothing (missing, empty, or any file corrupted), the snapshot file
    /// (or its backup) is used instead; when that fails too, the
    /// collection is empty.
    #[must_use]
    pub fn flows(&self) -> Vec<Record> {
        if let Some(records) = dir::read_records(&self.paths.flow_dir) {
            return records;
        }

        match file::read_json_file(&self.paths.flows, &self.paths.flows_backup, "flow") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(Record::from_map(map)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Persist the flow collection.
    ///
    /// Writes the whole-collection snapshot atomically (with backup)
    /// before synchronizing the per-record directory. A no-op when the
    /// store is read-only.
    ///
    /// # Errors
    ///
    /// Surfaces snapshot write failures and the synchronizer's
    /// [`Storage`](crate::Error::Storage) /
    /// [`Cleanup`](crate::Error::Cleanup) errors.
    pub fn save_flows(&self, records: &[Record]) -> Result<()> {
        if self.paths.read_only {
            info!("store is read-only, not saving flows");
            return Ok(());
        }

        if self.paths.snapshot {
            let data = if self.paths.pretty {
                serde_json::to_string_pretty(records)?
            } else {
                serde_json::to_string(records)?
            };
            file::write_file(&self.paths.flows, &data, Some(&self.paths.flows_backup))?;
        }

        dir::write_records(&self.paths.flow_dir, records)
    }

    /// Load the credentials object; `{}` when absent or unreadable.
    #[must_use]
    pub fn credentials(&self) -> Value {
        file::read_json_file(
            &self.paths.credentials,
            &self.paths.credentials_backup,
            "credentials",
        )
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    /// Persist the credentials object. A no-op when the store is
    /// read-only.
    ///
    /// # Errors
    ///
    /// Surfaces serialization and file write failures.
    pub fn save_credentials(&self, credentials: &Value) -> Result<()> {
        if self.paths.read_only {
            info!("store is read-only, not saving credentials");
            return Ok(());
        }

        let data = if self.paths.pretty {
            serde_json::to_string_pretty(credentials)?
        } else {
            serde_json::to_string(credentials)?
        };
        file::write_file(
            &self.paths.credentials,
            &data,
            Some(&self.paths.credentials_backup),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from_map(map),
            other => panic!("expected object, got {other}"),
        }
    }

    fn store_in(dir: &Path) -> FlowStore {
        FlowStore::open(&StoreConfig {
            user_dir: Some(dir.to_path_buf()),
            ..StoreConfig::default()
        })
        .unwrap()
    }

    fn sample_flow() -> Vec<Record> {
        vec![
            record(json!({"id": "a1", "type": "inject", "wires": [["b2"]]})),
            record(json!({"id": "b2", "type": "function", "func": "return msg;"})),
        ]
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(temp_dir.path());
        let records = sample_flow();

        store.save_flows(&records).unwrap();
        assert_eq!(store.flows(), records);
    }

    #[test]
    fn test_save_writes_snapshot_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(temp_dir.path());

        store.save_flows(&sample_flow()).unwrap();

        let snapshot = fs::read_to_string(temp_dir.path().join("flows.json")).unwrap();
        let parsed: Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);

        assert!(temp_dir
            .path()
            .join("flows_js")
            .join("inject.a1.flows.js")
            .exists());
        assert!(temp_dir
            .path()
            .join("flows_js")
            .join("function.b2.flows.js")
            .exists());
    }

    #[test]
    fn test_flows_falls_back_to_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(temp_dir.path());

        // Directory is empty, but a snapshot exists (e.g. from a store
        // that never used the per-record layout).
        fs::write(
            temp_dir.path().join("flows.json"),
            r#"[{"id": "a1", "type": "inject"}]"#,
        )
        .unwrap();

        let flows = store.flows();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].id(), Some("a1"));
    }

    #[test]
    fn test_flows_empty_when_nothing_stored() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(temp_dir.path());
        assert!(store.flows().is_empty());
    }

    #[test]
    fn test_corrupted_directory_falls_back_not_partial() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(temp_dir.path());

        store.save_flows(&sample_flow()).unwrap();
        fs::write(
            temp_dir.path().join("flows_js").join("function.zz.flows.js"),
            "garbage",
        )
        .unwrap();

        // The directory read aborts wholesale; the snapshot still has
        // the full collection.
        let flows = store.flows();
        assert_eq!(flows.len(), 2);
    }

    #[test]
    fn test_read_only_store_saves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FlowStore::open(&StoreConfig {
            user_dir: Some(temp_dir.path().to_path_buf()),
            read_only: true,
            ..StoreConfig::default()
        })
        .unwrap();

        store.save_flows(&sample_flow()).unwrap();
        store.save_credentials(&json!({"a1": {"token": "x"}})).unwrap();

        assert!(!temp_dir.path().join("flows.json").exists());
        assert!(!temp_dir.path().join("flows_cred.json").exists());
        assert_eq!(flow_file_count(&temp_dir.path().join("flows_js")), 0);
    }

    #[test]
    fn test_snapshot_disabled_still_syncs_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FlowStore::open(&StoreConfig {
            user_dir: Some(temp_dir.path().to_path_buf()),
            snapshot: false,
            ..StoreConfig::default()
        })
        .unwrap();

        store.save_flows(&sample_flow()).unwrap();

        assert!(!temp_dir.path().join("flows.json").exists());
        assert_eq!(flow_file_count(&temp_dir.path().join("flows_js")), 2);
    }

    #[test]
    fn test_credentials_roundtrip_and_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(temp_dir.path());

        assert_eq!(store.credentials(), json!({}));

        let creds = json!({"b2": {"user": "u", "password": "p"}});
        store.save_credentials(&creds).unwrap();
        assert_eq!(store.credentials(), creds);
    }

    fn flow_file_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .map(|entries| entries.filter_map(std::result::Result::ok).count())
            .unwrap_or(0)
    }
}
