//! Command implementations.

pub mod completions;
pub mod join;
pub mod split;
pub mod status;

use serde_json::Value;

use crate::config::StorePaths;
use crate::model::Record;
use crate::sync::file;

/// Read the flow snapshot (or its backup) as a record collection.
/// `None` when no usable snapshot exists.
fn snapshot_records(paths: &StorePaths) -> Option<Vec<Record>> {
    match file::read_json_file(&paths.flows, &paths.flows_backup, "flow")? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(Record::from_map(map)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}
