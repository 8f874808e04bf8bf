//! `flowstore split` - snapshot file → per-node directory.

use crate::cli::commands::snapshot_records;
use crate::config::{StoreConfig, StorePaths};
use crate::error::{Error, Result};
use crate::sync::dir;

/// Split the flow snapshot into one `*.flows.js` file per node.
pub fn execute(config: &StoreConfig, json: bool) -> Result<()> {
    let paths = StorePaths::resolve(config)?;

    let records = snapshot_records(&paths).ok_or_else(|| {
        Error::Other(format!(
            "no flow snapshot found at {}",
            paths.flows.display()
        ))
    })?;

    dir::write_records(&paths.flow_dir, &records)?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "nodes": records.len(),
            "dir": paths.flow_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Split {} nodes into {}",
            records.len(),
            paths.flow_dir.display()
        );
    }
    Ok(())
}
