//! `flowstore join` - per-node directory → snapshot file.

use crate::config::{StoreConfig, StorePaths};
use crate::error::{Error, Result};
use crate::sync::{dir, file};

/// Join the per-node files back into the whole-collection snapshot.
pub fn execute(config: &StoreConfig, json: bool) -> Result<()> {
    let paths = StorePaths::resolve(config)?;

    let records = dir::read_records(&paths.flow_dir).ok_or_else(|| {
        Error::Other(format!(
            "no readable flow files in {}",
            paths.flow_dir.display()
        ))
    })?;

    let data = if paths.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    file::write_file(&paths.flows, &data, Some(&paths.flows_backup))?;

    if json {
        let output = serde_json::json!({
            "success": true,
            "nodes": records.len(),
            "flows": paths.flows.display().to_string(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Joined {} nodes into {}",
            records.len(),
            paths.flows.display()
        );
    }
    Ok(())
}
