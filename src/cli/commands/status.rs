//! `flowstore status` - compare the per-node directory with the snapshot.
//!
//! Change detection is hash-based: two records count as equal when the
//! SHA-256 of their serialized field maps matches.

use colored::Colorize;

use crate::cli::commands::snapshot_records;
use crate::config::{StoreConfig, StorePaths};
use crate::error::Result;
use crate::model::Record;
use crate::sync::{dir, hash};

struct Diff {
    added: Vec<String>,
    removed: Vec<String>,
    changed: Vec<String>,
    unchanged: usize,
}

impl Diff {
    fn in_sync(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Report how the per-node directory differs from the snapshot.
pub fn execute(config: &StoreConfig, json: bool) -> Result<()> {
    let paths = StorePaths::resolve(config)?;

    let snapshot = snapshot_records(&paths).unwrap_or_default();
    let directory = dir::read_records(&paths.flow_dir).unwrap_or_default();
    let diff = diff_records(&snapshot, &directory);

    if json {
        let output = serde_json::json!({
            "in_sync": diff.in_sync(),
            "snapshot": paths.flows.display().to_string(),
            "dir": paths.flow_dir.display().to_string(),
            "added": diff.added,
            "removed": diff.removed,
            "changed": diff.changed,
            "unchanged": diff.unchanged,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Snapshot:  {}", paths.flows.display());
    println!("Directory: {}", paths.flow_dir.display());
    println!();

    if diff.in_sync() {
        if diff.unchanged == 0 {
            println!("Nothing stored yet.");
        } else {
            println!(
                "{} ({} nodes)",
                "In sync".green(),
                diff.unchanged
            );
        }
        return Ok(());
    }

    for id in &diff.added {
        println!("  {} {id}", "+".green());
    }
    for id in &diff.removed {
        println!("  {} {id}", "-".red());
    }
    for id in &diff.changed {
        println!("  {} {id}", "~".yellow());
    }
    println!();
    println!(
        "{} added, {} removed, {} changed, {} unchanged (directory vs snapshot)",
        diff.added.len(),
        diff.removed.len(),
        diff.changed.len(),
        diff.unchanged
    );
    Ok(())
}

fn diff_records(snapshot: &[Record], directory: &[Record]) -> Diff {
    let snapshot_hashes: Vec<(&str, String)> = keyed_hashes(snapshot);
    let directory_hashes: Vec<(&str, String)> = keyed_hashes(directory);

    let mut diff = Diff {
        added: Vec::new(),
        removed: Vec::new(),
        changed: Vec::new(),
        unchanged: 0,
    };

    for (id, dir_hash) in &directory_hashes {
        match snapshot_hashes.iter().find(|(sid, _)| sid == id) {
            None => diff.added.push((*id).to_string()),
            Some((_, snap_hash)) if hash::has_changed(dir_hash, Some(snap_hash)) => {
                diff.changed.push((*id).to_string());
            }
            Some(_) => diff.unchanged += 1,
        }
    }
    for (id, _) in &snapshot_hashes {
        if !directory_hashes.iter().any(|(did, _)| did == id) {
            diff.removed.push((*id).to_string());
        }
    }
    diff
}

fn keyed_hashes(records: &[Record]) -> Vec<(&str, String)> {
    records
        .iter()
        .filter_map(|record| record.id().map(|id| (id, hash::content_hash(record))))
        .collect()
}
