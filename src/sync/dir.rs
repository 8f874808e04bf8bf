//! The directory synchronizer: one `*.flows.js` file per record.
//!
//! Writing makes the directory's file set exactly mirror the collection:
//! every record gets its encoded file, then files for renamed or removed
//! records are deleted. Reading rebuilds the ordered collection from the
//! directory, recovering the original sequence from the transient order
//! key each document carries.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use crate::codec::{self, STORAGE_EXTENSION};
use crate::error::{Error, Result};
use crate::model::Record;

/// Read every file in `dir` and rebuild the record collection.
///
/// `None` is the empty response: returned for a missing or empty
/// directory, and for any listing, IO or parse failure. A single corrupted
/// file aborts the whole read: a partial collection would be
/// indistinguishable from a listing race, so none is ever returned.
///
/// Records are sorted ascending by their order key, which is then stripped;
/// records missing the key keep their relative position after all keyed
/// records.
#[must_use]
pub fn read_records(dir: &Path) -> Option<Vec<Record>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "cannot list flow directory");
            return None;
        }
    };

    let mut records = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "cannot list flow directory");
                return None;
            }
        };
        let document = match fs::read_to_string(&path) {
            Ok(document) => document,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read flow file");
                return None;
            }
        };
        match codec::decode(&document) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid flow file");
                return None;
            }
        }
    }

    if records.is_empty() {
        return None;
    }

    // Recover the collection order written with the files; the key is
    // transient and never part of the logical record.
    records.sort_by_key(|record| record.order().unwrap_or(i64::MAX));
    for record in &mut records {
        record.take_order();
    }
    Some(records)
}

/// Write one file per record into `dir`, then delete stale flow files.
///
/// Operates on private copies; order keys `0..n` are assigned in
/// collection order before encoding. Records are processed strictly
/// sequentially, each file fully written before the next encode.
///
/// # Errors
///
/// Any encode or write failure aborts with [`Error::Storage`]; files
/// already written stay in place. After all records succeed, any
/// `*.flows.js` file not belonging to the collection is deleted; a failure
/// there is the distinct [`Error::Cleanup`], with the records themselves
/// already durable.
pub fn write_records(dir: &Path, records: &[Record]) -> Result<()> {
    let storage_err = |message: String| Error::Storage {
        dir: dir.to_path_buf(),
        message,
    };

    fs::create_dir_all(dir).map_err(|e| storage_err(e.to_string()))?;

    let mut kept: HashSet<String> = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let mut copy = record.clone();
        copy.set_order(i64::try_from(index).unwrap_or(i64::MAX));

        let encoded = codec::encode(&copy).map_err(|e| storage_err(e.to_string()))?;
        write_document(&dir.join(&encoded.file_name), &encoded.document)
            .map_err(|e| storage_err(e.to_string()))?;
        kept.insert(encoded.file_name);
    }

    remove_stale_files(dir, &kept).map_err(|e| Error::Cleanup {
        dir: dir.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_document(path: &Path, document: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(document.as_bytes())?;
    writer.flush()
}

fn remove_stale_files(dir: &Path, kept: &HashSet<String>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(STORAGE_EXTENSION) && !kept.contains(&name) {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => Record::from_map(map),
            other => panic!("expected object, got {other}"),
        }
    }

    fn sample(id: &str) -> Record {
        record(json!({"id": id, "type": "function", "func": "return msg;"}))
    }

    fn flow_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(STORAGE_EXTENSION))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_then_read_roundtrip_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let records = vec![sample("b2"), sample("a1"), sample("c3")];

        write_records(temp_dir.path(), &records).unwrap();
        let back = read_records(temp_dir.path()).unwrap();

        assert_eq!(back, records);
        // The order key was transient: it is not on the returned records.
        assert!(back.iter().all(|r| r.order().is_none()));
    }

    #[test]
    fn test_rewrite_removes_files_for_dropped_records() {
        let temp_dir = TempDir::new().unwrap();

        write_records(
            temp_dir.path(),
            &[sample("a1"), sample("b2"), sample("c3")],
        )
        .unwrap();
        assert_eq!(flow_files(temp_dir.path()).len(), 3);

        write_records(temp_dir.path(), &[sample("a1"), sample("c3")]).unwrap();
        let names = flow_files(temp_dir.path());
        assert_eq!(
            names,
            vec!["function.a1.flows.js", "function.c3.flows.js"]
        );
    }

    #[test]
    fn test_cleanup_leaves_foreign_files_alone() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "keep me").unwrap();

        write_records(temp_dir.path(), &[sample("a1")]).unwrap();

        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_read_recovers_order_from_keys() {
        let temp_dir = TempDir::new().unwrap();
        // Files written out of collection order; the embedded keys win.
        for (id, order) in [("x9", 2), ("m5", 0), ("q7", 1)] {
            let mut rec = sample(id);
            rec.set_order(order);
            let encoded = codec::encode(&rec).unwrap();
            fs::write(temp_dir.path().join(&encoded.file_name), &encoded.document).unwrap();
        }

        let back = read_records(temp_dir.path()).unwrap();
        let ids: Vec<&str> = back.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec!["m5", "q7", "x9"]);
    }

    #[test]
    fn test_read_missing_directory_is_empty_response() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(read_records(&temp_dir.path().join("absent")), None);
    }

    #[test]
    fn test_read_empty_directory_is_empty_response() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(read_records(temp_dir.path()), None);
    }

    #[test]
    fn test_one_invalid_file_aborts_the_whole_read() {
        let temp_dir = TempDir::new().unwrap();
        write_records(temp_dir.path(), &[sample("a1"), sample("b2")]).unwrap();
        fs::write(
            temp_dir.path().join("function.zz.flows.js"),
            "this is not a flow document",
        )
        .unwrap();

        // Never a partial collection.
        assert_eq!(read_records(temp_dir.path()), None);
    }

    #[test]
    fn test_encode_failure_aborts_write_and_keeps_earlier_files() {
        let temp_dir = TempDir::new().unwrap();
        let bad = record(json!({"type": "function"}));

        let err = write_records(temp_dir.path(), &[sample("a1"), bad]).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        // No rollback: the first record's file is still there.
        assert_eq!(flow_files(temp_dir.path()), vec!["function.a1.flows.js"]);
    }
}
