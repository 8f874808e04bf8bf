//! Low-level file collaborators: atomic writes and backup-aware reads.
//!
//! The whole-collection snapshot and the credentials file go through
//! [`write_file`], which never leaves a half-written primary behind: the
//! content lands in a temp sibling, is fsynced, then atomically renamed
//! over the target. An optional backup copy of the previous content is
//! taken first.
//!
//! [`read_json_file`] is the forgiving counterpart: a missing file, an
//! empty file with no usable backup, or unparsable content all collapse to
//! `None` so a corrupted store degrades to the caller's empty response
//! instead of crashing the host.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;

/// Write `content` to `path` atomically.
///
/// If `backup` is given and `path` already exists, the current content is
/// copied to the backup path first. The new content is then written to a
/// temp sibling, flushed and fsynced, and renamed over `path`.
///
/// # Errors
///
/// Returns an error if any file operation fails; `path` keeps its previous
/// content in that case.
pub fn write_file(path: &Path, content: &str, backup: Option<&Path>) -> Result<()> {
    if let Some(backup_path) = backup {
        if path.exists() {
            fs::copy(path, backup_path)?;
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => path.with_file_name("flowstore.tmp"),
    };

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Read a JSON value from `path`, falling back to `backup_path` and
/// finally to `None`.
///
/// - missing file: `None` (logged at info level for the flow file, since
///   that just means a fresh store);
/// - empty primary with a non-empty backup: the backup is restored over
///   the primary and the read retried;
/// - empty primary with an empty or missing backup: `None`;
/// - unparsable content: `None` with a warning.
///
/// A UTF-8 BOM before the JSON is tolerated.
#[must_use]
pub fn read_json_file(path: &Path, backup_path: &Path, kind: &str) -> Option<Value> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => {
            if kind == "flow" {
                info!(path = %path.display(), "no flow file yet");
            }
            return None;
        }
    };

    if data.is_empty() {
        warn!(path = %path.display(), kind, "file is empty");
        let backup_len = fs::metadata(backup_path).map(|m| m.len()).unwrap_or(0);
        if backup_len == 0 {
            return None;
        }
        warn!(backup = %backup_path.display(), kind, "restoring from backup");
        if let Err(err) = fs::copy(backup_path, path) {
            warn!(kind, error = %err, "restoring backup failed");
            return None;
        }
        return read_json_file(path, backup_path, kind);
    }

    let data = data.strip_prefix('\u{feff}').unwrap_or(&data);
    match serde_json::from_str(data) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), kind, error = %err, "invalid file");
            None
        }
    }
}
