//! Store configuration and path resolution.
//!
//! [`StoreConfig`] carries the caller's inputs; [`StorePaths::resolve`]
//! turns them into the concrete file layout exactly once. The result is
//! frozen: nothing mutates a `StorePaths` after resolution, every
//! component borrows it for the lifetime of a call.
//!
//! Layout, for a flow file `flows.json` under the user directory:
//!
//! ```text
//! <user_dir>/flows.json            whole-collection snapshot
//! <user_dir>/.flows.json.backup    snapshot backup
//! <user_dir>/flows_cred.json       credentials
//! <user_dir>/.flows_cred.json.backup
//! <user_dir>/flows_js/             one *.flows.js file per record
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Suffix appended to the flow file stem to name the per-record directory.
const FLOW_DIR_SUFFIX: &str = "_js";

/// Default flow file name when none is configured.
const DEFAULT_FLOW_FILE: &str = "flows.json";

/// Caller-supplied configuration inputs.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory for all store files. `~/.flowstore` when `None`.
    pub user_dir: Option<PathBuf>,
    /// Flow snapshot file. Absolute paths are used as-is; `./`-prefixed
    /// paths are cwd-relative; bare names resolve to the cwd if the file
    /// already exists there, else to the user directory.
    pub flow_file: Option<String>,
    /// Keep the whole-collection snapshot file on save. Turning this off
    /// leaves the per-record directory as the only representation.
    pub snapshot: bool,
    /// Per-record directory. `<flow file stem>_js` under the user
    /// directory when `None`.
    pub flow_dir: Option<PathBuf>,
    /// When set, every save call is a no-op.
    pub read_only: bool,
    /// Pretty-print the snapshot and credentials files.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            user_dir: None,
            flow_file: None,
            snapshot: true,
            flow_dir: None,
            read_only: false,
            pretty: true,
        }
    }
}

/// The resolved file layout. Constructed once by [`StorePaths::resolve`],
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub user_dir: PathBuf,
    pub flows: PathBuf,
    pub flows_backup: PathBuf,
    pub credentials: PathBuf,
    pub credentials_backup: PathBuf,
    pub flow_dir: PathBuf,
    pub snapshot: bool,
    pub read_only: bool,
    pub pretty: bool,
}

impl StorePaths {
    /// Resolve the full layout from the configuration and create the
    /// per-record directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no user directory can be determined,
    /// and an IO error when the flow directory cannot be created.
    pub fn resolve(config: &StoreConfig) -> Result<Self> {
        let user_dir = match &config.user_dir {
            Some(dir) => dir.clone(),
            None => default_user_dir()
                .ok_or_else(|| Error::Config("cannot determine a home directory".into()))?,
        };

        let flow_file = config.flow_file.as_deref().unwrap_or(DEFAULT_FLOW_FILE);
        let flows = resolve_flow_path(flow_file, &user_dir);
        let flows_backup = backup_path(&flows);

        let stem = flows
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "flows".to_string());
        let extension = flows
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let credentials = user_dir.join(format!("{stem}_cred{extension}"));
        let credentials_backup = backup_path(&credentials);

        let flow_dir = match &config.flow_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => user_dir.join(dir),
            None => user_dir.join(format!("{stem}{FLOW_DIR_SUFFIX}")),
        };
        std::fs::create_dir_all(&flow_dir)?;

        Ok(Self {
            user_dir,
            flows,
            flows_backup,
            credentials,
            credentials_backup,
            flow_dir,
            snapshot: config.snapshot,
            read_only: config.read_only,
            pretty: config.pretty,
        })
    }
}

/// `~/.flowstore`, via platform home-directory discovery.
#[must_use]
pub fn default_user_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".flowstore"))
}

/// Hidden `.<file name>.backup` sibling of `path`.
fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.backup"))
}

fn resolve_flow_path(flow_file: &str, user_dir: &Path) -> PathBuf {
    let candidate = Path::new(flow_file);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    if let Some(relative) = flow_file.strip_prefix("./") {
        if let Ok(cwd) = std::env::current_dir() {
            return cwd.join(relative);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let in_cwd = cwd.join(flow_file);
        if in_cwd.exists() {
            return in_cwd;
        }
    }
    user_dir.join(flow_file)
}
