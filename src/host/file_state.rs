//! Durable world state for the local host
//!
//! The committed map is kept as one JSON document:
//!
//! ```text
//! {"format_version":1,"entries":{"<key>":"<base64 value>", ...}}
//! ```
//!
//! Saves write a uniquely named sibling temp file, fsync it, then rename it
//! over the target, so a crash leaves either the old or the new snapshot.
//! Callers that load, modify and save hold a `DataDirLock` around the cycle.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{HostError, HostResult};
use super::world_state::WorldState;

/// Current snapshot format
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    format_version: u32,
    entries: BTreeMap<String, String>,
}

/// File-backed storage for a `WorldState`.
#[derive(Debug, Clone)]
pub struct FileWorldState {
    path: PathBuf,
}

impl FileWorldState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if a snapshot has been written
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the committed state. A missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Persistence` if the file cannot be read, is not a
    /// valid snapshot, or has an unsupported format version.
    pub fn load(&self) -> HostResult<WorldState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WorldState::new()),
            Err(e) => {
                return Err(HostError::persistence(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            HostError::persistence(format!("invalid snapshot {}: {}", self.path.display(), e))
        })?;

        if snapshot.format_version != FORMAT_VERSION {
            return Err(HostError::persistence(format!(
                "unsupported snapshot format version {} (expected {})",
                snapshot.format_version, FORMAT_VERSION
            )));
        }

        let mut entries = BTreeMap::new();
        for (key, encoded) in snapshot.entries {
            let value = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                HostError::persistence(format!("invalid value encoding for key {:?}: {}", key, e))
            })?;
            entries.insert(key, value);
        }

        Ok(WorldState::from_entries(entries))
    }

    /// Atomically replaces the snapshot with `state`.
    pub fn save(&self, state: &WorldState) -> HostResult<()> {
        let snapshot = Snapshot {
            format_version: FORMAT_VERSION,
            entries: state
                .entries()
                .iter()
                .map(|(k, v)| (k.clone(), STANDARD.encode(v)))
                .collect(),
        };

        let body = serde_json::to_vec(&snapshot)
            .map_err(|e| HostError::persistence(format!("failed to encode snapshot: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    HostError::persistence(format!(
                        "failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let tmp_path = self.tmp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&body)?;
            // fsync before rename so the rename never exposes a partial file
            file.sync_all()
        };
        write_tmp().map_err(|e| {
            HostError::persistence(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            HostError::persistence(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// `<file name>.<uuid>.tmp` next to the snapshot
    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path
            .with_file_name(format!("{}.{}.tmp", name, Uuid::new_v4().simple()))
    }
}
