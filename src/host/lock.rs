//! Exclusive lock on a data directory
//!
//! A `.lock` file created with `create_new` marks the directory as held.
//! The file carries the holder's pid and is removed when the guard drops.
//! A lock left behind by a killed process has to be removed by hand.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use super::errors::{HostError, HostResult};

/// Lock file name inside the data directory
pub const LOCK_FILE_NAME: &str = ".lock";

const RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Held lock on a data directory. Released on drop.
#[derive(Debug)]
pub struct DataDirLock {
    path: PathBuf,
}

impl DataDirLock {
    /// Take the lock, waiting up to `timeout` for the current holder.
    ///
    /// # Errors
    ///
    /// - `Locked` if the lock is still held when `timeout` expires
    /// - `Persistence` if the lock file cannot be created
    pub fn acquire(data_dir: &Path, timeout: Duration) -> HostResult<Self> {
        let path = data_dir.join(LOCK_FILE_NAME);
        let deadline = Instant::now() + timeout;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // pid is informational; a failed write still holds the lock
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(HostError::locked(path.display().to_string()));
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(HostError::persistence(format!(
                        "failed to create lock {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
