//! Point-in-time snapshots of live browser databases
//!
//! A running browser holds locks on its databases, so queries never run against
//! the original file. The file is copied to a uniquely named temporary path and
//! the copy is deleted when the [`Snapshot`] goes out of scope, on every exit path.

use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ExtractionError, Result};

/// SQLite files that can appear next to an open snapshot
const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Temporary copy of a database file, removed on drop
#[derive(Debug)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Copy `source` into `temp_dir` under a fresh random name
    pub fn create(source: &Path, temp_dir: &Path) -> Result<Self> {
        let path = temp_dir.join(format!("browser_artifacts_{}.db", uuid::Uuid::new_v4()));

        debug!("Creating snapshot of {:?} at {:?}", source, path);
        if let Err(source_err) = fs::copy(source, &path) {
            // A partial copy may have been left behind
            let _ = fs::remove_file(&path);
            return Err(ExtractionError::CopyFailed {
                path: source.to_path_buf(),
                source: source_err,
            });
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the snapshot for SELECT-only access
    ///
    /// The connection must be dropped before the snapshot.
    pub fn open(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(conn)
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        release(&self.path);
    }
}

/// Best-effort removal of a snapshot and its SQLite sidecar files
fn release(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove snapshot {:?}: {}", path, e);
    } else {
        debug!("Removed snapshot {:?}", path);
    }

    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        let sidecar = PathBuf::from(sidecar);
        if sidecar.exists() {
            if let Err(e) = fs::remove_file(&sidecar) {
                warn!("Failed to remove snapshot sidecar {:?}: {}", sidecar, e);
            }
        }
    }
}
