//! # File I/O Module
//!
//! Handles project file operations with safety features:
//! - **Atomic saves**: Write to .tmp, verify, rename to prevent corruption
//! - **File locking**: Prevent concurrent edits on shared drives
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Projects are saved as `.bdg` files containing a JSON
//! [`ProjectDocument`](crate::project::ProjectDocument). Lock files use the
//! `.bdg.lock` extension with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bridge_core::file_io::{load_project, save_project, FileLock};
//! use bridge_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Engineer", "25-001", "Client");
//! let path = Path::new("viaduct.bdg");
//!
//! // Acquire lock before saving
//! let lock = FileLock::acquire(path, "engineer@company.com").unwrap();
//! save_project(&project, path).unwrap();
//! drop(lock);
//!
//! let loaded = load_project(path).unwrap();
//! assert_eq!(loaded.bridge, project.bridge);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{BridgeError, BridgeResult};
use crate::project::{Project, ProjectDocument, SCHEMA_VERSION};

/// Project file extension
pub const PROJECT_EXTENSION: &str = "bdg";

/// Who holds a project, as written into its `.bdg.lock` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock record for the current process.
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    fn read(lock_path: &Path) -> BridgeResult<Self> {
        let contents = read_to_string(lock_path, "read lock")?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Holder as shown to other users.
    pub fn holder(&self) -> String {
        format!("{} on {} (pid {})", self.user_id, self.machine, self.pid)
    }

    /// True when the holding process is gone or the lock is over a day old.
    pub fn is_stale(&self) -> bool {
        let local = hostname().is_some_and(|ours| ours == self.machine);
        if local && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.locked_at).num_hours() > 24
    }
}

fn hostname() -> Option<String> {
    ["HOSTNAME", "HOST", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

// Without a cheap liveness probe only the age rule applies.
#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive hold on a project file for the life of an editing session.
///
/// The OS lock (fs2) lives on the `.lock` sibling, which also records the
/// [`LockInfo`]. Dropping the guard deletes the lock file.
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Take the lock on `path`.
    ///
    /// Fails with [`BridgeError::FileLocked`] while a live process holds it;
    /// a stale lock is taken over with a warning.
    ///
    /// ```rust,no_run
    /// use bridge_core::file_io::FileLock;
    /// use std::path::Path;
    ///
    /// let lock = FileLock::acquire(Path::new("viaduct.bdg"), "user@email.com")?;
    /// assert!(lock.covers(Path::new("viaduct.bdg")));
    /// # Ok::<(), bridge_core::errors::BridgeError>(())
    /// ```
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> BridgeResult<Self> {
        let lock_path = lock_path_for(path);
        let locked = |holder: String, at: String| BridgeError::file_locked(path.display().to_string(), holder, at);

        if let Ok(existing) = LockInfo::read(&lock_path) {
            if !existing.is_stale() {
                return Err(locked(existing.holder(), existing.locked_at.to_rfc3339()));
            }
            warn!(path = %path.display(), holder = %existing.holder(), "taking over stale lock");
        }

        let file_error = |op: &str, e: std::io::Error| BridgeError::file_error(op, lock_path.display().to_string(), e.to_string());
        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| file_error("open lock", e))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| locked("another process".to_string(), "unknown".to_string()))?;

        let info = LockInfo::new(user_id);
        lock_file.set_len(0).map_err(|e| file_error("write lock", e))?;
        lock_file
            .write_all(serde_json::to_string_pretty(&info)?.as_bytes())
            .map_err(|e| file_error("write lock", e))?;
        lock_file.sync_all().map_err(|e| file_error("sync lock", e))?;
        debug!(path = %path.display(), user = %info.user_id, "project locked");

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// True if this guard holds `path`.
    pub fn covers(&self, path: &Path) -> bool {
        self.project_path == path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        debug!(path = %self.project_path.display(), "project unlocked");
    }
}

fn lock_path_for(project_path: &Path) -> PathBuf {
    let mut name = project_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn read_to_string(path: &Path, operation: &str) -> BridgeResult<String> {
    let mut file =
        File::open(path).map_err(|e| BridgeError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| BridgeError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Save a project with atomic write semantics.
///
/// The document is written to a `.tmp` sibling, synced, then renamed over
/// `path`, so an interrupted save never leaves a truncated project.
pub fn save_project(project: &Project, path: &Path) -> BridgeResult<()> {
    let document = project.to_document()?;
    let json = serde_json::to_string_pretty(&document)?;

    let tmp_path = path.with_extension(format!("{}.tmp", PROJECT_EXTENSION));
    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| BridgeError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| BridgeError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| BridgeError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BridgeError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(
        path = %path.display(),
        piers = project.bridge.pier_count(),
        groups = project.bridge.group_count(),
        "project saved"
    );
    Ok(())
}

/// Load a project file.
///
/// Fails with [`BridgeError::VersionMismatch`] for an incompatible schema,
/// [`BridgeError::SerializationError`] for malformed JSON, and with the
/// bridge loader's errors when the stored bridge cannot be repaired.
pub fn load_project(path: &Path) -> BridgeResult<Project> {
    let contents = read_to_string(path, "open")?;
    let document: ProjectDocument = serde_json::from_str(&contents).map_err(|e| BridgeError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;
    validate_version(&document.meta.version)?;

    let project = Project::from_document(document)?;
    info!(
        path = %path.display(),
        job = %project.meta.job_id,
        piers = project.bridge.pier_count(),
        "project loaded"
    );
    Ok(project)
}

/// Major versions must match; in 0.x a newer minor version is rejected.
fn validate_version(file_version: &str) -> BridgeResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);
    let mismatch = || BridgeError::version_mismatch(file_version, SCHEMA_VERSION);

    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}
