//! ExecutionTarget trait definition

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raised when a target operation is cancelled by the host runtime.
///
/// Implementations return it wrapped in `anyhow::Error`; callers detect it
/// with `downcast_ref::<Interrupted>()` and propagate it instead of treating
/// it as an ordinary I/O failure.
#[derive(Debug, Error)]
#[error("operation interrupted: {0}")]
pub struct Interrupted(pub String);

/// Type of a directory entry on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A directory entry returned by `list_directories`
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub entry_type: EntryType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }
}

/// The node a job executes on.
///
/// Every probe and filesystem mutation made while acquiring the bridge goes
/// through this trait, so the same planning and install code runs whether the
/// job executes in-process or on a remote agent. Operations may block for an
/// unbounded time and carry no internal timeout.
pub trait ExecutionTarget: Send + Sync {
    /// Whether operations are dispatched to another node
    fn is_remote(&self) -> bool;

    /// Raw operating system identifier reported by the target
    fn os_name(&self) -> Result<String>;

    /// Raw CPU architecture identifier reported by the target
    fn os_arch(&self) -> Result<String>;

    /// Home directory of the user running jobs on the target
    fn home_dir(&self) -> Result<PathBuf>;

    /// Resolve a path against the target's working directory
    fn absolutize(&self, path: &Path) -> Result<PathBuf>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create a new, empty, uniquely named file inside `dir`
    fn create_temp_file(&self, dir: &Path, prefix: &str) -> Result<PathBuf>;

    /// Open `path` for writing, truncating any existing file
    fn create_file(&self, path: &Path) -> Result<Box<dyn Write + Send>>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Immediate subdirectories of `path`
    fn list_directories(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Extract a zip archive into `dest`
    fn unzip(&self, archive: &Path, dest: &Path) -> Result<()>;
}
