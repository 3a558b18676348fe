// Filesystem locations used by issuepress.
// Only the log file lives on disk; query results are kept in memory.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::Result;

/// Log file name inside the cache directory.
pub const LOG_FILE: &str = "issuepress.log";

/// Get the base cache directory (~/.cache/issuepress on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "issuepress").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the log file.
pub fn log_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LOG_FILE))
}

/// Open a log file for appending, creating its directory first.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}
