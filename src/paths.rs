//! Path utilities for determining data storage locations.
//!
//! All board data lives in one directory, `~/.daybook/` by default:
//! the `SQLite` database, the config file and the optional operation journal.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// The base directory name for daybook data.
const DATA_DIR_NAME: &str = ".daybook";

/// The database filename.
pub const DATABASE_FILENAME: &str = "daybook.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// The operation journal filename.
pub const JOURNAL_FILENAME: &str = "operations.jsonl";

/// Get the default data directory.
///
/// Returns `~/.daybook/` or `None` if the home directory cannot be
/// determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Resolve the data directory, preferring an explicit override.
///
/// # Errors
///
/// Returns [`Error::NoDataDir`] if no override is given and the home
/// directory cannot be determined.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => data_dir().ok_or(Error::NoDataDir),
    }
}

/// Get the database path inside a data directory.
#[must_use]
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILENAME)
}

/// Get the config path inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILENAME)
}

/// Get the operation journal path inside a data directory.
#[must_use]
pub fn journal_path(data_dir: &Path) -> PathBuf {
    data_dir.join(JOURNAL_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_returns_home_based_path() {
        if let Some(home) = dirs::home_dir() {
            let data = data_dir().unwrap();
            assert_eq!(data, home.join(".daybook"));
        }
    }

    #[test]
    fn test_resolve_prefers_override() {
        let dir = PathBuf::from("/tmp/somewhere");
        assert_eq!(resolve_data_dir(Some(&dir)).unwrap(), dir);
    }

    #[test]
    fn test_file_paths_share_data_dir() {
        let dir = PathBuf::from("/data");
        assert_eq!(database_path(&dir), PathBuf::from("/data/daybook.sqlite3"));
        assert_eq!(config_path(&dir), PathBuf::from("/data/config.yaml"));
        assert_eq!(journal_path(&dir), PathBuf::from("/data/operations.jsonl"));
    }
}
