//! Store configuration.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "candela.db";

/// Location and pool settings of the candle database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the SQLite database file.
    pub path: PathBuf,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// How long a writer waits on a locked database.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::at(Self::default_path())
    }
}

impl StoreConfig {
    /// Creates a configuration for the database at `path`.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: 4,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Returns the default database path.
    ///
    /// Uses the platform-specific data directory:
    /// - Linux: `~/.local/share/candela/candela.db`
    /// - macOS: `~/Library/Application Support/candela/candela.db`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\candela\data\candela.db`
    ///
    /// Falls back to `~/.candela/candela.db` if the platform-specific
    /// location cannot be determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "candela")
            .map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
            .join(DATABASE_FILE)
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".candela")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.path.ends_with(DATABASE_FILE));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_at() {
        let config = StoreConfig::at("/tmp/x/candles.db");
        assert_eq!(config.path, PathBuf::from("/tmp/x/candles.db"));
    }
}
