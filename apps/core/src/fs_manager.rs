use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable that relocates the portable data tree.
pub const HOME_ENV: &str = "WELLNESS_HOME";

pub struct PortablePathManager;

impl PortablePathManager {
    /// Root of the application tree: `$WELLNESS_HOME` when set, otherwise the
    /// directory holding the executable.
    pub fn root_dir() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV) {
            if !home.trim().is_empty() {
                return PathBuf::from(home);
            }
        }

        match std::env::current_exe() {
            Ok(mut path) => {
                path.pop();
                path
            }
            Err(e) => {
                warn!("Failed to get current exe path: {}. Falling back to current_dir.", e);
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        }
    }

    /// Main data directory (./data).
    pub fn data_dir() -> PathBuf {
        Self::root_dir().join("data")
    }

    /// Database directory (./data/db).
    pub fn db_dir() -> PathBuf {
        Self::data_dir().join("db")
    }

    /// SQLite URL of the default database file.
    pub fn default_database_url() -> String {
        let db_path = Self::db_dir().join("wellness.sqlite");
        format!("sqlite://{}", db_path.to_string_lossy())
    }

    /// Creates the data and db directories if they don't exist.
    pub fn init() -> Result<(), std::io::Error> {
        for dir in [Self::data_dir(), Self::db_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_override() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let home = dir.path().to_string_lossy().to_string();

        temp_env::with_var(HOME_ENV, Some(home.as_str()), || {
            assert_eq!(PortablePathManager::root_dir(), dir.path());
            assert_eq!(PortablePathManager::db_dir(), dir.path().join("data").join("db"));
            assert!(PortablePathManager::default_database_url().ends_with("wellness.sqlite"));

            PortablePathManager::init().expect("init should create directories");
            assert!(PortablePathManager::db_dir().is_dir());
        });
    }
}
