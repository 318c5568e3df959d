//! Config file discovery, loading and saving.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::app_config::AppConfig;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StorageError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Where the config file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// `config.toml` in the platform config directory. Created on first load.
    Default(PathBuf),
    /// Path given on the command line. Never created implicitly.
    Explicit(PathBuf),
}

impl ConfigLocation {
    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Default(path) | Self::Explicit(path) => path,
        }
    }
}

/// Reads and writes the TOML config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Creates a store over the platform config directory.
    ///
    /// # Errors
    /// Returns error if the platform has no config directory.
    pub fn discover() -> Result<Self, StorageError> {
        AppConfig::default_config_dir()
            .map(Self::in_dir)
            .ok_or(StorageError::ConfigDirNotFound)
    }

    /// Creates a store over `dir`.
    #[must_use]
    pub const fn in_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the config directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves the file to use, preferring `path_override`.
    #[must_use]
    pub fn location(&self, path_override: Option<&Path>) -> ConfigLocation {
        path_override.map_or_else(
            || ConfigLocation::Default(self.dir.join(CONFIG_FILE_NAME)),
            |path| ConfigLocation::Explicit(path.to_path_buf()),
        )
    }

    /// Loads the configuration.
    ///
    /// A missing default file is written with default values; a missing
    /// explicit file is not. A file that fails to parse yields defaults and
    /// is left untouched.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, or the default file cannot
    /// be written.
    pub fn load(&self, path_override: Option<&Path>) -> Result<AppConfig, StorageError> {
        let location = self.location(path_override);
        let path = location.path();

        if !path.exists() {
            return match &location {
                ConfigLocation::Explicit(_) => {
                    warn!(path = %path.display(), "Config file not found, using defaults");
                    Ok(AppConfig::default())
                }
                ConfigLocation::Default(_) => {
                    info!(path = %path.display(), "Writing default config file");
                    let config = AppConfig::default();
                    write_toml(path, &config)?;
                    Ok(config)
                }
            };
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
            AppConfig::default()
        }))
    }

    /// Saves `config` to the resolved location and returns the path written.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(
        &self,
        config: &AppConfig,
        path_override: Option<&Path>,
    ) -> Result<PathBuf, StorageError> {
        let location = self.location(path_override);
        write_toml(location.path(), config)?;
        info!(path = %location.path().display(), "Saved config file");
        Ok(location.path().to_path_buf())
    }
}

/// Serializes `data` and replaces `path` atomically, creating parent
/// directories as needed.
fn write_toml<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), StorageError> {
    let content = toml::to_string_pretty(data)?;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_load_writes_default_file() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path().join("lazyimg"));

        let config = store.load(None).unwrap();
        assert_eq!(config.lazy.swap_delay_ms, 300);
        assert!(store.dir().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_malformed_file_yields_defaults_untouched() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path().to_path_buf());
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "invalid_toml = [").unwrap();

        let config = store.load(None).unwrap();
        assert_eq!(config.lazy.swap_delay_ms, 300);
        assert_eq!(fs::read_to_string(&path).unwrap(), "invalid_toml = [");
    }

    #[test]
    fn test_missing_explicit_file_is_not_created() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path().to_path_buf());
        let missing = dir.path().join("elsewhere.toml");

        let config = store.load(Some(&missing)).unwrap();
        assert_eq!(config.lazy.quality, None);
        assert!(!missing.exists());
    }

    #[test]
    fn test_location_prefers_override() {
        let store = ConfigStore::in_dir(PathBuf::from("/etc/lazyimg"));
        assert_eq!(
            store.location(None),
            ConfigLocation::Default(PathBuf::from("/etc/lazyimg/config.toml"))
        );
        assert_eq!(
            store.location(Some(Path::new("custom.toml"))),
            ConfigLocation::Explicit(PathBuf::from("custom.toml"))
        );
    }

    #[test]
    fn test_save_then_load_explicit_file() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path().join("unused"));
        let path = dir.path().join("nested").join("lazyimg.toml");

        let mut config = AppConfig::default();
        config.lazy.quality = Some(70);
        config.lazy.fallback = Some("img/broken.png".to_string());
        config.transform.hosts = vec!["cdn.example.com".to_string()];

        assert_eq!(store.save(&config, Some(&path)).unwrap(), path);

        let loaded = store.load(Some(&path)).unwrap();
        assert_eq!(loaded.lazy.quality, Some(70));
        assert_eq!(loaded.lazy.fallback(), Some("img/broken.png"));
        assert_eq!(loaded.transform.hosts, config.transform.hosts);
        assert!(!store.dir().exists());
    }
}
