//! Application configuration loaded from `config.toml` and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::storage::FileKeyValueStore;

/// Directory under `~/.config` holding `config.toml`.
pub const CONFIG_DIR: &str = "gameshelf";

/// Prefix for environment overrides, e.g. `GAMESHELF_DATA_DIR`.
pub const ENV_PREFIX: &str = "GAMESHELF";

const DEFAULT_CONFIG: &str = r#"# gameshelf configuration
#
# data_dir: directory holding the saved collection
# log_dir:  directory receiving gameshelf.log
#
# data_dir = "/path/to/data"
# log_dir = "logs"
"#;

/// Runtime settings for the library and the terminal front end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Where the collection is persisted.
    pub data_dir: PathBuf,
    /// Where log files are written.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: FileKeyValueStore::default_root(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load from the default config file, applying environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from a specific file; a missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(
            path.as_ref(),
            ::config::Environment::with_prefix(ENV_PREFIX),
        )
    }

    fn load_layered(path: &Path, environment: ::config::Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = ::config::Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().into_owned())?
            .add_source(::config::File::from(path.to_path_buf()).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

/// Location of the user's `config.toml`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join("config.toml")
}

/// Write a commented default config file on first run.
pub fn ensure_default_config() -> Result<()> {
    ensure_config_at(config_path())
}

fn ensure_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.data_dir, FileKeyValueStore::default_root());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_dir = \"/tmp/shelf\"\n")?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shelf"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        Ok(())
    }

    #[test]
    fn environment_overrides_file_values() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_dir = \"from-file\"\ndata_dir = \"/tmp/shelf\"\n")?;
        let vars: ::config::Map<String, String> =
            [("GAMESHELF_LOG_DIR".to_string(), "from-env".to_string())]
                .into_iter()
                .collect();
        let environment = ::config::Environment::with_prefix(ENV_PREFIX).source(Some(vars));

        let config = AppConfig::load_layered(&path, environment)?;
        assert_eq!(config.log_dir, PathBuf::from("from-env"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shelf"));
        Ok(())
    }

    #[test]
    fn writing_the_default_file_keeps_loaded_values() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gameshelf").join("config.toml");
        let before = AppConfig::load_from(&path)?;
        ensure_config_at(&path)?;
        assert_eq!(AppConfig::load_from(&path)?, before);
        Ok(())
    }

    #[test]
    fn default_file_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        ensure_config_at(&path)?;
        assert!(path.exists());

        fs::write(&path, "log_dir = \"custom\"\n")?;
        ensure_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "log_dir = \"custom\"\n");

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.log_dir, PathBuf::from("custom"));
        Ok(())
    }
}
