//! Reading and writing the settings file.

use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::settings::Config;

/// Directory name under the user's config directory.
pub const CONFIG_DIR_NAME: &str = "darp";

/// Settings file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// `$HOME/.config/darp/config.json`, or `None` when there is no home directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}

impl Config {
    /// Load settings from `path`, or from [`default_config_path`].
    ///
    /// A missing file is created with the defaults. Without a path and
    /// without a home directory the defaults are returned and nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the default file cannot be created.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    debug!("no home directory, using default settings");
                    return Ok(Self::default());
                }
            },
        };

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded settings");
                serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(&path)?;
                info!(path = %path.display(), "created default settings file");
                Ok(config)
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Write settings to `path` as pretty-printed JSON.
    ///
    /// The parent directory is created with mode 0755 and the file written
    /// with mode 0644.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(DIR_MODE)
                .create(parent)
                .map_err(write_err)?;
        }

        let mut json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        json.push('\n');

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(FILE_MODE)
            .open(path)
            .map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.set_permissions(fs::Permissions::from_mode(FILE_MODE))
            .map_err(write_err)?;

        debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LogLevel;
    use tempfile::{NamedTempFile, TempDir};

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("failed to write temp file");
        file
    }

    #[test]
    fn test_default_config_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(".config/darp/config.json"));
        }
    }

    #[test]
    fn test_load_existing_file() {
        let file = create_temp_config(r#"{"network": {"mtu": 1420, "dns": ["9.9.9.9"]}}"#);
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.network.mtu, 1420);
        assert_eq!(config.network.dns, vec!["9.9.9.9"]);
        assert_eq!(config.network.interface, "warp0");
    }

    #[test]
    fn test_load_missing_file_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("darp").join("config.json");

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let file_mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o644);

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_log_level_any_case() {
        let file = create_temp_config(r#"{"logging": {"level": "WARN"}}"#);
        assert_eq!(Config::load(Some(file.path())).unwrap().logging.level, LogLevel::Warn);

        let file = create_temp_config(r#"{"logging": {"level": "warning"}}"#);
        assert_eq!(Config::load(Some(file.path())).unwrap().logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_load_invalid_json() {
        let file = create_temp_config("{ not json");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_unreadable_path() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a file.
        let err = Config::load(Some(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_save_pretty_two_space_indent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \"cloudflare\": {\n    \"warp_endpoint\""));
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn test_save_overwrites_and_resets_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "old contents that are much longer than nothing").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        let mut config = Config::default();
        config.network.interface = "wg1".into();
        config.save(&path).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap().network.interface, "wg1");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
