//! Configuration management for pkglink

pub mod schema;

pub use schema::{Config, GeneralConfig, LinkConfig, PackageConfig, SdkConfig};

use crate::error::{LinkError, LinkResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project-local config file name, searched for from the working directory up
pub const LOCAL_CONFIG_NAME: &str = "pkglink.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pkglink")
            .join("config.toml")
    }

    /// Nearest `pkglink.toml` in `start` or any of its ancestors
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> LinkResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> LinkResult<Config> {
        let value = read_table(path).await?;
        parse_config(path, value)
    }

    /// Load the global configuration with `local` layered on top.
    ///
    /// Tables merge key by key; any other local value replaces the global one.
    /// Relative paths in the local file resolve against its directory.
    pub async fn load_merged(&self, local: Option<&Path>) -> LinkResult<Config> {
        let Some(local) = local else {
            return self.load().await;
        };

        let mut merged = if self.config_path.exists() {
            read_table(&self.config_path).await?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let mut overlay = read_table(local).await?;
        if let Some(base_dir) = local.parent() {
            resolve_local_paths(&mut overlay, base_dir);
        }
        merge_values(&mut merged, overlay);

        debug!("Merged local config {}", local.display());
        parse_config(local, merged)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> LinkResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            LinkError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> LinkResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LinkError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_table(path: &Path) -> LinkResult<toml::Value> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| LinkError::io(format!("reading config from {}", path.display()), e))?;

    content
        .parse()
        .map_err(|e: toml::de::Error| LinkError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn parse_config(path: &Path, value: toml::Value) -> LinkResult<Config> {
    value.try_into().map_err(|e: toml::de::Error| LinkError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Make relative `packages.*.{source,output}` and `sdk.bundle` strings in a
/// raw local table absolute against `base_dir`.
///
/// Works on the raw value so a local file may override single fields.
fn resolve_local_paths(value: &mut toml::Value, base_dir: &Path) {
    if let Some(packages) = value.get_mut("packages").and_then(toml::Value::as_table_mut) {
        for package in packages.iter_mut().map(|(_, v)| v) {
            for key in ["source", "output"] {
                if let Some(path) = package.get_mut(key) {
                    absolutize(path, base_dir);
                }
            }
        }
    }
    if let Some(bundle) = value.get_mut("sdk").and_then(|sdk| sdk.get_mut("bundle")) {
        absolutize(bundle, base_dir);
    }
}

fn absolutize(value: &mut toml::Value, base_dir: &Path) {
    let toml::Value::String(path) = value else {
        return;
    };
    if Path::new(path.as_str()).is_relative() {
        *path = base_dir.join(path.as_str()).to_string_lossy().into_owned();
    }
}

fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
