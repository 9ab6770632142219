//! Configuration schema for pkglink
//!
//! Global configuration lives at `~/.config/pkglink/config.toml`; a project
//! may add a `pkglink.toml` whose values take precedence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Platform library settings
    pub sdk: SdkConfig,

    /// Linker settings
    pub link: LinkConfig,

    /// Package name -> source root and bundle output folder
    pub packages: BTreeMap<String, PackageConfig>,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Bundle holding the linked platform libraries
    pub bundle: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Resolve in strong mode (default: true)
    pub strong_mode: bool,

    /// Variables consulted by conditional imports and exports
    pub declared_variables: BTreeMap<String, String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            strong_mode: true,
            declared_variables: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Root that `package:<name>/<path>` paths are joined onto
    pub source: PathBuf,

    /// Folder scanned for `*.full.ds` bundles
    pub output: PathBuf,
}
