//! Configuration loading for SIMS modules
//!
//! Each module reads an optional TOML file plus environment variable
//! overrides. Module-level resolution (which key wins) lives in the module
//! crates; this file owns the TOML schema and platform config paths.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter ("error", "warn", "info", "debug", "trace")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Module TOML configuration (`~/.config/sims/<module>.toml`)
///
/// Every field is optional; absent keys fall back to environment variables
/// or compiled defaults during module-level resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the document processing & persistence service
    pub service_url: Option<String>,

    /// Bearer token attached to every document-service request
    pub api_token: Option<String>,

    /// Port the module listens on
    pub listen_port: Option<u16>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default configuration file path for a module
///
/// Linux/macOS/Windows resolve through the platform config directory
/// (e.g. `~/.config/sims/sims-di.toml` on Linux).
pub fn config_file_path(module_name: &str) -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("sims").join(format!("{}.toml", module_name)))
}

/// Load a module's TOML config
///
/// A missing file is not an error: the module runs on environment variables
/// and compiled defaults. A file that exists but does not parse is a
/// configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}
