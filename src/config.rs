//! Lithe Shim Configuration
//!
//! Handles parsing and management of lithe.toml configuration files and
//! resolution of the Lean toolchain sysroot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for
pub const CONFIG_FILE: &str = "lithe.toml";

/// Name of the elan toolchain pin file
pub const TOOLCHAIN_FILE: &str = "lean-toolchain";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Lean sysroot could not be resolved: {0}")]
    NoSysroot(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching lithe.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShimConfig {
    /// Lean toolchain location
    #[serde(default)]
    pub lean: LeanConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShimConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: ShimConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        match find_upwards(start_dir, CONFIG_FILE) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Lean toolchain location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LeanConfig {
    /// Explicit sysroot; wins over everything else
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sysroot: Option<PathBuf>,

    /// Toolchain name, e.g. `leanprover/lean4:v4.9.0`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,

    /// elan installation directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elan_home: Option<PathBuf>,
}

impl LeanConfig {
    /// Resolve the sysroot from this config and the process environment.
    pub fn resolve_sysroot(&self, search_dir: &Path) -> ConfigResult<PathBuf> {
        self.resolve_sysroot_with(search_dir, |key| std::env::var(key).ok())
    }

    /// Resolve the sysroot with an explicit environment lookup.
    ///
    /// Order: `sysroot`, `LEAN_SYSROOT`, `LEAN_ROOT`, then
    /// `<elan home>/toolchains/<toolchain dir>`. The toolchain comes from
    /// `toolchain` or the nearest `lean-toolchain` file; elan home from
    /// `elan_home`, `ELAN_HOME` or `$HOME/.elan`.
    pub fn resolve_sysroot_with<F>(&self, search_dir: &Path, env: F) -> ConfigResult<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = &self.sysroot {
            return Ok(root.clone());
        }
        if let Some(root) = env("LEAN_SYSROOT").or_else(|| env("LEAN_ROOT")) {
            return Ok(PathBuf::from(root));
        }

        let toolchain = match &self.toolchain {
            Some(t) => t.clone(),
            None => find_upwards(search_dir, TOOLCHAIN_FILE)
                .and_then(|p| read_toolchain(&p))
                .ok_or_else(|| {
                    ConfigError::NoSysroot(format!(
                        "no toolchain configured and no {} above {}",
                        TOOLCHAIN_FILE,
                        search_dir.display()
                    ))
                })?,
        };

        let elan_home = match &self.elan_home {
            Some(home) => home.clone(),
            None => env("ELAN_HOME")
                .map(PathBuf::from)
                .or_else(|| env("HOME").map(|h| PathBuf::from(h).join(".elan")))
                .ok_or_else(|| ConfigError::NoSysroot("ELAN_HOME or HOME not set".to_string()))?,
        };

        Ok(elan_home
            .join("toolchains")
            .join(toolchain_dir_name(&toolchain)))
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// elan's on-disk directory name for a toolchain
pub fn toolchain_dir_name(toolchain: &str) -> String {
    toolchain.replace('/', "--").replace(':', "---")
}

/// First non-empty line of a `lean-toolchain` file
pub fn read_toolchain(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.lines().next().map(|l| l.trim().to_string()))
        .filter(|s| !s.is_empty())
}

fn find_upwards(start_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
