//! Configuration file support for persistent settings.
//!
//! Settings are read from `~/.config/spa-scripts/config.toml` (or the
//! platform-specific equivalent). Values in the file serve as defaults that
//! command-line arguments override.
//!
//! # Layering
//!
//! The precedence order is: **CLI argument > config file > hardcoded default**.
//!
//! # Example config
//!
//! ```toml
//! bundler = "~/.local/bin/esbuild"
//! own_path = "/usr/local/lib/node_modules/spa-scripts"
//! public_url = "/dashboard"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! open_browser = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::utils::expand_tilde;

/// Top-level configuration file structure.
///
/// All fields are `Option<T>` so we can detect which values are present in the
/// config file and apply layered configuration (CLI > config file > defaults).
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Path to the bundler executable
    pub bundler: Option<PathBuf>,

    /// The tool's install directory, holding `template/` and `config/`
    pub own_path: Option<PathBuf>,

    /// Public URL used when neither `--public-url` nor `PUBLIC_URL` is set
    pub public_url: Option<String>,

    /// Development server options
    #[serde(default)]
    pub server: FileServerConfig,
}

/// Development server options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,

    /// Whether `start` opens a browser tab
    pub open_browser: Option<bool>,
}

impl FileConfig {
    /// Returns the path where the configuration file is expected.
    ///
    /// The configuration file is located at `<config_dir>/spa-scripts/config.toml`,
    /// where `<config_dir>` is the platform-specific configuration directory
    /// (e.g., `~/.config` on Linux, `%APPDATA%` on Windows).
    ///
    /// # Returns
    ///
    /// `Some(PathBuf)` with the config file path, or `None` if the config
    /// directory cannot be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("spa-scripts").join("config.toml"))
    }

    /// Load configuration from the default config file location.
    ///
    /// If the config file doesn't exist, returns a default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file exists but cannot be read
    /// - The config file exists but contains invalid TOML or unexpected fields
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, defaulting when the file is absent.
    ///
    /// # Errors
    ///
    /// Same as [`FileConfig::load`].
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file at {}: {e}", path.display())
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file at {}: {e}", path.display())
        })?;

        Ok(config)
    }

    /// The configured bundler executable, with `~` expanded.
    #[must_use]
    pub fn bundler_path(&self) -> Option<PathBuf> {
        self.bundler.as_deref().map(expand_tilde)
    }

    /// The configured install directory, with `~` expanded.
    #[must_use]
    pub fn own_directory(&self) -> Option<PathBuf> {
        self.own_path.as_deref().map(expand_tilde)
    }
}
