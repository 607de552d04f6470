//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config <PATH>`, or `config.toml` in the platform
//!    config directory)
//! 3. environment variables prefixed with `MEDIASYNC_`
//! 4. command-line flags (applied by the caller)
//!
//! # Example
//!
//! ```toml
//! follow_symlinks = false
//! skip_hidden = true
//! output_dir = "/var/tmp/sync"
//! mark_scripts_executable = true
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compare::CompareOptions;
use crate::scanner::WalkerConfig;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "MEDIASYNC_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Follow symbolic links while scanning.
    pub follow_symlinks: bool,
    /// Skip files and directories whose name starts with `.`.
    pub skip_hidden: bool,
    /// Directory for `comp` outputs when none is given on the command line.
    pub output_dir: Option<PathBuf>,
    /// Mark generated copy scripts executable.
    pub mark_scripts_executable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            skip_hidden: false,
            output_dir: None,
            mark_scripts_executable: true,
        }
    }
}

impl Config {
    /// Load the configuration from `explicit`, or from the default
    /// platform-specific path when `None`.
    ///
    /// A missing file is not an error. An unreadable or invalid one is
    /// logged and the defaults are used instead.
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        match explicit.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => Self::load_from_path(&path),
            None => Self::load_layers(Self::base()),
        }
    }

    /// Load the configuration with the TOML file at `path` as file layer.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        log::debug!("Loading configuration from {}", path.display());
        Self::load_layers(Self::base().merge(Toml::file(path)))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    fn load_layers(figment: Figment) -> Self {
        match figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "mediasync", "mediasync")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks, self.skip_hidden)
    }

    /// Comparison settings derived from this configuration.
    #[must_use]
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            mark_executable: self.mark_scripts_executable,
        }
    }
}
