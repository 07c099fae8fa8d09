//! Configuration file location
//!
//! A `config.yaml` in the working directory wins (development and portable
//! use). Otherwise the file lives in the platform config directory, e.g.
//! `~/.config/US2400 GW/config.yaml` or `%APPDATA%\US2400 GW\config.yaml`.

use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

/// Directory name under the platform config directory
const APP_NAME: &str = "US2400 GW";

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Path to the configuration file
    pub config: PathBuf,
    /// Whether the configuration sits in the working directory
    pub is_local: bool,
}

impl AppPaths {
    /// Resolve the configuration path.
    ///
    /// Called before logging is initialized, so diagnostics go to stderr in
    /// debug builds.
    pub fn detect() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let platform_dir = dirs::config_dir().map(|dir| dir.join(APP_NAME));
        let paths = Self::resolve(cwd, platform_dir);

        #[cfg(debug_assertions)]
        eprintln!(
            "[paths] config: {} ({})",
            paths.config.display(),
            if paths.is_local { "local" } else { "platform" }
        );

        paths
    }

    fn resolve(cwd: PathBuf, platform_dir: Option<PathBuf>) -> Self {
        let local = cwd.join(CONFIG_FILE);
        match platform_dir {
            Some(dir) if !local.exists() => Self {
                config: dir.join(CONFIG_FILE),
                is_local: false,
            },
            _ => Self {
                config: local,
                is_local: true,
            },
        }
    }

    /// Configuration path as the string form the config loaders take
    pub fn config_str(&self) -> String {
        self.config.to_string_lossy().into_owned()
    }

    /// Create the directory holding the configuration file
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.config.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating config directory: {}", parent.display());
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}
