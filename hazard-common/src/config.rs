//! Bootstrap configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is not an error; defaults are used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "HAZARD_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DEFAULT_DATABASE_FILE: &str = "hazard.db";

/// Default listen address for the admin server
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:6543";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (and anything else the services write)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database path; defaults to `<root_folder>/hazard.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Listen address of the admin server
    #[serde(default)]
    pub bind_addr: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved settings for the admin server
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub log_level: String,
}

impl AdminConfig {
    /// Resolve the configuration from CLI overrides, environment, TOML file
    /// and compiled defaults
    pub fn resolve(
        cli_root_folder: Option<&Path>,
        cli_bind_addr: Option<&str>,
        toml_config: &TomlConfig,
    ) -> Self {
        let root_folder = resolve_root_folder(cli_root_folder, ROOT_FOLDER_ENV, toml_config);

        let database_path = toml_config
            .database_path
            .clone()
            .unwrap_or_else(|| root_folder.join(DEFAULT_DATABASE_FILE));

        let bind_addr = cli_bind_addr
            .map(str::to_string)
            .or_else(|| toml_config.bind_addr.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Self {
            root_folder,
            database_path,
            bind_addr,
            log_level: toml_config.logging.level.clone(),
        }
    }

    /// Create the root folder if it does not exist yet
    pub fn ensure_root_folder(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }
}

/// Resolve the root folder following the priority order in the module docs
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(root_folder) = &toml_config.root_folder {
        return root_folder.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Load the TOML config
///
/// With an explicit path the file must exist. Without one the platform
/// config locations are searched and a missing file yields defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Some(path) => path,
            None => {
                warn!("No config file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Parse config file contents
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// Locate the config file for the platform, if any
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("hazard-admin").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/hazard-admin/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/hazard-admin (or /var/lib/hazard-admin system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("hazard-admin"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/hazard-admin"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("hazard-admin"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/hazard-admin"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("hazard-admin"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\hazard-admin"))
    } else {
        PathBuf::from("./hazard_data")
    }
}
