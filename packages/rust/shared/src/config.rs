//! Application configuration for formfill.
//!
//! User config lives at `~/.formfill/formfill.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FormFillError, Result};
use crate::types::DateOrder;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "formfill.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".formfill";

// ---------------------------------------------------------------------------
// Config structs (matching formfill.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Where the form data is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Page-fill behaviour.
    #[serde(default)]
    pub fill: FillConfig,

    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Whether CSV imports replace values of keys that already exist.
    #[serde(default)]
    pub overwrite_existing: bool,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file path. A leading `~` is expanded to the home directory.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.formfill/formfill.db".into()
}

/// `[fill]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    /// How ambiguous `D/M/YYYY` answers are read for date inputs.
    #[serde(default)]
    pub date_order: DateOrder,

    /// Send a fill request to the target page after every save.
    #[serde(default = "default_true")]
    pub auto_fill_on_save: bool,

    /// Form page snapshot filled by the local content channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrder::default(),
            auto_fill_on_save: true,
            page: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[ui]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Seconds before a status message hides itself.
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            status_timeout_secs: default_status_timeout(),
        }
    }
}

fn default_status_timeout() -> u64 {
    5
}

impl AppConfig {
    /// Resolved database path with `~` expanded.
    pub fn db_path(&self) -> Result<PathBuf> {
        expand_home(&self.storage.db_path)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.formfill/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FormFillError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.formfill/formfill.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };
    let home = dirs::home_dir()
        .ok_or_else(|| FormFillError::config("could not determine home directory"))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FormFillError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FormFillError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FormFillError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FormFillError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FormFillError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
