//! Application configuration for sitepages.
//!
//! User config lives at `~/.sitepages/sitepages.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SitePagesError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitepages.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitepages";

// ---------------------------------------------------------------------------
// Config structs (matching sitepages.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP fetch settings shared by every discovery strategy.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header, also used as the robots.txt agent token.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for robots.txt requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub robots_timeout_secs: u64,

    /// Timeout for homepage requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub homepage_timeout_secs: u64,

    /// Maximum number of redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Maximum number of child sitemaps read from one sitemap index.
    #[serde(default = "default_max_child_sitemaps")]
    pub max_child_sitemaps: usize,

    /// Responses advertising a larger body than this are rejected.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            robots_timeout_secs: default_timeout_secs(),
            homepage_timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_child_sitemaps: default_max_child_sitemaps(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

fn default_user_agent() -> String {
    "SitePagesBot".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_redirects() -> usize {
    10
}
fn default_max_child_sitemaps() -> usize {
    50
}
fn default_max_response_bytes() -> u64 {
    10 * 1024 * 1024
}

impl FetchConfig {
    /// Reject values that would make a fetch unbounded or impossible.
    pub fn validate(&self) -> Result<()> {
        if self.robots_timeout_secs == 0 || self.homepage_timeout_secs == 0 {
            return Err(SitePagesError::config("fetch timeouts must be at least 1 second"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SitePagesError::config("fetch.user_agent must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitepages/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SitePagesError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitepages/sitepages.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
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
    let content = std::fs::read_to_string(path).map_err(|e| SitePagesError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SitePagesError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.fetch.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| SitePagesError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SitePagesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SitePagesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[fetch]"));
        assert!(toml_str.contains("SitePagesBot"));
    }

    #[test]
    fn partial_fetch_section_uses_defaults() {
        let toml_str = r#"
[fetch]
user_agent = "AcmeBot"
robots_timeout_secs = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.user_agent, "AcmeBot");
        assert_eq!(config.fetch.robots_timeout_secs, 3);
        assert_eq!(config.fetch.homepage_timeout_secs, 10);
        assert_eq!(config.fetch.max_child_sitemaps, 50);
    }

    #[test]
    fn init_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config_in(dir.path()).expect("init");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.fetch.user_agent, "SitePagesBot");
        assert_eq!(loaded.fetch.max_redirects, 10);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[fetch]\nhomepage_timeout_secs = 0\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("timeouts"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[fetch\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
