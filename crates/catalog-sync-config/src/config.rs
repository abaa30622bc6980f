use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration, loaded from `config.toml`. Every field has a
/// default so a missing or partial file is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub import: ImportOptions,
    #[serde(default)]
    pub retry: RetryOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Items requested per listing page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Pause between per-record master lookups during ratings export.
    #[serde(default = "default_master_lookup_throttle_ms")]
    pub master_lookup_throttle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Target collection receiving owned release-groups.
    #[serde(default = "default_owned_name")]
    pub owned_name: String,
    /// Target collection receiving wished-for release-groups.
    #[serde(default = "default_wishlist_name")]
    pub wishlist_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryOptions {
    /// Pause after a rate-limit response before refetching the same page.
    #[serde(default = "default_retry_delay_secs")]
    pub delay_secs: u64,
    /// Cap on refetches of one page. Unset keeps the historical
    /// retry-forever behavior.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_per_page() -> u32 {
    500
}

fn default_master_lookup_throttle_ms() -> u64 {
    750
}

fn default_owned_name() -> String {
    "Owned".to_string()
}

fn default_wishlist_name() -> String {
    "Wishlist".to_string()
}

fn default_retry_delay_secs() -> u64 {
    60
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            master_lookup_throttle_ms: default_master_lookup_throttle_ms(),
        }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            owned_name: default_owned_name(),
            wishlist_name: default_wishlist_name(),
        }
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            delay_secs: default_retry_delay_secs(),
            max_attempts: None,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.export.per_page, 500);
        assert_eq!(config.import.owned_name, "Owned");
        assert_eq!(config.retry.delay_secs, 60);
        assert_eq!(config.retry.max_attempts, None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.retry.max_attempts, Some(5));
        assert_eq!(config.retry.delay_secs, 60);
        assert_eq!(config.export.master_lookup_throttle_ms, 750);
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.import.wishlist_name = "Want".to_string();
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.import.wishlist_name, "Want");
    }
}
