//! Client configuration.
//!
//! Every field has a default, so an empty document is a valid config. The
//! `ui` section mirrors the server's `ui` block so the same YAML can drive
//! both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::{FileStore, KeyValueStore, MemoryStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub enable_auto_refresh: bool,
    pub auto_refresh_seconds: u64,
    pub toast_duration_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enable_auto_refresh: false,
            auto_refresh_seconds: 0,
            toast_duration_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub health_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// JSON file backing persisted preferences; in-memory when unset.
    pub settings_path: Option<PathBuf>,
    pub ui: UiConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            health_interval_secs: 30,
            request_timeout_secs: 5,
            settings_path: None,
            ui: UiConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads JSON for `.json` files and YAML for anything else.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        }
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_duration_ms)
    }

    /// Delay before the page reloads itself, when enabled.
    pub fn auto_refresh(&self) -> Option<Duration> {
        (self.ui.enable_auto_refresh && self.ui.auto_refresh_seconds > 0)
            .then(|| Duration::from_secs(self.ui.auto_refresh_seconds))
    }

    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        Ok(match &self.settings_path {
            Some(path) => Box::new(FileStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            DashboardConfig::from_yaml_str("").unwrap(),
            DashboardConfig::default()
        );
    }

    #[test]
    fn test_partial_yaml() {
        let cfg = DashboardConfig::from_yaml_str(
            "base_url: http://dash.local:9000\nui:\n  enable_auto_refresh: true\n  auto_refresh_seconds: 30\n",
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://dash.local:9000");
        assert_eq!(cfg.health_interval(), Duration::from_secs(30));
        assert_eq!(cfg.auto_refresh(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.toast_duration(), Duration::from_millis(3000));
    }

    #[test]
    fn test_auto_refresh_needs_positive_seconds() {
        let cfg = DashboardConfig::from_json_str(r#"{"ui":{"enable_auto_refresh":true}}"#).unwrap();
        assert_eq!(cfg.auto_refresh(), None);
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(DashboardConfig::from_yaml_str("health_interval_secs: [").is_err());
    }

    #[test]
    fn test_intervals_have_floor() {
        let cfg = DashboardConfig {
            health_interval_secs: 0,
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(cfg.health_interval(), Duration::from_secs(1));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
    }
}
