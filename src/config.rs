use crate::provider::{RefreshPolicy, MIN_POLL_INTERVAL, REVIEWS_TABLE, SENTIMENT_TABLE};
use crate::services::api::{ApiClientConfig, ApiError};
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub include_stats: bool,
    pub topic_limit: u64,
    pub analytics_range: Option<String>,
    pub watch_tables: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            poll_interval_ms: 5000,
            include_stats: true,
            topic_limit: 10,
            analytics_range: None,
            watch_tables: vec![REVIEWS_TABLE.to_string(), SENTIMENT_TABLE.to_string()],
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        Self::build(None)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        Self::build(Some(path))
    }

    fn build(explicit_path: Option<&Path>) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("api_base_url", defaults.api_base_url.clone())?
            .set_default("poll_interval_ms", defaults.poll_interval_ms)?
            .set_default("include_stats", defaults.include_stats)?
            .set_default("topic_limit", defaults.topic_limit)?;

        if let Some(path) = explicit_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        } else if let Some(path) = Self::default_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("REVIEWLENS").separator("__"));

        let built = builder.build()?;
        Ok(built.try_deserialize::<Settings>()?)
    }

    fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "ReviewLens", "ReviewLens")
            .map(|dirs| dirs.config_dir().join("reviewlens.toml"))
    }

    pub fn api_client_config(&self) -> Result<ApiClientConfig, ApiError> {
        ApiClientConfig::try_from_url(&self.api_base_url)
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        let heartbeat = (self.poll_interval_ms > 0)
            .then(|| Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL));
        RefreshPolicy {
            heartbeat,
            watch_tables: self.watch_tables.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_observed_variants() {
        let settings = Settings::default();
        assert_eq!(settings.poll_interval_ms, 5000);
        assert!(settings.include_stats);
        assert_eq!(
            settings.watch_tables,
            vec!["reviews".to_string(), "sentiment_analysis".to_string()]
        );
    }

    #[test]
    fn zero_interval_disables_heartbeat() {
        let settings = Settings {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(settings.refresh_policy().heartbeat.is_none());
    }

    #[test]
    fn tiny_intervals_are_clamped() {
        let settings = Settings {
            poll_interval_ms: 1,
            ..Default::default()
        };
        assert_eq!(settings.refresh_policy().heartbeat, Some(MIN_POLL_INTERVAL));
    }

    #[test]
    fn base_url_becomes_client_config() {
        let settings = Settings::default();
        let config = settings.api_client_config().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
    }
}
