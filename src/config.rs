use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    /// Set from the command line, never from the file.
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(alias = "baseUrl", rename = "baseurl")]
    #[serde(default = "default_api_base")]
    pub base_url: String,
    #[serde(alias = "pageSize", rename = "pagesize")]
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            page_size: default_page_size(),
            timeout: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(alias = "baseUrl", rename = "baseurl")]
    #[serde(default = "default_image_base")]
    pub base_url: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(alias = "maxPages", rename = "maxpages")]
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrollConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_viewport")]
    pub viewport: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            viewport: default_viewport(),
        }
    }
}

fn default_api_base() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_image_base() -> String {
    "https://image.tmdb.org/t/p/original".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_max_pages() -> u32 {
    500
}

fn default_threshold() -> u32 {
    100
}

fn default_viewport() -> u32 {
    40
}

pub const API_ENV: &str = "MOVIEFEED_API";

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    /// Like `from_file`, but a missing file yields the defaults.
    pub fn from_file_or_default(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(Config::default());
        }
        Self::from_file(path)
    }

    fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(base) = std::env::var(API_ENV) {
            if !base.trim().is_empty() {
                self.api.base_url = base;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.baseurl must not be empty".to_string()));
        }
        if self.api.page_size == 0 {
            return Err(ConfigError::Invalid("api.pagesize must be at least 1".to_string()));
        }
        if self.feed.max_pages == 0 {
            return Err(ConfigError::Invalid("feed.maxpages must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
