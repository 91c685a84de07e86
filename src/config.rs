//! Configuration file handling for twin-studio.
//!
//! Loads configuration from `~/.config/twin-studio/config.toml` or a custom path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gemini::{PollPolicy, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL, GEMINI_API_BASE_URL};

/// Primary environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback environment variable holding the API key.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

/// Configuration file structure for twin-studio.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub image: ImageSettings,
    #[serde(default)]
    pub video: VideoSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_model: String,
    pub video_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GEMINI_API_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ImageSettings {
    pub aspect_ratio: String,
    pub image_size: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: "3:4".to_string(),
            image_size: "1K".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct VideoSettings {
    pub aspect_ratio: String,
    pub resolution: String,
    pub poll_interval_secs: u64,
    pub max_polls: u32,
    pub timeout_secs: u64,
    /// Retry submission on transient network errors and rate limits.
    pub retry_submit: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            aspect_ratio: "9:16".to_string(),
            resolution: "720p".to_string(),
            poll_interval_secs: policy.interval.as_secs(),
            max_polls: policy.max_attempts,
            timeout_secs: policy.timeout.as_secs(),
            retry_submit: false,
        }
    }
}

impl VideoSettings {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.poll_interval_secs),
            self.max_polls,
            Duration::from_secs(self.timeout_secs),
        )
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Load an explicitly requested config file, which must exist.
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load(Some(path))
    }

    /// Resolve the API credential.
    ///
    /// `GEMINI_API_KEY` wins over `API_KEY`, which wins over the config file.
    /// An absent credential resolves to an empty string.
    pub fn resolve_api_key(&self) -> String {
        [GEMINI_API_KEY_ENV, FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .chain(self.api.api_key.clone())
            .find(|key| !key.trim().is_empty())
            .unwrap_or_default()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("twin-studio").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/twin-studio/config.toml")
        })
}

/// Contents written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# twin-studio configuration

[api]
# Prefer GEMINI_API_KEY in the environment or a .env file.
# api_key = "your-api-key"
base_url = "https://generativelanguage.googleapis.com"
image_model = "gemini-3-pro-image-preview"
video_model = "veo-3.1-fast-generate-preview"

[image]
aspect_ratio = "3:4"
image_size = "1K"

[video]
aspect_ratio = "9:16"
resolution = "720p"
poll_interval_secs = 5
max_polls = 120
timeout_secs = 900
retry_submit = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.video.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[video]\nmax_polls = 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.video.max_polls, 3);
        assert_eq!(config.video.resolution, "720p");
        assert_eq!(config.api.image_model, DEFAULT_IMAGE_MODEL);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[video\nmax_polls = ").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_explicit_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_explicit(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
