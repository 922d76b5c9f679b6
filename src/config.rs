/// Application settings
///
/// Settings come from an optional JSON file in the user's config directory,
/// then environment overrides:
/// - Linux: ~/.config/pixel-studio/settings.json
/// - macOS: ~/Library/Application Support/pixel-studio/settings.json
/// - Windows: %APPDATA%\pixel-studio\settings.json
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Secondary variable checked after the configured one
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Output aspect ratio requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
}

/// Output size class requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Endpoint root, without the `/v1beta/...` path
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub aspect_ratio: AspectRatio,
    pub image_size: ImageSize,
    /// Ask the model to consult web search (grounding)
    pub grounding: bool,
    /// How long the splash screen stays up
    pub splash_millis: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            aspect_ratio: AspectRatio::default(),
            image_size: ImageSize::default(),
            grounding: true,
            splash_millis: 2500,
        }
    }
}

impl Settings {
    /// Load settings from the default location and apply env overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Path of the settings file, if a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("pixel-studio");
        path.push("settings.json");
        Some(path)
    }

    /// Read settings from `path`; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Apply `PIXEL_STUDIO_*` overrides using `lookup` to read variables
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty("PIXEL_STUDIO_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = non_empty("PIXEL_STUDIO_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(var) = non_empty("PIXEL_STUDIO_API_KEY_VAR") {
            self.api_key_env = var;
        }
    }

    /// Environment variables checked for an API key, in order
    pub fn api_key_vars(&self) -> Vec<String> {
        let mut vars = vec![self.api_key_env.clone()];
        if self.api_key_env != FALLBACK_API_KEY_ENV {
            vars.push(FALLBACK_API_KEY_ENV.to_string());
        }
        vars
    }
}
