//! User configuration, read from `config.ron` in the platform config directory.

use crate::gemini::{DEFAULT_API_BASE_URL, DEFAULT_API_KEY_VAR, DEFAULT_MODEL, GeminiClient};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MAP_URL: &str = "https://i.imgur.com/YAgBeh8.jpeg";

const APP_DIR: &str = "folklore-map";
const CONFIG_FILE: &str = "config.ron";

/// Errors that can occur when reading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: ron::de::SpannedError,
    },
}

/// Where the map image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapSource {
    Url(String),
    File(PathBuf),
}

impl Default for MapSource {
    fn default() -> Self {
        MapSource::Url(DEFAULT_MAP_URL.to_owned())
    }
}

impl FromStr for MapSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(MapSource::Url(s.to_owned()))
        } else {
            Ok(MapSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for MapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapSource::Url(url) => f.write_str(url),
            MapSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Viewer and storyteller settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Map image shown at startup
    pub map_source: MapSource,
    /// Generative model name
    pub model: String,
    /// Base URL of the Generative Language API
    pub api_base_url: String,
    /// Environment variable holding the API key
    pub api_key_var: String,
    /// Zoom level when the viewer opens
    pub initial_scale: f32,
    /// Pan offset when the viewer opens, in points
    pub initial_offset: [f32; 2],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_source: MapSource::default(),
            model: DEFAULT_MODEL.to_owned(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            api_key_var: DEFAULT_API_KEY_VAR.to_owned(),
            // Opens zoomed onto the northern provinces
            initial_scale: 3.5,
            initial_offset: [20.0, 500.0],
        }
    }
}

impl Config {
    /// `<config_dir>/folklore-map/config.ron`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::de::SpannedError> {
        ron::from_str(text)
    }

    /// Client for the configured model and credential variable.
    pub fn story_client(&self) -> GeminiClient {
        GeminiClient::new(&self.api_base_url, &self.model, &self.api_key_var)
    }
}
