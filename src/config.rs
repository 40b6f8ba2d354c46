//! Application configuration.
//!
//! Configuration is stored in `config.yaml` under the platform config
//! directory (or the file named by `HOMES_CONFIG`) and includes:
//! - The listings endpoint and its pagination parameter names
//! - The default page size
//! - Where favorites are persisted
//! - How overlapping fetches are reconciled

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{HomesError, Result};
use crate::remote::http::{DEFAULT_PAGE_PARAM, DEFAULT_PER_PAGE_PARAM};
use crate::service::FetchOrdering;
use crate::types::DEFAULT_PAGE_SIZE;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "HOMES_CONFIG";
/// Overrides `base_url`.
pub const API_URL_ENV: &str = "HOMES_API_URL";
/// Overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "HOMES_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the listings server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Collection path under the base URL
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_per_page_param")]
    pub per_page_param: String,

    /// Records per page when none is requested
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Remote request timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,

    /// Directory holding persisted favorites
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// How responses to overlapping fetches are applied
    #[serde(default)]
    pub fetch_ordering: FetchOrdering,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_collection() -> String {
    "homes".to_string()
}

fn default_page_param() -> String {
    DEFAULT_PAGE_PARAM.to_string()
}

fn default_per_page_param() -> String {
    DEFAULT_PER_PAGE_PARAM.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_remote_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: default_collection(),
            page_param: default_page_param(),
            per_page_param: default_per_page_param(),
            page_size: default_page_size(),
            remote_timeout: default_remote_timeout(),
            data_dir: None,
            fetch_ordering: FetchOrdering::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "homes")
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from(".homes").join("config.yaml"))
    }

    /// Load configuration from file, or return default if not found.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                HomesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read config at {}: {}", path.display(), e),
                ))
            })?;
            Self::from_yaml(&content)?
        } else {
            Config::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HomesError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            HomesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            self.base_url = url;
        }
        if let Ok(dir) = env::var(DATA_DIR_ENV)
            && !dir.is_empty()
        {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(HomesError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.page_param.is_empty() || self.per_page_param.is_empty() {
            return Err(HomesError::Config(
                "pagination parameter names cannot be empty".to_string(),
            ));
        }
        if self.page_param == self.per_page_param {
            return Err(HomesError::Config(format!(
                "page_param and per_page_param must differ (both are '{}')",
                self.page_param
            )));
        }
        self.endpoint()?;
        Ok(())
    }

    /// Full URL of the listings collection.
    pub fn endpoint(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url)?;
        if base.cannot_be_a_base() {
            return Err(HomesError::Config(format!(
                "base_url '{}' cannot be used as a base URL",
                self.base_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(self.collection.trim_start_matches('/'))?)
    }

    /// Directory where favorites are persisted.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".homes"))
    }

    /// Get the remote operation timeout duration
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout)
    }
}
