//! Configuration management for Quire.
//!
//! Configuration is read from `~/.config/quire/config.toml` (or an explicit
//! `--config` path) once at startup and passed down as a value. If the default
//! file doesn't exist, one with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the mirrored sites; each host gets `{data_dir}/{host}`.
    pub data_dir: PathBuf,
    /// Host served for requests to `localhost`.
    pub default_host: String,
    pub google: GoogleConfig,
    pub sync: SyncConfig,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./dist"),
            default_host: "localhost".to_string(),
            google: GoogleConfig::default(),
            sync: SyncConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Service account JSON key downloaded from the Cloud console.
    pub service_account_key_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    /// Page size for Drive list calls.
    pub page_size: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            service_account_key_path: None,
            request_timeout_secs: 30,
            page_size: 100,
        }
    }
}

impl GoogleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum number of documents downloaded at once.
    pub workers: usize,
    /// Site paths under this prefix are listed in `/feed.xml`.
    pub blog_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            blog_prefix: "/blog/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// A missing default file is created with comments. A missing explicit
    /// file is an error. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get the default config file path: `~/.config/quire/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("quire").join("config.toml"))
    }

    /// Directory holding one host's pages and sitemap.
    pub fn host_dir(&self, host: &str) -> PathBuf {
        self.data_dir.join(host)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Quire configuration

# Where mirrored sites are written. Each shared Drive folder becomes
# {data_dir}/{folder name}, and the folder name is the site's host name.
data_dir = "./dist"

# Site served for requests to localhost
default_host = "localhost"

[google]
# Service account key (JSON). Share the site folders with the
# service account's email address.
# service_account_key_path = "/etc/quire/service-account.json"

# Per-request timeout in seconds
request_timeout_secs = 30

# Results per Drive list call
page_size = 100

[sync]
# Maximum concurrent document downloads
workers = 10

# Pages under this path prefix are published in /feed.xml
blog_prefix = "/blog/"

[server]
bind = "0.0.0.0"
port = 8000
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
