//! Server configuration types
//!
//! Contains all configuration structures for the Easel server.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static assets served as the router fallback, when present
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: default_static_dir(),
        }
    }
}

/// Scene limits and defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Scene width at process start
    #[serde(default = "default_width")]
    pub default_width: u32,
    /// Scene height at process start
    #[serde(default = "default_height")]
    pub default_height: u32,
    /// Smallest width/height accepted by init
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,
    /// Largest width/height accepted by init
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// Multipart upload cap in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_min_dimension() -> u32 {
    1
}

fn default_max_dimension() -> u32 {
    10_000
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_width: default_width(),
            default_height: default_height(),
            min_dimension: default_min_dimension(),
            max_dimension: default_max_dimension(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Remote image fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_max_remote_bytes")]
    pub max_remote_bytes: usize,
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_remote_bytes() -> usize {
    10 * 1024 * 1024
}

impl ImagesConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_remote_bytes: default_max_remote_bytes(),
        }
    }
}

/// Font discovery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontsConfig {
    /// Directories scanned in addition to the system fonts
    #[serde(default)]
    pub extra_dirs: Vec<PathBuf>,
}
