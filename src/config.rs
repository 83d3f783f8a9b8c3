//! Configuration management for the conversion server

use std::env;
use std::path::PathBuf;

/// Multipart body ceiling: 50MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 << 20;

/// Largest resize target: 50 megapixels
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 50_000_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub uploads: UploadConfig,
    pub images: ImageConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Largest accepted request body, checked before any workspace exists
    pub max_body_bytes: usize,
    /// Directory under which request workspaces are created
    pub workspace_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Ceiling on `width * height` of a resize target
    pub max_output_pixels: u64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; a single `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            uploads: UploadConfig {
                max_body_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                workspace_root: env::temp_dir(),
            },
            images: ImageConfig {
                max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            uploads: UploadConfig {
                max_body_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.uploads.max_body_bytes)?,
                workspace_root: env::var("WORKSPACE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.uploads.workspace_root),
            },
            images: ImageConfig {
                max_output_pixels: parse_var(
                    "MAX_OUTPUT_PIXELS",
                    defaults.images.max_output_pixels,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|v| split_origins(&v))
                    .unwrap_or(defaults.cors.allowed_origins),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
