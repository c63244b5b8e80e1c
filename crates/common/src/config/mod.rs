//! Configuration management for Vaultify services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{env}.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database (metadata store) configuration
    pub database: DatabaseConfig,

    /// Blob storage configuration
    pub storage: StorageConfig,

    /// Generative-AI endpoint configuration
    pub genai: GenAiConfig,

    /// Content cache configuration
    pub cache: CacheConfig,

    /// HTTP rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Object storage HTTP endpoint
    pub endpoint: String,

    /// Bucket holding uploaded papers
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Base URL under which stored objects are publicly fetchable
    /// (falls back to `{endpoint}` when unset)
    pub public_base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenAiConfig {
    /// API key for the generative endpoint
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_genai_base")]
    pub api_base: String,

    /// Model used for text content (cost/quality tradeoff, not correctness)
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for image content
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_genai_timeout")]
    pub timeout_secs: u64,

    /// Process-wide generation budget per sliding minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached paper payloads before LRU eviction
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second across the gateway
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 50 }
fn default_min_connections() -> u32 { 5 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_bucket() -> String { "papers".to_string() }
fn default_storage_timeout() -> u64 { 30 }
fn default_genai_base() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_text_model() -> String { crate::DEFAULT_TEXT_MODEL.to_string() }
fn default_image_model() -> String { crate::DEFAULT_IMAGE_MODEL.to_string() }
fn default_genai_timeout() -> u64 { 60 }
fn default_requests_per_minute() -> usize { 10 }
fn default_cache_entries() -> usize { 256 }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "vaultify".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__GENAI__API_KEY=...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get the read database URL (falls back to primary)
    pub fn read_database_url(&self) -> &str {
        self.database.read_url.as_deref().unwrap_or(&self.database.url)
    }

    /// Base URL under which stored blobs are fetchable
    pub fn public_storage_base(&self) -> &str {
        self.storage
            .public_base_url
            .as_deref()
            .unwrap_or(&self.storage.endpoint)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/vaultify".to_string(),
                read_url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket: default_bucket(),
                public_base_url: None,
                timeout_secs: default_storage_timeout(),
            },
            genai: GenAiConfig {
                api_key: None,
                api_base: default_genai_base(),
                text_model: default_text_model(),
                image_model: default_image_model(),
                timeout_secs: default_genai_timeout(),
                requests_per_minute: default_requests_per_minute(),
            },
            cache: CacheConfig {
                max_entries: default_cache_entries(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_rate_limit(),
                burst: default_burst(),
                enabled: default_enabled(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.genai.text_model, "gemini-2.5-flash");
        assert_eq!(config.genai.image_model, "gemini-2.5-pro");
        assert_eq!(config.genai.requests_per_minute, 10);
    }

    #[test]
    fn test_read_database_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.read_database_url(), "postgres://localhost/vaultify");
    }

    #[test]
    fn test_public_storage_base_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.public_storage_base(), "http://localhost:9000");
    }
}
