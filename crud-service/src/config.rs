//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: CRUD_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/crud-service/{service_name}/config.toml
//! 4. System directory: /etc/crud-service/{service_name}/config.toml
//! 5. Default values
//!
//! For example `CRUD_PAGING__MAX_PAGE_SIZE=50` overrides `paging.max_page_size`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crud::DataSetRequest;
use crate::error::Result;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "CRUD_";

/// Directory name used under XDG and /etc
const CONFIG_DIR_NAME: &str = "crud-service";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Page size bounds applied to list requests
    #[serde(default)]
    pub paging: PagingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServiceConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable panic recovery middleware
    #[serde(default = "default_true")]
    pub catch_panic: bool,

    /// Enable compression
    #[serde(default = "default_true")]
    pub compression: bool,

    /// CORS mode: permissive, restrictive or disabled
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl MiddlewareConfig {
    /// Body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            catch_panic: true,
            compression: true,
            cors_mode: default_cors_mode(),
        }
    }
}

/// Page size bounds for list requests
///
/// Resources typically call [`PagingConfig::apply`] from
/// [`Service::constrain_request`](crate::crud::Service::constrain_request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Smallest page size a client may request
    #[serde(default = "default_min_page_size")]
    pub min_page_size: u32,

    /// Largest page size a client may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl PagingConfig {
    /// Clip the request's page size into the configured bounds
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::config::PagingConfig;
    /// use crud_service::crud::DataSetRequest;
    ///
    /// let mut request = DataSetRequest::new().with_page_size(1000);
    /// PagingConfig::default().apply(&mut request);
    /// assert_eq!(request.page_size, 100);
    /// ```
    pub fn apply(&self, request: &mut DataSetRequest) {
        request.constrain_paging(self.min_page_size, self.max_page_size);
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            min_page_size: default_min_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_min_page_size() -> u32 {
    1
}

fn default_max_page_size() -> u32 {
    100
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| CONFIG_DIR_NAME.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!(paths = ?config_paths, "searching for config files");

        let mut figment = Figment::new().merge(Serialized::defaults(Self::defaults_for(service_name)));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!(path = %path.display(), "loading configuration");
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses discovery; environment variables still override the file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Defaults with the service name filled in
    fn defaults_for(service_name: &str) -> Self {
        let mut config = Self::default();
        config.service.name = service_name.to_string();
        config
    }

    /// All possible config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR_NAME);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR_NAME)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_DIR_NAME.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            middleware: MiddlewareConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}
