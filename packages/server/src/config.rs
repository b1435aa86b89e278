use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::policy::PolicyKind;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![],
            max_age: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Mount transfer settings.
#[derive(Debug, Deserialize, Clone)]
pub struct MountConfig {
    /// Maximum request body size for uploads, in bytes. Default: 128 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
    /// Authorization policy applied to every mount request. Default: `allow_all`.
    #[serde(default)]
    pub policy: PolicyKind,
}

fn default_max_upload_size() -> usize {
    128 * 1024 * 1024
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            policy: PolicyKind::default(),
        }
    }
}

/// Executor-facing API settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExecutorConfig {
    /// Shared secret executors present as `Authorization: token-executor <token>`.
    /// The executor routes are only mounted when this is set.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub mount: MountConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., BATCHES__DATABASE__URL)
            .add_source(Environment::with_prefix("BATCHES").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
