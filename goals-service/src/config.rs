//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Short store variables: `STORE_URL`, `STORE_HOST`, `STORE_USER`, `STORE_PASSWORD`,
//!    `STORE_DATABASE` (or `STORE_DB`), `STORE_NAMESPACE`
//! 2. Environment variables (prefix: `GOALS_`, nested keys separated by `__`)
//!
//! Store connection strings from the environment are taken as-is, never
//! parsed: `STORE_PASSWORD=007` is the password `007`.
//! 3. Current working directory: ./config.toml
//! 4. XDG config directory: ~/.config/goals-service/config.toml
//! 5. System directory: /etc/goals-service/config.toml
//! 6. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Name used for the config directory and as the default service name
pub const SERVICE_NAME: &str = "goals-service";

/// Database used when none is configured
pub const DEFAULT_DATABASE: &str = "course-goals";

/// String store fields and the short variables they are read from, lowest
/// priority first
const STORE_ENV_VARS: &[(&str, &[&str])] = &[
    ("url", &["STORE_URL"]),
    ("host", &["STORE_HOST"]),
    ("user", &["STORE_USER"]),
    ("password", &["STORE_PASSWORD"]),
    ("database", &["STORE_DB", "STORE_DATABASE"]),
    ("namespace", &["STORE_NAMESPACE"]),
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Document store connection inputs
    #[serde(default)]
    pub store: StoreConfig,

    /// Access log sink
    #[serde(default)]
    pub access_log: AccessLogConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error) or a full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Document store configuration
///
/// Every connection input is optional. Which of them are present decides the
/// connection string, see [`crate::store::connection::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Full connection URL, used verbatim when present
    #[serde(default)]
    pub url: Option<String>,

    /// Store host name
    #[serde(default)]
    pub host: Option<String>,

    /// Store user
    #[serde(default)]
    pub user: Option<String>,

    /// Store password
    #[serde(default)]
    pub password: Option<String>,

    /// Database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Namespace the database lives in
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Additional connection attempts after the first one fails
    #[serde(default)]
    pub max_retries: u32,

    /// Base delay between connection attempts in seconds (doubles per attempt)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl StoreConfig {
    /// Database name, falling back to the default when configured empty
    pub fn database_name(&self) -> &str {
        if self.database.is_empty() {
            DEFAULT_DATABASE
        } else {
            &self.database
        }
    }

    /// Base delay between connection attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            user: None,
            password: None,
            database: default_database(),
            namespace: default_namespace(),
            max_retries: 0,
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Access log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogConfig {
    /// Write combined-format access log lines
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding the log file
    #[serde(default = "default_access_log_dir")]
    pub directory: PathBuf,

    /// Log file name (appended to, never rotated)
    #[serde(default = "default_access_log_file")]
    pub file_name: String,
}

impl AccessLogConfig {
    /// Full path of the access log file
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_access_log_dir(),
            file_name: default_access_log_file(),
        }
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl MiddlewareConfig {
    /// Request body size limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    80
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_namespace() -> String {
    "goals".to_string()
}

fn default_retry_delay() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn default_access_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_access_log_file() -> String {
    "access.log".to_string()
}

fn default_body_limit_mb() -> usize {
    10 // 10 MB
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (all found files are merged,
    /// earlier entries win):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/goals-service/config.toml
    /// 3. System directory: /etc/goals-service/config.toml
    ///
    /// Environment variables override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so that higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = Self::with_env(figment).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path. Environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()));

        let config = Self::with_env(figment).extract()?;
        Ok(config)
    }

    /// Layer the environment providers on top of `figment`
    ///
    /// `Env` parses values (`007` becomes the integer 7), so the string store
    /// fields are read again verbatim and merged over it.
    fn with_env(figment: Figment) -> Figment {
        let mut figment = figment.merge(Env::prefixed("GOALS_").split("__"));

        for (key, _) in STORE_ENV_VARS {
            let var = format!("GOALS_STORE__{}", key.to_uppercase());
            figment = merge_raw_store_var(figment, &var, key);
        }

        for (key, vars) in STORE_ENV_VARS {
            for var in vars.iter() {
                figment = merge_raw_store_var(figment, var, key);
            }
        }

        figment
    }

    /// Config file candidates, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(SERVICE_NAME);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(SERVICE_NAME).join("config.toml"));
        paths
    }
}

/// Merge the unparsed value of `var`, if set, as `store.<key>`
fn merge_raw_store_var(figment: Figment, var: &str, key: &str) -> Figment {
    match std::env::var(var) {
        Ok(value) => figment.merge(Serialized::default(&format!("store.{}", key), value)),
        Err(_) => figment,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: SERVICE_NAME.to_string(),
                port: default_port(),
                log_level: default_log_level(),
            },
            store: StoreConfig::default(),
            access_log: AccessLogConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}
