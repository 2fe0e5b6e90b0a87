//! Relay configuration: defaults, an optional JSON file and environment overrides.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use dirs_next::config_dir;
use extrelay_api::ClientSettings;
use extrelay_engine::routing::{
    DEFAULT_STORAGE_URL_TEMPLATE, DEFAULT_TRANSFORMATION_URL_TEMPLATE, ROUTE_PLACEHOLDER, VALUE_TYPE_PLACEHOLDER,
};
use extrelay_engine::{FunctionRoutes, RelayRoutes, StorageRoutes, TransformationRoutes};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "EXTRELAY_CONFIG_PATH";
pub const HOST_ENV: &str = "EXTRELAY_HOST";
pub const PORT_ENV: &str = "EXTRELAY_PORT";
pub const CALLBACK_URL_ENV: &str = "EXTRELAY_CALLBACK_URL";
pub const LOG_LEVEL_ENV: &str = "EXTRELAY_LOG_LEVEL";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CALLBACK_URL: &str = "http://extension-transformation.default.svc.cluster.local/extension/transformation/callback";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Reasons a configuration is refused at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port cannot be zero")]
    ZeroPort,
    #[error("host cannot be empty")]
    EmptyHost,
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("{field} is not a valid URL ({value}): {reason}")]
    InvalidUrl { field: &'static str, value: String, reason: String },
    #[error("{field} must contain the {placeholder} placeholder")]
    MissingPlaceholder { field: &'static str, placeholder: &'static str },
    #[error("function {function:?} has an empty route")]
    EmptyRoute { function: String },
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
    #[error("invalid log level {0:?}; expected one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Complete runtime configuration of the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Callback address advertised to transformation services.
    pub callback_url: String,
    /// Storage adapter address; `{valueType}` is replaced by the lower-cased value type.
    pub storage_url_template: String,
    /// Transformation service address; `{route}` is replaced by the route segment.
    pub transformation_url_template: String,
    /// Function name to route segment.
    pub functions: FunctionRoutes,
    pub http: ClientSettings,
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            storage_url_template: DEFAULT_STORAGE_URL_TEMPLATE.to_string(),
            transformation_url_template: DEFAULT_TRANSFORMATION_URL_TEMPLATE.to_string(),
            functions: FunctionRoutes::default(),
            http: ClientSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// Load from `path` (or the default location), then apply environment overrides.
    ///
    /// A missing file at the default location yields the defaults. An explicit
    /// `path` must exist; an unreadable or malformed file is always an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                anyhow::ensure!(path.exists(), "relay config {} does not exist", path.display());
                Self::from_file(path)?
            }
            None => {
                let path = default_config_path();
                if path.exists() { Self::from_file(&path)? } else { Self::default() }
            }
        };
        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("read relay config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parse relay config {}", path.display()))
    }

    /// Overlay `EXTRELAY_*` variables. Unparseable ports are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(host) = env::var(HOST_ENV) {
            self.host = host;
        }
        if let Ok(port) = env::var(PORT_ENV)
            && let Ok(port) = port.parse::<u16>()
        {
            self.port = port;
        }
        if let Ok(callback_url) = env::var(CALLBACK_URL_ENV) {
            self.callback_url = callback_url;
        }
        if let Ok(log_level) = env::var(LOG_LEVEL_ENV) {
            self.log_level = log_level;
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address.parse().map_err(|error: std::net::AddrParseError| ConfigError::InvalidAddress {
            reason: error.to_string(),
            address,
        })
    }

    /// Address tables handed to the engine.
    pub fn routes(&self) -> RelayRoutes {
        RelayRoutes {
            storage: StorageRoutes::new(&self.storage_url_template),
            transformation: TransformationRoutes::new(&self.transformation_url_template),
            functions: self.functions.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        self.socket_addr()?;

        check_url("callbackUrl", &self.callback_url)?;
        check_template("storageUrlTemplate", &self.storage_url_template, VALUE_TYPE_PLACEHOLDER)?;
        check_template("transformationUrlTemplate", &self.transformation_url_template, ROUTE_PLACEHOLDER)?;

        if let Some((function, _)) = self.functions.iter().find(|(_, route)| route.trim().is_empty()) {
            return Err(ConfigError::EmptyRoute {
                function: function.to_string(),
            });
        }

        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "http.requestTimeoutSecs",
            });
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "http.connectTimeoutSecs",
            });
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|error| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: error.to_string(),
    })
}

fn check_template(field: &'static str, template: &str, placeholder: &'static str) -> Result<(), ConfigError> {
    if !template.contains(placeholder) {
        return Err(ConfigError::MissingPlaceholder { field, placeholder });
    }
    check_url(field, &template.replace(placeholder, "probe"))
}

/// Returns the default path for the relay configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("extrelay")
        .join("relay.json")
}
