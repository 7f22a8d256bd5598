//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `bmshub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use bmshub_adapter_remote_reqwest::GatewayConfig;
use bmshub_app::sync_scheduler::SyncSettings;
use bmshub_domain::id::WorkspaceId;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Remote control/status functions.
    pub remote: RemoteConfig,
    /// SmartThings API used to validate tokens.
    pub smartthings: SmartThingsConfig,
    /// Status polling.
    pub sync: SyncConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Where the control and status functions live.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Project base URL; functions are served under `/functions/v1/`.
    pub base_url: String,
    /// API key sent with every call.
    pub api_key: Option<String>,
    /// Deadline for a control request, in seconds.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SmartThingsConfig {
    pub api_base_url: String,
}

/// Integrations that can be polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationName {
    Brise,
    SmartThings,
}

/// Status polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Master switch for every sync loop.
    pub enabled: bool,
    /// Workspace to poll. Polling stays idle without one.
    pub workspace_id: Option<String>,
    /// Seconds between two polls.
    pub interval_secs: u64,
    /// Seconds before a status request is abandoned; `0` disables the limit.
    pub poll_timeout_secs: u64,
    /// Integrations to poll.
    pub integrations: Vec<IntegrationName>,
}

impl Config {
    /// Load configuration from `bmshub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("bmshub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BMSHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("BMSHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("BMSHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("BMSHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("BMSHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("BMSHUB_REMOTE_URL") {
            self.remote.base_url = val;
        }
        if let Ok(val) = std::env::var("BMSHUB_REMOTE_API_KEY") {
            self.remote.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("BMSHUB_WORKSPACE_ID") {
            self.sync.workspace_id = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "sync interval must be non-zero".to_string(),
            ));
        }
        if self.sync.poll_timeout_secs >= self.sync.interval_secs {
            return Err(ConfigError::Validation(
                "sync poll timeout must be shorter than the interval".to_string(),
            ));
        }
        self.remote_base_url()?;
        self.smartthings_api_url()?;
        self.workspace_id()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Deadline for control requests and credential probes.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_secs)
    }

    fn remote_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.remote.base_url).map_err(|err| ConfigError::InvalidUrl {
            field: "remote.base_url",
            source: err,
        })
    }

    /// Settings for the remote gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the base URL does not parse.
    pub fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        Ok(GatewayConfig {
            base_url: self.remote_base_url()?,
            api_key: self.remote.api_key.clone(),
            request_timeout: self.request_timeout(),
        })
    }

    /// Base URL of the SmartThings API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the URL does not parse.
    pub fn smartthings_api_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.smartthings.api_base_url).map_err(|err| ConfigError::InvalidUrl {
            field: "smartthings.api_base_url",
            source: err,
        })
    }

    /// The configured workspace, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a blank workspace id.
    pub fn workspace_id(&self) -> Result<Option<WorkspaceId>, ConfigError> {
        self.sync
            .workspace_id
            .as_deref()
            .map(WorkspaceId::new)
            .transpose()
            .map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// Timing of every sync loop.
    #[must_use]
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            period: Duration::from_secs(self.sync.interval_secs),
            poll_timeout: (self.sync.poll_timeout_secs > 0)
                .then(|| Duration::from_secs(self.sync.poll_timeout_secs)),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:bmshub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "bmshubd=info,bmshub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: None,
            request_timeout_secs: 15,
        }
    }
}

impl Default for SmartThingsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.smartthings.com".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workspace_id: None,
            interval_secs: 30,
            poll_timeout_secs: 25,
            integrations: vec![IntegrationName::Brise, IntegrationName::SmartThings],
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A URL setting does not parse.
    #[error("invalid URL in {field}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
