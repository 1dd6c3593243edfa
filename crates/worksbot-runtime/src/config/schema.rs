//! Configuration schema definitions.
//!
//! ```text
//! WorksBotConfig
//! ├── logging    level, format, output, span events, per-module filters
//! ├── server     listener address and routes
//! ├── works      platform credentials and endpoints
//! └── dispatch   template switch, image host, reply texts
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use worksbot_core::{DispatchFeatures, Replies};
use worksbot_transport::settings::{DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL};
use worksbot_transport::{ApiSettings, EndpointVersion, IngressSettings};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorksBotConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub works: WorksConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::validation(format!("unknown log level '{other}'"))),
        }
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Appends to `logging.file_path`.
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Required when `output = "file"`.
    pub file_path: Option<PathBuf>,
    pub thread_ids: bool,
    /// Include file name and line number.
    pub file_location: bool,
    pub span_events: SpanEventConfig,
    /// Per-module levels, e.g. `worksbot_transport = "debug"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Server
// =============================================================================

/// Callback listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub callback_path: String,
    pub health_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            callback_path: "/callback".to_string(),
            health_path: "/".to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Works platform
// =============================================================================

/// Platform credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksConfig {
    pub api_id: String,
    pub server_id: String,
    pub consumer_key: String,
    pub bot_no: u64,
    /// Inline PEM. Literal `\n` sequences are accepted.
    pub private_key: Option<String>,
    /// PEM file, used when `private_key` is unset.
    pub private_key_path: Option<PathBuf>,
    /// HMAC key for callback signatures. Defaults to `api_id`.
    pub callback_secret: Option<String>,
    pub endpoint_version: EndpointVersion,
    pub api_base_url: String,
    pub auth_base_url: String,
    pub timeout_secs: u64,
    pub cache_tokens: bool,
}

impl Default for WorksConfig {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            server_id: String::new(),
            consumer_key: String::new(),
            bot_no: 0,
            private_key: None,
            private_key_path: None,
            callback_secret: None,
            endpoint_version: EndpointVersion::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            timeout_secs: 30,
            cache_tokens: true,
        }
    }
}

impl WorksConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Key the callback signature is checked against.
    pub fn signature_secret(&self) -> &str {
        match self.callback_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => &self.api_id,
        }
    }

    /// Whether either key source is set.
    pub fn has_private_key(&self) -> bool {
        self.private_key.as_deref().is_some_and(|k| !k.is_empty())
            || self.private_key_path.is_some()
    }

    /// Returns the inline key, or reads `private_key_path`.
    pub fn load_private_key(&self) -> ConfigResult<String> {
        if let Some(key) = self.private_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        let path = self
            .private_key_path
            .as_ref()
            .ok_or_else(|| ConfigError::missing_field("works.private_key"))?;
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
        std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })
    }

    /// Builds the outbound transport settings.
    pub fn api_settings(&self) -> ConfigResult<ApiSettings> {
        let mut settings = ApiSettings::new(
            &self.api_id,
            &self.server_id,
            &self.consumer_key,
            self.bot_no,
            self.load_private_key()?,
        );
        settings.api_base_url.clone_from(&self.api_base_url);
        settings.auth_base_url.clone_from(&self.auth_base_url);
        settings.endpoint_version = self.endpoint_version;
        settings.timeout = self.timeout();
        settings.cache_tokens = self.cache_tokens;
        Ok(settings)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Reply behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Select catalog templates by token.
    pub enable_templates: bool,
    /// Base URL template images are served from.
    pub image_host: String,
    pub replies: Replies,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enable_templates: true,
            image_host: String::new(),
            replies: Replies::default(),
        }
    }
}

impl DispatchConfig {
    pub fn features(&self) -> DispatchFeatures {
        DispatchFeatures {
            enable_templates: self.enable_templates,
        }
    }
}

impl WorksBotConfig {
    /// Builds the ingress settings from the server and works sections.
    pub fn ingress_settings(&self) -> IngressSettings {
        IngressSettings {
            callback_path: self.server.callback_path.clone(),
            health_path: self.server.health_path.clone(),
            secret: self.works.signature_secret().to_string(),
        }
    }
}
