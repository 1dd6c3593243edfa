//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables `worksbot.toml` / `config.toml`
//! - `yaml-config`: enables `worksbot.yaml`, `worksbot.yml`, `config.yaml`, `config.yml`
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`worksbot.{profile}.toml`)
//! 3. Main config file (`worksbot.toml`)
//! 4. Plain platform variables (`API_ID`, `SERVER_ID`, `PRIVATE_KEY`,
//!    `CONSUMER_KEY`, `BOT_NO`, `PORT`, `IMAGE_FILE_HOST`)
//! 5. Prefixed variables (`WORKSBOT_*`)
//! 6. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! | Variable | Key |
//! |----------|-----|
//! | `API_ID` | `works.api_id` |
//! | `SERVER_ID` | `works.server_id` |
//! | `PRIVATE_KEY` | `works.private_key` |
//! | `CONSUMER_KEY` | `works.consumer_key` |
//! | `BOT_NO` | `works.bot_no` |
//! | `PORT` | `server.port` |
//! | `IMAGE_FILE_HOST` | `dispatch.image_host` |
//! | `WORKSBOT_LOGGING__LEVEL=debug` | `logging.level` |
//! | `WORKSBOT_WORKS__ENDPOINT_VERSION=v2` | `works.endpoint_version` |
//! | `WORKSBOT_WORKS__API_ID=12345` | `works.api_id` (kept as text) |
//!
//! # Example
//!
//! ```rust,ignore
//! use worksbot_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./deploy/worksbot.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::WorksBotConfig;

/// Environment variable selecting the profile.
pub const PROFILE_ENV: &str = "WORKSBOT_PROFILE";

/// Prefix of nested configuration variables.
pub const ENV_PREFIX: &str = "WORKSBOT_";

/// Plain variables the platform tooling sets, with the key each maps to.
pub const LEGACY_ENV: &[(&str, &str)] = &[
    ("API_ID", "works.api_id"),
    ("SERVER_ID", "works.server_id"),
    ("PRIVATE_KEY", "works.private_key"),
    ("CONSUMER_KEY", "works.consumer_key"),
    ("BOT_NO", "works.bot_no"),
    ("PORT", "server.port"),
    ("IMAGE_FILE_HOST", "dispatch.image_host"),
];

/// Keys whose environment values are taken verbatim instead of being
/// parsed, so numeric ids like `0042` survive as text.
const TEXT_KEYS: &[&str] = &[
    "logging.file_path",
    "server.host",
    "server.callback_path",
    "server.health_path",
    "works.api_id",
    "works.server_id",
    "works.consumer_key",
    "works.private_key",
    "works.private_key_path",
    "works.callback_secret",
    "works.api_base_url",
    "works.auth_base_url",
    "dispatch.image_host",
];

fn is_text_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("dispatch.replies.") || TEXT_KEYS.contains(&key.as_str())
}

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `WORKSBOT_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Merged right over the built-in defaults.
    base: Figment,
    /// Single-key overrides, merged last.
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            base: Figment::new(),
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds `<user config dir>/worksbot` to the search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("worksbot"))
        } else {
            self
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Replaces the built-in defaults. Files and environment still apply.
    pub fn merge(mut self, config: WorksBotConfig) -> Self {
        self.base = self.base.merge(Serialized::defaults(config));
        self
    }

    /// Overrides a single dotted key, e.g. `set("server.port", 8080)`.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    pub fn load(self) -> ConfigResult<WorksBotConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: WorksBotConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            port = config.server.port,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(WorksBotConfig::default()));
        figment = figment.merge(std::mem::take(&mut self.base));

        if let Some(path) = self.config_file.take() {
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, &path)?;
            } else {
                return Err(ConfigError::FileNotFound(path));
            }
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            figment = Self::merge_legacy_env(figment)?;

            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            let env = Env::prefixed(ENV_PREFIX).ignore(&["PROFILE"]).split("__");
            for (key, value) in env.clone().filter(|key| is_text_key(key.as_str())).iter() {
                let key = key.as_str().to_ascii_lowercase();
                figment = figment.merge(Serialized::default(&key, value));
            }
            figment = figment.merge(env.filter(|key| !is_text_key(key.as_str())));
        }

        let overrides = std::mem::take(&mut self.overrides);
        Ok(figment.merge(overrides))
    }

    /// Merges the plain platform variables. Values stay strings except the
    /// numeric bot number and port.
    fn merge_legacy_env(mut figment: Figment) -> ConfigResult<Figment> {
        for (var, key) in LEGACY_ENV {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            trace!(var, key, "Mapping environment variable");
            figment = match *key {
                "works.bot_no" => {
                    let bot_no: u64 = value.trim().parse().map_err(|_| {
                        ConfigError::validation(format!("{var} must be a positive integer"))
                    })?;
                    figment.merge(Serialized::default(key, bot_no))
                }
                "server.port" => {
                    let port: u16 = value.trim().parse().map_err(|_| {
                        ConfigError::validation(format!("{var} must be a port number"))
                    })?;
                    figment.merge(Serialized::default(key, port))
                }
                _ => figment.merge(Serialized::default(key, value)),
            };
        }
        Ok(figment)
    }

    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("worksbot"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Tries `search_paths × base_names`, profile variant before base file.
    /// Stops at the first base file found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    figment = merge_fn(figment, &base_path);
                    return (figment, true);
                }
            }
        }
        (figment, false)
    }

    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["worksbot.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["worksbot.yaml", "worksbot.yml", "config.yaml", "config.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!(paths = ?search_paths, "No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads from the default locations with environment overrides.
pub fn load_config() -> ConfigResult<WorksBotConfig> {
    ConfigLoader::new().load()
}

/// Loads a specific file with environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<WorksBotConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
