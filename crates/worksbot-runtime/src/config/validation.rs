//! Configuration validation utilities.
//!
//! Log levels, formats and endpoint versions are closed enums, so unknown
//! values already fail while loading. The checks here cover what the types
//! cannot express.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    DispatchConfig, LogOutput, LoggingConfig, ServerConfig, WorksBotConfig, WorksConfig,
};

/// Validates the entire configuration.
pub fn validate_config(config: &WorksBotConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_server_config(&config.server)?;
    validate_works_config(&config.works)?;
    validate_dispatch_config(&config.dispatch)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

fn validate_server_config(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.is_empty() {
        return Err(ConfigError::missing_field("server.host"));
    }
    validate_port(server.port)?;
    validate_path(&server.callback_path)?;
    validate_path(&server.health_path)?;
    Ok(())
}

fn validate_works_config(works: &WorksConfig) -> ConfigResult<()> {
    require("works.api_id", &works.api_id)?;
    require("works.server_id", &works.server_id)?;
    require("works.consumer_key", &works.consumer_key)?;

    if works.bot_no == 0 {
        return Err(ConfigError::validation(
            "works.bot_no must be greater than 0",
        ));
    }

    if !works.has_private_key() {
        return Err(ConfigError::missing_field(
            "works.private_key or works.private_key_path",
        ));
    }

    validate_url(&works.api_base_url)?;
    validate_url(&works.auth_base_url)?;

    if works.timeout_secs == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }

    Ok(())
}

fn validate_dispatch_config(dispatch: &DispatchConfig) -> ConfigResult<()> {
    // Template images are only referenced when templates can be selected.
    if dispatch.enable_templates {
        validate_url(&dispatch.image_host)?;
    }
    Ok(())
}

fn require(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing_field(field));
    }
    Ok(())
}

/// Validates an http(s) URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}

fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation(format!(
            "Path must start with '/': {path}"
        )));
    }
    Ok(())
}
