//! Settings handed to the transports.
//!
//! These are plain values built once by the runtime from its configuration;
//! the transports never read the environment themselves.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base URL of the messaging API.
pub const DEFAULT_API_BASE_URL: &str = "https://apis.worksmobile.com";
/// Default base URL of the auth API.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://authapi.worksmobile.com";

/// Which push endpoint generation to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointVersion {
    /// `/r/{api_id}/message/v1/bot/{bot_no}/message/push`
    #[default]
    V1,
    /// `/{api_id}/message/sendMessage/v2`
    V2,
}

impl EndpointVersion {
    /// Builds the push URL for this version.
    pub fn push_url(self, api_base_url: &str, api_id: &str, bot_no: u64) -> String {
        let base = api_base_url.trim_end_matches('/');
        match self {
            EndpointVersion::V1 => {
                format!("{base}/r/{api_id}/message/v1/bot/{bot_no}/message/push")
            }
            EndpointVersion::V2 => format!("{base}/{api_id}/message/sendMessage/v2"),
        }
    }
}

/// Credentials and endpoints for outbound calls.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub api_id: String,
    pub server_id: String,
    pub consumer_key: String,
    pub bot_no: u64,
    /// PKCS#8 RSA private key, PEM encoded.
    pub private_key: String,
    pub api_base_url: String,
    pub auth_base_url: String,
    pub endpoint_version: EndpointVersion,
    pub timeout: Duration,
    /// Reuse tokens until shortly before they expire.
    pub cache_tokens: bool,
}

impl ApiSettings {
    /// Settings against the public endpoints with defaults for everything
    /// but the credentials.
    pub fn new(
        api_id: impl Into<String>,
        server_id: impl Into<String>,
        consumer_key: impl Into<String>,
        bot_no: u64,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            api_id: api_id.into(),
            server_id: server_id.into(),
            consumer_key: consumer_key.into(),
            bot_no,
            private_key: private_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            endpoint_version: EndpointVersion::default(),
            timeout: Duration::from_secs(30),
            cache_tokens: true,
        }
    }

    /// Token endpoint URL.
    pub fn token_url(&self) -> String {
        format!(
            "{}/b/{}/server/token",
            self.auth_base_url.trim_end_matches('/'),
            self.api_id
        )
    }

    /// Push endpoint URL for the configured version.
    pub fn push_url(&self) -> String {
        self.endpoint_version
            .push_url(&self.api_base_url, &self.api_id, self.bot_no)
    }
}

/// Paths and secret for the callback listener.
#[derive(Debug, Clone)]
pub struct IngressSettings {
    /// Path receiving callback POSTs.
    pub callback_path: String,
    /// Path answering liveness GETs.
    pub health_path: String,
    /// HMAC key for the callback signature.
    pub secret: String,
}

impl IngressSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            callback_path: "/callback".to_string(),
            health_path: "/".to_string(),
            secret: secret.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_urls() {
        let mut settings = ApiSettings::new("API", "SRV", "KEY", 42, "");
        assert_eq!(
            settings.push_url(),
            "https://apis.worksmobile.com/r/API/message/v1/bot/42/message/push"
        );

        settings.endpoint_version = EndpointVersion::V2;
        settings.api_base_url = "http://localhost:8080/".to_string();
        assert_eq!(
            settings.push_url(),
            "http://localhost:8080/API/message/sendMessage/v2"
        );
    }

    #[test]
    fn test_token_url() {
        let settings = ApiSettings::new("API", "SRV", "KEY", 42, "");
        assert_eq!(
            settings.token_url(),
            "https://authapi.worksmobile.com/b/API/server/token"
        );
    }

    #[test]
    fn test_endpoint_version_serde() {
        let v: EndpointVersion = serde_json::from_str(r#""v2""#).unwrap();
        assert_eq!(v, EndpointVersion::V2);
    }
}
