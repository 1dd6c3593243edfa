//! Message push client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::{debug, trace};

use worksbot_core::ReplyPayload;

use crate::error::{DeliveryError, DeliveryResult, TransportError, TransportResult};
use crate::settings::ApiSettings;

/// Header carrying the consumer key.
pub const CONSUMER_KEY_HEADER: &str = "consumerKey";

const JSON_UTF8: &str = "application/json;charset=UTF-8";

/// Builds the shared HTTP client.
pub fn build_http_client(timeout: Duration) -> TransportResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Client(e.to_string()))
}

/// Pushes reply payloads to the platform.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// Sends `payload` authenticated with `token`.
    async fn deliver(&self, payload: &ReplyPayload, token: &str) -> DeliveryResult<()>;
}

/// [`Deliver`] implementation for the messaging API.
#[derive(Debug, Clone)]
pub struct WorksApiClient {
    client: Client,
    push_url: String,
    consumer_key: String,
    bot_no: u64,
}

impl WorksApiClient {
    pub fn new(settings: &ApiSettings, client: Client) -> Self {
        Self {
            client,
            push_url: settings.push_url(),
            consumer_key: settings.consumer_key.clone(),
            bot_no: settings.bot_no,
        }
    }

    pub fn push_url(&self) -> &str {
        &self.push_url
    }
}

#[async_trait]
impl Deliver for WorksApiClient {
    async fn deliver(&self, payload: &ReplyPayload, token: &str) -> DeliveryResult<()> {
        let envelope = payload.clone().into_envelope(self.bot_no);
        trace!(url = %self.push_url, "Pushing message");

        let resp = self
            .client
            .post(&self.push_url)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))
            .header(CONSUMER_KEY_HEADER, &self.consumer_key)
            .bearer_auth(token)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(target_id = %payload.target.id(), status = status.as_u16(), "Message pushed");
        Ok(())
    }
}
