//! Server token issuance.
//!
//! Auth flow:
//!   1. Sign a JWT `{iss: server_id, iat, exp: iat + 60}` with RS256.
//!   2. POST it as a `jwt-bearer` assertion to `{auth_base}/b/{api_id}/server/token`.
//!   3. Use the returned `access_token` as the bearer for message pushes.
//!
//! With caching on, a token is reused until two minutes before it expires;
//! with caching off, every call goes through the full exchange.

use async_trait::async_trait;
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use ring::rand::SystemRandom;
use ring::signature::{self, RsaKeyPair};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{TokenError, TokenResult};
use crate::settings::ApiSettings;

/// Lifetime of the signed assertion, in seconds.
pub const ASSERTION_TTL_SECS: i64 = 60;
/// Tokens are refreshed this many seconds before they expire.
pub const REFRESH_MARGIN_SECS: i64 = 120;

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Provides bearer tokens for outbound calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for at least the next request.
    async fn token(&self) -> TokenResult<String>;
}

/// A fixed token, for tests and pre-issued credentials.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> TokenResult<String> {
        Ok(self.0.clone())
    }
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        now + REFRESH_MARGIN_SECS < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenResponse {
    /// `expires_in` arrives as a number or a numeric string; 3600 when absent.
    fn expires_in(&self) -> i64 {
        match &self.expires_in {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
        .unwrap_or(3600)
    }
}

/// Issues server tokens through the JWT bearer exchange.
pub struct JwtTokenIssuer {
    client: reqwest::Client,
    token_url: String,
    server_id: String,
    key_pair: RsaKeyPair,
    rng: SystemRandom,
    cache: Option<RwLock<Option<CachedToken>>>,
}

impl JwtTokenIssuer {
    /// Creates an issuer. Fails fast when the private key cannot be parsed.
    pub fn new(settings: &ApiSettings, client: reqwest::Client) -> TokenResult<Self> {
        let key_pair = parse_private_key(&settings.private_key)?;
        Ok(Self {
            client,
            token_url: settings.token_url(),
            server_id: settings.server_id.clone(),
            key_pair,
            rng: SystemRandom::new(),
            cache: settings.cache_tokens.then(|| RwLock::new(None)),
        })
    }

    /// Builds a signed assertion issued at `now` (unix seconds).
    pub fn assertion(&self, now: i64) -> TokenResult<String> {
        let header = json!({"alg": "RS256", "typ": "JWT"});
        let claims = json!({
            "iss": self.server_id,
            "iat": now,
            "exp": now + ASSERTION_TTL_SECS,
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string().as_bytes());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        let message = format!("{header_b64}.{claims_b64}");

        let mut sig = vec![0u8; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(
                &signature::RSA_PKCS1_SHA256,
                &self.rng,
                message.as_bytes(),
                &mut sig,
            )
            .map_err(|_| TokenError::Signing)?;

        Ok(format!("{message}.{}", URL_SAFE_NO_PAD.encode(&sig)))
    }

    /// Runs the exchange, bypassing the cache.
    async fn exchange(&self) -> TokenResult<CachedToken> {
        let now = chrono::Utc::now().timestamp();
        let assertion = self.assertion(now)?;

        info!(url = %self.token_url, "Requesting server token");
        let resp = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| TokenError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TokenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| TokenError::Decode(e.to_string()))?;
        let expires_in = token.expires_in();
        debug!(expires_in, "Server token obtained");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + expires_in,
        })
    }
}

#[async_trait]
impl TokenSource for JwtTokenIssuer {
    async fn token(&self) -> TokenResult<String> {
        let Some(cache) = &self.cache else {
            return Ok(self.exchange().await?.token);
        };

        // Fast path
        {
            let cached = cache.read().await;
            if let Some(c) = cached.as_ref()
                && c.is_fresh(chrono::Utc::now().timestamp())
            {
                return Ok(c.token.clone());
            }
        }

        // Slow path, re-checked under the write lock
        let mut cached = cache.write().await;
        if let Some(c) = cached.as_ref()
            && c.is_fresh(chrono::Utc::now().timestamp())
        {
            return Ok(c.token.clone());
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

/// Parses a PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`) PEM key.
///
/// Escaped `\n` sequences, as found in single-line environment variables,
/// are accepted.
pub fn parse_private_key(pem: &str) -> TokenResult<RsaKeyPair> {
    let pem = pem.replace("\\n", "\n");
    let der = pem_to_der(&pem)?;

    let parsed = if pem.contains("RSA PRIVATE KEY") {
        RsaKeyPair::from_der(&der)
    } else {
        RsaKeyPair::from_pkcs8(&der)
    };
    parsed.map_err(|e| TokenError::InvalidKey(e.to_string()))
}

fn pem_to_der(pem: &str) -> TokenResult<Vec<u8>> {
    let b64: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect();

    if b64.is_empty() {
        return Err(TokenError::InvalidKey("empty key".to_string()));
    }

    STANDARD
        .decode(&b64)
        .map_err(|e| TokenError::InvalidKey(format!("invalid PEM base64: {e}")))
}
