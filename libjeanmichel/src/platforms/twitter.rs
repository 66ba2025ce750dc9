//! Twitter platform implementation
//!
//! Posts statuses through the v1.1 REST API using OAuth 1.0a with
//! long-lived static credentials (consumer key/secret plus access
//! token/secret). Each request is signed with HMAC-SHA1 per RFC 5849;
//! there is no session to establish or refresh.

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TwitterConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

/// Standard tweet length limit
const CHARACTER_LIMIT: usize = 280;

/// The four static credentials required for OAuth 1.0a signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

/// Twitter API client
pub struct TwitterClient {
    http: Client,
    api_base: String,
    credentials: TwitterCredentials,
}

impl TwitterClient {
    /// Create a client against a specific API base URL.
    pub fn new(api_base: String, credentials: TwitterCredentials) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Create a client from configuration.
    ///
    /// Reads the four credentials from the configured TOML file.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the credentials file is
    /// missing, unreadable, or not valid TOML.
    pub fn from_config(config: &TwitterConfig) -> Result<Self> {
        let path = shellexpand::full(&config.credentials_file).map_err(|e| {
            PlatformError::Authentication(format!("Failed to expand credentials file path: {}", e))
        })?;

        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PlatformError::Authentication(format!(
                "Failed to read Twitter credentials file {}: {}",
                config.credentials_file, e
            ))
        })?;

        let credentials: TwitterCredentials = toml::from_str(&content).map_err(|e| {
            PlatformError::Authentication(format!(
                "Failed to parse Twitter credentials file {}: {}",
                config.credentials_file, e
            ))
        })?;

        Ok(Self::new(config.api_base.clone(), credentials))
    }

    fn authorization_header(&self, method: &str, url: &str, body_params: &[(&str, &str)]) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        oauth::authorization_header(&self.credentials, method, url, body_params, &nonce, &timestamp)
    }
}

#[async_trait]
impl Platform for TwitterClient {
    async fn post(&self, message: &str) -> Result<String> {
        self.validate_content(message)?;

        let url = format!("{}/1.1/statuses/update.json", self.api_base);
        let authorization = self.authorization_header("POST", &url, &[("status", message)]);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .form(&[("status", message)])
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("Failed to reach Twitter: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_rejection(status.as_u16(), &body).into());
        }

        let parsed: UpdateResponse = response.json().await.map_err(|e| {
            PlatformError::Posting(format!("Failed to parse Twitter response: {}", e))
        })?;

        info!("posted status {}", parsed.id_str);
        Ok(parsed.id_str)
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        let char_count = content.chars().count();
        if char_count > CHARACTER_LIMIT {
            return Err(PlatformError::Validation(format!(
                "Content exceeds Twitter's {} character limit (current: {} characters)",
                CHARACTER_LIMIT, char_count
            ))
            .into());
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "twitter"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(CHARACTER_LIMIT)
    }

    fn is_configured(&self) -> bool {
        !self.credentials.api_key.is_empty() && !self.credentials.access_token.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    id_str: String,
}

/// Map a non-success HTTP status from the posting endpoint to a
/// `PlatformError`.
///
/// - 401 → `Authentication` (signature or token rejected)
/// - 403 → `Posting` (duplicate status, write access revoked)
/// - 429 → `RateLimit`
/// - 5xx → `Network`
/// - anything else → `Posting`
fn map_rejection(status: u16, body: &str) -> PlatformError {
    match status {
        401 => PlatformError::Authentication(format!(
            "Twitter rejected the request (HTTP 401): {}. \
             Check that all four credentials are current.",
            body
        )),
        403 => PlatformError::Posting(format!("Twitter refused the status (HTTP 403): {}", body)),
        429 => PlatformError::RateLimit(format!(
            "Twitter rate limit exceeded (HTTP 429): {}. \
             The scheduler will try again on its next tick.",
            body
        )),
        500..=599 => {
            PlatformError::Network(format!("Twitter server error (HTTP {}): {}", status, body))
        }
        _ => PlatformError::Posting(format!("Twitter error (HTTP {}): {}", status, body)),
    }
}

/// OAuth 1.0a HMAC-SHA1 request signing (RFC 5849).
mod oauth {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use hmac::{Hmac, Mac};
    use sha1::Sha1;

    use super::TwitterCredentials;

    /// RFC 3986 percent-encoding; unreserved characters are
    /// `A-Z a-z 0-9 - . _ ~`.
    fn encode(s: &str) -> String {
        urlencoding::encode(s).into_owned()
    }

    /// The normalized parameter string: every key and value encoded,
    /// pairs sorted, joined `k=v` with `&`.
    fn parameter_string(params: &[(&str, &str)]) -> String {
        let mut encoded: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort();

        encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `METHOD&encoded-url&encoded-parameter-string`
    pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
        format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(url),
            encode(&parameter_string(params))
        )
    }

    /// Sign the base string with `consumer_secret&token_secret`.
    pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> String {
        let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));

        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(base.as_bytes());

        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Build the full `Authorization: OAuth ...` header value.
    pub fn authorization_header(
        credentials: &TwitterCredentials,
        method: &str,
        url: &str,
        body_params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let oauth_params: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", credentials.api_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", credentials.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut all_params = oauth_params.clone();
        all_params.extend_from_slice(body_params);

        let base = signature_base_string(method, url, &all_params);
        let signature = sign(
            &base,
            &credentials.api_secret,
            &credentials.access_token_secret,
        );

        let mut header_params: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| (k.to_string(), encode(v)))
            .collect();
        header_params.push(("oauth_signature".to_string(), encode(&signature)));
        header_params.sort();

        let fields = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {}", fields)
    }

}
