//! Google Cloud Storage client
//!
//! A thin client over the GCS JSON API covering exactly what the bot
//! needs: verify the bucket, download an object, upload an object. The
//! endpoint is configurable so tests and emulators can stand in for the
//! real service.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::storage::BlobStore;

/// Handle to one GCS bucket.
pub struct GcsBucket {
    http: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl GcsBucket {
    /// Create a handle without contacting the backend.
    ///
    /// `token` is an OAuth2 bearer token sent on every request when
    /// present; public buckets work without one.
    pub fn new(endpoint: String, bucket: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            token,
        }
    }

    /// Build a handle from configuration and verify the bucket exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be
    /// reached, the bucket does not exist, or the token file cannot be
    /// read.
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let token = match &config.token_file {
            Some(path) => Some(read_token(path)?),
            None => None,
        };

        let bucket = Self::new(config.endpoint.clone(), config.bucket.clone(), token);
        bucket.verify().await?;
        Ok(bucket)
    }

    /// Check that the bucket exists and is reachable.
    pub async fn verify(&self) -> Result<()> {
        let url = format!("{}/storage/v1/b/{}", self.endpoint, self.bucket);

        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to reach storage: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(
                StorageError::Unavailable(format!("Bucket not found: {}", self.bucket)).into(),
            );
        }

        if !response.status().is_success() {
            return Err(StorageError::Unavailable(format!(
                "Bucket check failed for {}: HTTP {}",
                self.bucket,
                response.status()
            ))
            .into());
        }

        debug!("bucket {} verified", self.bucket);
        Ok(())
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn object_url(&self, object: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            self.bucket,
            urlencoding::encode(object)
        )
    }

    fn upload_url(&self, object: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint,
            self.bucket,
            urlencoding::encode(object)
        )
    }
}

fn read_token(path: &str) -> Result<String> {
    let expanded = shellexpand::full(path).map_err(|e| {
        StorageError::Unavailable(format!("Failed to expand token file path: {}", e))
    })?;

    let token = std::fs::read_to_string(expanded.as_ref())
        .map_err(|e| StorageError::Unavailable(format!("Failed to read token file {}: {}", path, e)))?
        .trim()
        .to_string();

    if token.is_empty() {
        return Err(StorageError::Unavailable(format!("Token file is empty: {}", path)).into());
    }

    Ok(token)
}

#[async_trait]
impl BlobStore for GcsBucket {
    async fn download(&self, object: &str) -> std::result::Result<String, StorageError> {
        let url = format!("{}?alt=media", self.object_url(object));

        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to reach storage: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(object.to_string()));
        }

        if !response.status().is_success() {
            return Err(StorageError::Unavailable(format!(
                "Download of {} failed: HTTP {}",
                object,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to read {}: {}", object, e)))
    }

    async fn upload(&self, object: &str, body: &str) -> std::result::Result<(), StorageError> {
        let url = self.upload_url(object);

        let response = self
            .request(self.http.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Failed to reach storage: {}", e)))?;

        if !response.status().is_success() {
            return Err(StorageError::Unavailable(format!(
                "Upload of {} failed: HTTP {}",
                object,
                response.status()
            )));
        }

        debug!("uploaded {} ({} bytes)", object, body.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "gcs"
    }
}
