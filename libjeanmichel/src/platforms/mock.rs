//! Mock platform implementation for testing
//!
//! Configurable stand-in for a posting API. The call counters and the
//! posted-message log live behind `Arc`s, so tests keep a clone of the
//! `MockConfig` and inspect it after handing the platform to the code
//! under test.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

/// Configuration and shared observation points for `MockPlatform`.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name reported by `name()`
    pub name: String,

    /// Whether posting should succeed
    pub post_succeeds: bool,

    /// Error returned when posting fails
    pub post_error: Option<PlatformError>,

    /// Character limit for validation
    pub character_limit: Option<usize>,

    /// Whether the platform reports itself as configured
    pub is_configured: bool,

    /// Number of times post has been called
    pub post_call_count: Arc<Mutex<usize>>,

    /// Messages that have been posted, in order
    pub posted_messages: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            post_succeeds: true,
            post_error: None,
            character_limit: None,
            is_configured: true,
            post_call_count: Arc::new(Mutex::new(0)),
            posted_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockConfig {
    pub fn post_call_count(&self) -> usize {
        *self.post_call_count.lock().unwrap()
    }

    pub fn posted_messages(&self) -> Vec<String> {
        self.posted_messages.lock().unwrap().clone()
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A platform that accepts every post.
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A platform that rejects every post with the given error.
    pub fn post_failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_succeeds: false,
            post_error: Some(error),
            ..Default::default()
        })
    }

    /// Shared handle for inspecting calls after the platform is moved.
    pub fn config(&self) -> MockConfig {
        self.config.clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn post(&self, message: &str) -> Result<String> {
        *self.config.post_call_count.lock().unwrap() += 1;

        self.validate_content(message)?;

        if self.config.post_succeeds {
            let mut posted = self.config.posted_messages.lock().unwrap();
            posted.push(message.to_string());
            Ok(format!("{}:mock-{}", self.config.name, posted.len()))
        } else {
            let error = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| PlatformError::Posting("Mock posting failed".to_string()));
            Err(error.into())
        }
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        if content.is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        if let Some(limit) = self.config.character_limit {
            let char_count = content.chars().count();
            if char_count > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds {} character limit (current: {} characters)",
                    limit, char_count
                ))
                .into());
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured
    }
}
