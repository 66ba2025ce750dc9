//! Posting platform abstraction and implementations
//!
//! A platform publishes one composed message per call and reports a
//! platform-specific post ID back. The bot only ever posts; reading
//! timelines, threads, or media is out of scope.

use async_trait::async_trait;

use crate::error::Result;

pub mod twitter;

// Mock platform is available for all builds so integration tests can
// exercise the posting path without credentials or network access.
pub mod mock;

pub use twitter::TwitterClient;

/// Unified interface over posting APIs.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Publish a message and return the platform-specific post ID.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` when the credentials are
    /// rejected, `PlatformError::RateLimit` when the platform throttles
    /// the call, `PlatformError::Posting` when the content itself is
    /// refused (duplicate, forbidden), and `PlatformError::Network` for
    /// transport and server failures.
    async fn post(&self, message: &str) -> Result<String>;

    /// Check a message against platform rules before sending it.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Validation` if the message is empty or
    /// exceeds the platform's character limit.
    fn validate_content(&self, content: &str) -> Result<()>;

    /// Lowercase identifier for the platform (e.g. "twitter")
    fn name(&self) -> &str;

    /// Maximum message length, or `None` if the platform has no hard limit.
    fn character_limit(&self) -> Option<usize>;

    /// Whether the platform has everything it needs to post.
    fn is_configured(&self) -> bool;
}
