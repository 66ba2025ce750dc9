//! Posting orchestration
//!
//! One run is a single linear sequence of remote calls: read the counter,
//! read the lexicon, post the next fragment, advance the counter, write it
//! back. There are no retries and no compensation; a failure at any step
//! aborts the rest of the sequence.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{BotError, Result, StorageError};
use crate::lexicon::{compose_message, parse_counter, Lexicon};
use crate::platforms::{Platform, TwitterClient};
use crate::storage::{BlobStore, GcsBucket};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A fragment was posted and the counter advanced.
    Posted {
        /// Lexicon index that was posted
        index: usize,
        /// Platform-specific post ID
        post_id: String,
        /// The full message that went out
        message: String,
    },
    /// Every fragment has already been posted; nothing was sent.
    Exhausted {
        /// Total number of lexicon entries
        entries: usize,
    },
}

/// Single-run poster over one blob store and one posting platform.
///
/// Construction is per-invocation; nothing is shared across runs beyond
/// the two blobs in storage.
pub struct Poster {
    store: Box<dyn BlobStore>,
    platform: Box<dyn Platform>,
    counter_object: String,
    lexicon_object: String,
    prefix: String,
}

impl Poster {
    pub fn new(store: Box<dyn BlobStore>, platform: Box<dyn Platform>, config: &Config) -> Self {
        Self {
            store,
            platform,
            counter_object: config.storage.counter_object.clone(),
            lexicon_object: config.storage.lexicon_object.clone(),
            prefix: config.bot.prefix.clone(),
        }
    }

    /// Build the real storage and platform clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the bucket cannot be
    /// reached or does not exist, and `PlatformError::Authentication` if
    /// the Twitter credentials cannot be loaded.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = GcsBucket::open(&config.storage).await?;
        let platform = TwitterClient::from_config(&config.twitter)?;
        Ok(Self::new(Box::new(store), Box::new(platform), config))
    }

    /// Execute one posting run.
    ///
    /// The counter is written back only after a successful post. A failed
    /// counter write therefore leaves a posted message behind an
    /// unadvanced counter, and the same fragment is posted again on the
    /// next successful run; at-most-once delivery is not guaranteed.
    pub async fn run(&self) -> Result<RunOutcome> {
        let raw_counter = match self.store.download(&self.counter_object).await {
            Ok(raw) => raw,
            Err(StorageError::NotFound(object)) => {
                return Err(BotError::InvalidState(format!(
                    "counter blob missing: {}",
                    object
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let counter = parse_counter(&raw_counter)?;

        let raw_lexicon = self.store.download(&self.lexicon_object).await?;
        let lexicon = Lexicon::parse(&raw_lexicon);

        if lexicon.is_exhausted(counter) {
            warn!(
                "lexicon exhausted: counter {} with {} entries, nothing left to post",
                counter,
                lexicon.len()
            );
            return Ok(RunOutcome::Exhausted {
                entries: lexicon.len(),
            });
        }

        let fragment = lexicon.get(counter).ok_or_else(|| {
            BotError::InvalidState(format!("no lexicon entry at index {}", counter))
        })?;
        let message = compose_message(&self.prefix, fragment);

        let post_id = self.platform.post(&message).await?;
        info!(
            "posted entry {} to {}: {:?}",
            counter,
            self.platform.name(),
            message
        );

        let next = counter + 1;
        self.store
            .upload(&self.counter_object, &next.to_string())
            .await?;
        info!("counter advanced to {}", next);

        Ok(RunOutcome::Posted {
            index: counter,
            post_id,
            message,
        })
    }
}

/// Build a poster from configuration and execute one run.
///
/// This is the entry point used by the HTTP handler and the `--once`
/// mode; clients are constructed fresh for every invocation.
pub async fn run_once(config: &Config) -> Result<RunOutcome> {
    let poster = Poster::from_config(config).await?;
    poster.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::platforms::mock::MockPlatform;
    use crate::storage::MemoryStore;

    fn test_config() -> Config {
        Config::default_config()
    }

    fn poster_with(store: MemoryStore, platform: MockPlatform) -> Poster {
        Poster::new(Box::new(store), Box::new(platform), &test_config())
    }

    #[tokio::test]
    async fn test_run_posts_and_advances_counter() {
        let store = MemoryStore::new()
            .with_object("counter", "2")
            .with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let poster = poster_with(store.clone(), platform);
        let outcome = poster.run().await.unwrap();

        match outcome {
            RunOutcome::Posted {
                index,
                message,
                post_id,
            } => {
                assert_eq!(index, 2);
                assert_eq!(message, "Jean-Michel c");
                assert!(!post_id.is_empty());
            }
            other => panic!("Expected posted outcome, got {:?}", other),
        }

        assert_eq!(
            platform_handle.posted_messages(),
            vec!["Jean-Michel c".to_string()]
        );
        assert_eq!(store.object("counter"), Some("3".to_string()));
    }

    #[tokio::test]
    async fn test_run_exhausted_is_a_no_op() {
        let store = MemoryStore::new()
            .with_object("counter", "3")
            .with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let poster = poster_with(store.clone(), platform);
        let outcome = poster.run().await.unwrap();

        assert_eq!(outcome, RunOutcome::Exhausted { entries: 3 });
        assert_eq!(platform_handle.post_call_count(), 0);
        assert_eq!(store.object("counter"), Some("3".to_string()));
    }

    #[tokio::test]
    async fn test_run_counter_past_lexicon_is_a_no_op() {
        let store = MemoryStore::new()
            .with_object("counter", "7")
            .with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let poster = poster_with(store.clone(), platform);
        let outcome = poster.run().await.unwrap();

        assert_eq!(outcome, RunOutcome::Exhausted { entries: 3 });
        assert_eq!(platform_handle.post_call_count(), 0);
        assert_eq!(store.object("counter"), Some("7".to_string()));
    }

    #[tokio::test]
    async fn test_run_missing_counter_is_invalid_state() {
        let store = MemoryStore::new().with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let poster = poster_with(store, platform);
        let result = poster.run().await;

        match result {
            Err(BotError::InvalidState(msg)) => assert!(msg.contains("counter blob missing")),
            other => panic!("Expected invalid state error, got {:?}", other),
        }
        assert_eq!(platform_handle.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_non_numeric_counter_is_invalid_state() {
        let store = MemoryStore::new()
            .with_object("counter", "three")
            .with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::success("twitter");

        let poster = poster_with(store, platform);
        let result = poster.run().await;

        match result {
            Err(BotError::InvalidState(msg)) => assert!(msg.contains("not a number")),
            other => panic!("Expected invalid state error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_storage_down_aborts_before_posting() {
        let store = MemoryStore::new().fail_downloads();
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let poster = poster_with(store, platform);
        let result = poster.run().await;

        match result {
            Err(BotError::Storage(StorageError::Unavailable(_))) => {}
            other => panic!("Expected storage error, got {:?}", other),
        }
        assert_eq!(platform_handle.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_post_failure_leaves_counter_unchanged() {
        let store = MemoryStore::new()
            .with_object("counter", "1")
            .with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::post_failure(
            "twitter",
            PlatformError::RateLimit("too many requests".to_string()),
        );

        let poster = poster_with(store.clone(), platform);
        let result = poster.run().await;

        match result {
            Err(BotError::Platform(PlatformError::RateLimit(_))) => {}
            other => panic!("Expected rate limit error, got {:?}", other),
        }
        assert_eq!(store.object("counter"), Some("1".to_string()));
        assert_eq!(store.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_run_counter_write_failure_after_post() {
        // The hazard documented on run(): the post goes out, the write
        // fails, and the stored counter still points at the sent entry.
        let store = MemoryStore::new()
            .with_object("counter", "0")
            .with_object("lexicon", "a\nb")
            .fail_uploads();
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let poster = poster_with(store.clone(), platform);
        let result = poster.run().await;

        match result {
            Err(BotError::Storage(StorageError::Unavailable(_))) => {}
            other => panic!("Expected storage error, got {:?}", other),
        }

        assert_eq!(
            platform_handle.posted_messages(),
            vec!["Jean-Michel a".to_string()]
        );
        assert_eq!(store.object("counter"), Some("0".to_string()));
    }

    #[tokio::test]
    async fn test_run_empty_lexicon_with_zero_counter() {
        let store = MemoryStore::new()
            .with_object("counter", "0")
            .with_object("lexicon", "");
        let platform = MockPlatform::success("twitter");

        let poster = poster_with(store, platform);
        let outcome = poster.run().await.unwrap();

        assert_eq!(outcome, RunOutcome::Exhausted { entries: 0 });
    }

    #[tokio::test]
    async fn test_run_uses_configured_prefix() {
        let store = MemoryStore::new()
            .with_object("counter", "0")
            .with_object("lexicon", "Basquiat");
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        let mut config = test_config();
        config.bot.prefix = "Bonjour".to_string();
        let poster = Poster::new(Box::new(store), Box::new(platform), &config);

        poster.run().await.unwrap();
        assert_eq!(
            platform_handle.posted_messages(),
            vec!["Bonjour Basquiat".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sequential_runs_walk_the_lexicon() {
        let store = MemoryStore::new()
            .with_object("counter", "0")
            .with_object("lexicon", "a\nb\nc");
        let platform = MockPlatform::success("twitter");
        let platform_handle = platform.config();

        for _ in 0..4 {
            let poster = poster_with(
                store.clone(),
                MockPlatform::new(platform_handle.clone()),
            );
            poster.run().await.unwrap();
        }

        assert_eq!(
            platform_handle.posted_messages(),
            vec![
                "Jean-Michel a".to_string(),
                "Jean-Michel b".to_string(),
                "Jean-Michel c".to_string(),
            ]
        );
        assert_eq!(store.object("counter"), Some("3".to_string()));
    }
}
