//! Counter and lexicon model
//!
//! The bot's entire persistent state is two blobs: a counter holding the
//! number of fragments already posted, and a lexicon holding one message
//! fragment per line. This module parses both and composes the outgoing
//! message.

use crate::error::{BotError, Result};

/// Parse the counter blob.
///
/// The counter is stored as plain decimal text. Anything else is corrupted
/// state, not a transient failure.
pub fn parse_counter(raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| BotError::InvalidState(format!("counter blob is not a number: {:?}", raw)))
}

/// The ordered list of message fragments, read-only from the bot's side.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<String>,
}

impl Lexicon {
    /// Split the lexicon blob into fragments, one per line.
    ///
    /// A trailing newline does not produce a final empty fragment; blank
    /// lines in the middle of the blob are kept as-is.
    pub fn parse(raw: &str) -> Self {
        Self {
            entries: raw.lines().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Whether the counter has consumed every fragment.
    ///
    /// A counter beyond the lexicon length also counts as exhausted; the
    /// bot never posts from an out-of-range position.
    pub fn is_exhausted(&self, counter: usize) -> bool {
        counter >= self.entries.len()
    }
}

/// Compose the outgoing message from the configured prefix and a fragment.
pub fn compose_message(prefix: &str, fragment: &str) -> String {
    format!("{} {}", prefix, fragment)
}
