//! Message replay checking.
//!
//! A replay checker remembers the IDs of processed messages for a replay
//! window and rejects an ID seen again within that window. Re-submitting a
//! response is a common way to try to reuse somebody else's authentication.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::MessageReplayError;

/// Replay detection for message IDs.
pub trait MessageReplayChecker: Send + Sync {
    /// Checks whether the given message ID has been seen within the replay
    /// window, and records it.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageReplayError`] when the ID is a replay.
    fn check_replay(&self, id: &str) -> Result<(), MessageReplayError>;
}

/// Default replay window (5 minutes).
const DEFAULT_EXPIRATION_SECS: i64 = 300;

/// Cache size above which expired entries are pruned after an insert.
const MAX_CACHE_SIZE: usize = 1000;

/// In-memory [`MessageReplayChecker`].
///
/// Suitable for single-process deployments; a clustered service needs a
/// checker backed by a shared store instead. Entries expire after the
/// configured replay window and are pruned once the cache grows past 1000
/// entries.
pub struct InMemoryReplayChecker {
    expiration: Duration,
    cache: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Default for InMemoryReplayChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReplayChecker {
    /// Creates a checker with the default 5 minute replay window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_expiration(Duration::seconds(DEFAULT_EXPIRATION_SECS))
    }

    /// Creates a checker with the given replay window. A negative window is
    /// treated as zero, which disables replay detection.
    #[must_use]
    pub fn with_expiration(expiration: Duration) -> Self {
        Self {
            expiration: expiration.max(Duration::zero()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of IDs currently cached, expired entries included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Whether no IDs are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_cache().is_empty()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still usable.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MessageReplayChecker for InMemoryReplayChecker {
    fn check_replay(&self, id: &str) -> Result<(), MessageReplayError> {
        let now = Utc::now();
        let mut cache = self.lock_cache();

        if let Some(expires) = cache.get(id) {
            if now < *expires {
                tracing::info!(%id, "replay of message ID detected");
                return Err(MessageReplayError::new(id));
            }
        }
        cache.insert(id.to_string(), now + self.expiration);

        if cache.len() > MAX_CACHE_SIZE {
            cache.retain(|_, expires| now < *expires);
            tracing::debug!(size = cache.len(), "pruned expired replay cache entries");
        }
        Ok(())
    }
}
