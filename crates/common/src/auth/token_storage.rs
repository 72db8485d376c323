//! Encrypted in-memory token cache
//!
//! Tokens are serialized and sealed with AES-256-GCM under a key generated
//! when the storage is created. The key is never persisted, so a cache does
//! not survive the process. Expiry metadata is kept in clear next to each
//! ciphertext so sweeps do not need to decrypt.
//!
//! There is no background timer: expired entries are evicted lazily by
//! [`SecureTokenStorage::get`] or eagerly by
//! [`SecureTokenStorage::cleanup_expired`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::traits::TokenStore;
use super::types::StoredOAuthToken;
use crate::crypto::{EncryptedData, EncryptionService};
use crate::error::{SdkError, SdkResult};
use crate::time::{shared, SharedClock, SystemClock};

#[derive(Debug)]
struct SealedToken {
    expires_at: DateTime<Utc>,
    payload: EncryptedData,
}

/// Concurrent, encrypted, process-local token cache
#[derive(Debug)]
pub struct SecureTokenStorage {
    entries: DashMap<String, SealedToken>,
    encryption: EncryptionService,
    clock: SharedClock,
}

impl Default for SecureTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureTokenStorage {
    /// Storage using the system clock and a fresh random key
    pub fn new() -> Self {
        Self::with_clock(shared(SystemClock))
    }

    /// Storage reading expiry against `clock`
    pub fn with_clock(clock: SharedClock) -> Self {
        Self { entries: DashMap::new(), encryption: EncryptionService::random(), clock }
    }

    /// Store `token` under `key`, replacing any previous value
    ///
    /// # Errors
    /// `InvalidArgument` for an empty key, `Crypto` if sealing fails.
    pub fn store(&self, key: &str, token: &StoredOAuthToken) -> SdkResult<()> {
        SdkError::require_non_empty("key", key)?;
        let payload = self.encryption.encrypt_json(token)?;
        self.entries
            .insert(key.to_string(), SealedToken { expires_at: token.expires_at, payload });
        debug!(key, expires_at = %token.expires_at, "stored token");
        Ok(())
    }

    /// Fetch the token under `key`
    ///
    /// Returns `None` for unknown keys. An expired entry is evicted and
    /// reported as `None`.
    ///
    /// # Errors
    /// `Crypto` or `Serialization` if the sealed value cannot be opened.
    pub fn get(&self, key: &str) -> SdkResult<Option<StoredOAuthToken>> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > now => {
                return self.encryption.decrypt_json(&entry.payload).map(Some);
            }
            Some(_) => true,
        };

        // The read guard is released before removal to avoid deadlocking the shard.
        if expired {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
            debug!(key, "evicted expired token on read");
        }
        Ok(None)
    }

    /// Remove the token under `key`, returning whether one was present
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// True iff `expires_at <= now + threshold`; absent keys count as
    /// expiring
    pub fn is_expiring_soon(&self, key: &str, threshold: Duration) -> bool {
        let now = self.clock.now();
        let Some(entry) = self.entries.get(key) else {
            return true;
        };
        match chrono::Duration::from_std(threshold) {
            Ok(threshold) => {
                now.checked_add_signed(threshold).map_or(true, |limit| entry.expires_at <= limit)
            }
            Err(_) => true,
        }
    }

    /// Evict every expired entry, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "swept expired tokens");
        }
        removed
    }

    /// Number of entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tokens are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl TokenStore for SecureTokenStorage {
    async fn put(&self, key: &str, token: &StoredOAuthToken) -> SdkResult<()> {
        self.store(key, token)
    }

    async fn fetch(&self, key: &str) -> SdkResult<Option<StoredOAuthToken>> {
        self.get(key)
    }

    async fn evict(&self, key: &str) -> bool {
        self.remove(key)
    }

    async fn needs_refresh(&self, key: &str, threshold: Duration) -> bool {
        self.is_expiring_soon(key, threshold)
    }
}
