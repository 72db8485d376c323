//! Traits for token caching
//!
//! [`TokenStore`] abstracts where acquired OAuth tokens are kept so the
//! OAuth client can be tested with, or extended to, other backends.

use std::time::Duration;

use async_trait::async_trait;

use super::types::StoredOAuthToken;
use crate::error::SdkResult;

/// Keyed cache of OAuth tokens
///
/// Implementations must never return a token past its `expires_at` and must
/// be safe to share across tasks.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store (or overwrite) the token under `key`
    ///
    /// # Errors
    /// Returns error if the key is empty or the token cannot be protected
    async fn put(&self, key: &str, token: &StoredOAuthToken) -> SdkResult<()>;

    /// Fetch an unexpired token
    ///
    /// # Errors
    /// Returns error if the stored value cannot be decoded
    async fn fetch(&self, key: &str) -> SdkResult<Option<StoredOAuthToken>>;

    /// Remove the token under `key`, returning whether one existed
    async fn evict(&self, key: &str) -> bool;

    /// Whether the token is absent or expires within `threshold`
    async fn needs_refresh(&self, key: &str, threshold: Duration) -> bool;
}
