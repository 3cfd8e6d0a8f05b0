//! Token store trait.
//!
//! Defines the interface for the durable key-value store holding the
//! session's tokens between runs.

use super::model::PersistedTokens;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store for persisted session tokens.
///
/// Only the session manager writes to a token store. The HTTP layer reads it
/// to attach the bearer header.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Writing all four values at once (never a partial set)
/// - Treating `clear` on an empty store as success
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Loads the persisted tokens.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(tokens))`: Tokens are stored
    /// - `Ok(None)`: Nothing is stored
    /// - `Err(_)`: The store could not be read
    async fn load(&self) -> Result<Option<PersistedTokens>>;

    /// Replaces the stored tokens.
    async fn save(&self, tokens: &PersistedTokens) -> Result<()>;

    /// Removes every stored value.
    async fn clear(&self) -> Result<()>;

    /// Convenience accessor for the stored access token.
    async fn access_token(&self) -> Option<String> {
        self.load()
            .await
            .ok()
            .flatten()
            .map(|tokens| tokens.access_token)
    }
}
