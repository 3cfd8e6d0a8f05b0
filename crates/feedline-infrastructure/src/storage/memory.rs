//! In-memory token store for ephemeral runs and tests.

use async_trait::async_trait;
use feedline_core::error::Result;
use feedline_core::session::{PersistedTokens, TokenStore};
use tokio::sync::RwLock;

/// Token store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<PersistedTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `tokens`.
    pub fn with_tokens(tokens: PersistedTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<PersistedTokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn save(&self, tokens: &PersistedTokens) -> Result<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
