use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::token::TokenState;
use crate::error::CredentialError;

/// Durable home of the token fields.
///
/// `save` must be atomic: a crash mid-write leaves either the old or the new state.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<TokenState>, CredentialError>> + Send;

    fn save(&self, state: &TokenState) -> impl Future<Output = Result<(), CredentialError>> + Send;
}

/// In-process store for embedders that persist elsewhere, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    token: Option<TokenState>,
    saves: usize,
}

impl MemoryCredentialStore {
    pub fn new(token: Option<TokenState>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState { token, saves: 0 })),
        }
    }

    pub async fn save_count(&self) -> usize {
        self.inner.read().await.saves
    }

    pub async fn snapshot(&self) -> Option<TokenState> {
        self.inner.read().await.token.clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<TokenState>, CredentialError> {
        Ok(self.inner.read().await.token.clone())
    }

    async fn save(&self, state: &TokenState) -> Result<(), CredentialError> {
        let mut guard = self.inner.write().await;
        guard.token = Some(state.clone());
        guard.saves += 1;
        Ok(())
    }
}
