use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::cache::token::TokenState;
use crate::error::{AuthError, Error, Result};
use crate::observability::metrics::get_metrics;
use crate::sinks::credential_store::CredentialStore;
use crate::sources::oauth2::OAuth2RefreshSource;

/// Owner of the in-memory token.
///
/// Every read and every refresh goes through one async mutex. A refresh runs while
/// the lock is held, so callers arriving during it queue up behind it; the
/// `generation` counter lets them recognise that a refresh finished while they
/// waited and take its outcome instead of starting another one.
pub struct TokenManager<S: CredentialStore> {
    store: S,
    refresher: OAuth2RefreshSource,
    safety_margin_seconds: u64,
    state: Mutex<ManagerState>,
    generation: AtomicU64,
}

#[derive(Default)]
struct ManagerState {
    token: Option<TokenState>,
    last_outcome: Option<Result<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshMode {
    WhenExpiring,
    Always,
}

impl<S: CredentialStore> TokenManager<S> {
    pub fn new(store: S, refresher: OAuth2RefreshSource, safety_margin_seconds: u64) -> Self {
        Self {
            store,
            refresher,
            safety_margin_seconds,
            state: Mutex::new(ManagerState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn safety_margin_seconds(&self) -> u64 {
        self.safety_margin_seconds
    }

    /// Read the credential store into memory. Returns whether a token was found.
    pub async fn load(&self) -> Result<bool> {
        let loaded = self.store.load().await?;
        let found = loaded.is_some();
        if let Some(token) = &loaded {
            info!(expires_at = %token.expires_at, "credentials loaded");
            get_metrics().await.token_expiry_unix.set(token.expires_at.timestamp());
        } else {
            warn!("credential store holds no token");
        }
        let mut guard = self.state.lock().await;
        guard.token = loaded;
        guard.last_outcome = None;
        Ok(found)
    }

    /// Snapshot of the in-memory token. Call [`ensure_valid`](Self::ensure_valid) first.
    pub async fn current_token(&self) -> Result<TokenState> {
        self.state
            .lock()
            .await
            .token
            .clone()
            .ok_or_else(|| AuthError::NotInitialized.into())
    }

    /// Refresh if the token is inside the safety margin. Returns whether a refresh happened.
    pub async fn ensure_valid(&self) -> Result<bool> {
        self.refresh_with(RefreshMode::WhenExpiring).await
    }

    /// Refresh regardless of expiry, e.g. after the API refused the token.
    pub async fn force_refresh(&self) -> Result<()> {
        self.refresh_with(RefreshMode::Always).await.map(|_| ())
    }

    async fn refresh_with(&self, mode: RefreshMode) -> Result<bool> {
        let observed = self.generation.load(Ordering::Acquire);
        let mut guard = self.state.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            // a refresh completed while this caller was queued: share its outcome
            if let Some(outcome) = guard.last_outcome.clone() {
                return outcome.map(|_| true);
            }
        }

        let current = guard.token.clone().ok_or(AuthError::NotInitialized)?;
        if mode == RefreshMode::WhenExpiring && !current.is_expiring(self.safety_margin_seconds) {
            return Ok(false);
        }

        info!(
            expires_at = %current.expires_at,
            forced = mode == RefreshMode::Always,
            "refreshing access token"
        );
        let outcome = self.refresh_locked(&mut guard, &current).await;
        guard.last_outcome = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        outcome.map(|_| true)
    }

    async fn refresh_locked(&self, state: &mut ManagerState, current: &TokenState) -> Result<()> {
        let metrics = get_metrics().await;
        let next = match self.refresher.refresh(current).await {
            Ok(next) => next,
            Err(e) => {
                metrics.token_refreshes.with_label_values(&[failure_label(&e)]).inc();
                error!("token refresh failed: {e}");
                return Err(e);
            }
        };

        state.token = Some(next.clone());
        metrics.token_refreshes.with_label_values(&["success"]).inc();
        metrics.token_expiry_unix.set(next.expires_at.timestamp());
        info!(expires_at = %next.expires_at, "access token refreshed");

        self.store.save(&next).await.inspect_err(|e| {
            error!("refreshed token could not be persisted: {e}");
        })?;
        Ok(())
    }
}

fn failure_label(err: &Error) -> &'static str {
    match err {
        Error::Auth(AuthError::RefreshRejected { .. }) => "rejected",
        Error::Auth(AuthError::RefreshUnavailable(_)) => "unavailable",
        Error::Auth(AuthError::NotInitialized) => "not_initialized",
        Error::Parsing(_) => "malformed",
        _ => "error",
    }
}
