// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;

use crate::cache::token::TokenState;
use crate::cache::token_manager::TokenManager;
use crate::config::settings::{EbayConfig, PricingConfig};
use crate::resilience::retry::{RetrySettings, RetryingHttpClient};
use crate::sinks::credential_store::{CredentialStore, MemoryCredentialStore};
use crate::sources::listing::ListingClient;
use crate::sources::oauth2::OAuth2RefreshSource;

pub const SAFETY_MARGIN_SECS: u64 = 300;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Millisecond delays so retry tests stay fast.
pub fn fast_retry(attempts: u32) -> RetrySettings {
    RetrySettings {
        attempts,
        base_delay_ms: 10,
        max_delay_ms: 50,
        jitter_factor: 0.0,
        max_retry_after_ms: 5_000,
    }
}

pub fn http_client(attempts: u32) -> RetryingHttpClient {
    RetryingHttpClient::new(fast_retry(attempts), Duration::from_secs(5)).expect("reqwest client")
}

pub fn ebay_config(token_url: &str, browse_api_url: &str) -> EbayConfig {
    EbayConfig {
        app_id: "app-id".to_owned(),
        client_secret: "app-secret".to_owned(),
        token_url: token_url.to_owned(),
        browse_api_url: browse_api_url.to_owned(),
        ..EbayConfig::default()
    }
}

pub fn token_expiring_in(access_token: &str, seconds: i64) -> TokenState {
    TokenState::new(
        access_token.to_owned(),
        "rt-1".to_owned(),
        Utc::now() + chrono::Duration::seconds(seconds),
    )
}

pub fn build_manager<S: CredentialStore>(store: S, ebay: &EbayConfig, attempts: u32) -> TokenManager<S> {
    let refresher = OAuth2RefreshSource::new(ebay, ebay.app_credentials(), http_client(attempts));
    TokenManager::new(store, refresher, SAFETY_MARGIN_SECS)
}

/// Manager over an in-memory store already holding `token`, loaded and ready.
pub async fn loaded_manager(
    token: Option<TokenState>,
    ebay: &EbayConfig,
    attempts: u32,
) -> (TokenManager<MemoryCredentialStore>, MemoryCredentialStore) {
    let store = MemoryCredentialStore::new(token);
    let manager = build_manager(store.clone(), ebay, attempts);
    manager.load().await.expect("load");
    (manager, store)
}

pub async fn listing_client(
    token: TokenState,
    ebay: &EbayConfig,
    attempts: u32,
) -> (ListingClient<MemoryCredentialStore>, MemoryCredentialStore) {
    let (manager, store) = loaded_manager(Some(token), ebay, attempts).await;
    let client = ListingClient::new(
        std::sync::Arc::new(manager),
        http_client(attempts),
        ebay,
        PricingConfig::default(),
    );
    (client, store)
}
