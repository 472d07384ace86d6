use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::settings::ServiceConfig;
use crate::error::CredentialError;
use crate::sinks::env_file::EnvFileCredentialStore;

/// Resolve the credential file path, then fill application credentials the YAML
/// left empty from that file.
pub async fn initiate_default_values(mut config: ServiceConfig) -> Result<ServiceConfig, CredentialError> {
    if let Ok(cwd) = std::env::current_dir() {
        let resolved = resolve_credentials_path(&config.credentials.path, &cwd).await;
        config.credentials.path = resolved.display().to_string();
    }

    if !config.ebay.app_id.is_empty() && !config.ebay.client_secret.is_empty() {
        return Ok(config);
    }

    let store = EnvFileCredentialStore::new(&config.credentials.path);
    if let Some(from_file) = store.load_app_credentials().await? {
        debug!("application credentials taken from '{}'", store.path().display());
        if config.ebay.app_id.is_empty() {
            config.ebay.app_id = from_file.app_id;
        }
        if config.ebay.client_secret.is_empty() {
            config.ebay.client_secret = from_file.client_secret;
        }
    }
    Ok(config)
}

/// A relative path is looked up in `base` and then in each parent directory;
/// the first existing match wins. Absolute or unmatched paths stay as configured.
pub async fn resolve_credentials_path(configured: &str, base: &Path) -> PathBuf {
    let configured_path = Path::new(configured);
    if configured_path.is_absolute() {
        return configured_path.to_path_buf();
    }
    for dir in base.ancestors() {
        let candidate = dir.join(configured_path);
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            debug!("credential file found at '{}'", candidate.display());
            return candidate;
        }
    }
    configured_path.to_path_buf()
}
