use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::cache::token::{TokenState, DEFAULT_TOKEN_TYPE};
use crate::config::settings::AppCredentials;
use crate::error::CredentialError;
use crate::sinks::credential_store::CredentialStore;
use crate::utils::constants::*;

/// `KEY=value` text file (the `.env` layout written by the authorization script).
///
/// Reading follows dotenv syntax. Lines it does not own, comments included,
/// survive a save unchanged.
#[derive(Debug, Clone)]
pub struct EnvFileCredentialStore {
    path: PathBuf,
}

impl EnvFileCredentialStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Application id / secret if both keys are present.
    pub async fn load_app_credentials(&self) -> Result<Option<AppCredentials>, CredentialError> {
        let Some(content) = self.read().await? else {
            return Ok(None);
        };
        let entries = self.parse(&content)?;
        let credentials = AppCredentials {
            app_id: lookup(&entries, KEY_APP_ID).unwrap_or_default(),
            client_secret: lookup(&entries, KEY_CLIENT_SECRET).unwrap_or_default(),
        };
        Ok(credentials.is_complete().then_some(credentials))
    }

    async fn read(&self) -> Result<Option<String>, CredentialError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// `KEY=value` pairs as dotenv understands them; a repeated key keeps its last value.
    fn parse(&self, content: &str) -> Result<HashMap<String, String>, CredentialError> {
        dotenvy::from_read_iter(content.as_bytes())
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|e| CredentialError::Syntax {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn io_error(&self, e: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }

    /// tmp -> fsync -> 0600 -> rename
    async fn write_atomic(&self, content: &str) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await.map_err(|e| self.io_error(e))?;
        file.write_all(content.as_bytes()).await.map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.io_error(e))?;
        }

        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| self.io_error(e))
    }
}

impl CredentialStore for EnvFileCredentialStore {
    async fn load(&self) -> Result<Option<TokenState>, CredentialError> {
        let Some(content) = self.read().await? else {
            debug!("credential file '{}' does not exist", self.path.display());
            return Ok(None);
        };
        let entries = self.parse(&content)?;

        let access_token = lookup(&entries, KEY_ACCESS_TOKEN);
        let refresh_token = lookup(&entries, KEY_REFRESH_TOKEN);
        if access_token.is_none() && refresh_token.is_none() {
            return Ok(None);
        }

        // no recorded expiry: treat as already expired so the first use refreshes
        let expires_at = match lookup(&entries, KEY_EXPIRES_AT) {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| CredentialError::Malformed {
                    key: KEY_EXPIRES_AT.to_owned(),
                    value: raw.clone(),
                })?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };

        Ok(Some(TokenState {
            access_token: access_token.unwrap_or_default(),
            refresh_token: refresh_token.unwrap_or_default(),
            expires_at,
            token_type: lookup(&entries, KEY_TOKEN_TYPE).unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_owned()),
        }))
    }

    async fn save(&self, state: &TokenState) -> Result<(), CredentialError> {
        let existing = self.read().await?.unwrap_or_default();
        let updates = [
            (KEY_ACCESS_TOKEN, state.access_token.clone()),
            (KEY_REFRESH_TOKEN, state.refresh_token.clone()),
            (KEY_EXPIRES_AT, state.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            (KEY_TOKEN_TYPE, state.token_type.clone()),
        ];
        let content = render_with_updates(&existing, &updates);
        self.write_atomic(&content).await?;
        info!("tokens written to '{}'", self.path.display());
        Ok(())
    }
}

fn lookup(entries: &HashMap<String, String>, key: &str) -> Option<String> {
    entries.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Single quotes keep `#`, `$` and `\` literal for dotenv readers; values holding a
/// single quote fall back to escaped double quotes.
fn quote_value(value: &str) -> String {
    if !value.contains('\'') && !value.contains('\n') {
        return format!("'{}'", value);
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Replace owned keys in place, append the missing ones, keep everything else.
pub fn render_with_updates(existing: &str, updates: &[(&str, String)]) -> String {
    let mut written = vec![false; updates.len()];
    let mut lines: Vec<String> = Vec::new();

    for line in existing.lines() {
        let key = line
            .trim()
            .strip_prefix("export ")
            .unwrap_or(line.trim())
            .split_once('=')
            .map(|(k, _)| k.trim());
        match key.and_then(|k| updates.iter().position(|(u, _)| *u == k)) {
            Some(idx) if !written[idx] => {
                lines.push(format!("{}={}", updates[idx].0, quote_value(&updates[idx].1)));
                written[idx] = true;
            }
            // duplicate of an owned key: drop it so the file has one definition
            Some(_) => {}
            None => lines.push(line.to_owned()),
        }
    }
    for (idx, (key, value)) in updates.iter().enumerate() {
        if !written[idx] {
            lines.push(format!("{}={}", key, quote_value(value)));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
