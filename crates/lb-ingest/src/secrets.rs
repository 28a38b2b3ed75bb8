//! Secret retrieval
//!
//! Services read their credentials once at startup. Local development skips
//! retrieval entirely, either through `secrets.local` in the configuration
//! or the `LB_LOCAL` environment variable.

use crate::error::{IngestError, IngestResult};
use lb_core::SecretsConfig;
use std::collections::BTreeMap;

/// Environment variable that marks a local run
pub const LOCAL_ENV_VAR: &str = "LB_LOCAL";

/// Source of named secrets
pub trait SecretProvider: Send + Sync {
    /// Provider identifier for logging
    fn provider_name(&self) -> &'static str;

    fn get(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretProvider;

impl SecretProvider for EnvSecretProvider {
    fn provider_name(&self) -> &'static str {
        "environment"
    }

    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Returns true if secret retrieval should be skipped
pub fn is_local(config: &SecretsConfig) -> bool {
    config.local
        || std::env::var(LOCAL_ENV_VAR)
            .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(false)
}

/// Fetch every configured secret.
///
/// Fails with [`IngestError::MissingSecret`] naming every absent secret.
/// Returns an empty map for local runs.
pub fn load_secrets(
    provider: &dyn SecretProvider,
    config: &SecretsConfig,
) -> IngestResult<BTreeMap<String, String>> {
    if is_local(config) {
        log::info!("Running locally, skipping secret retrieval");
        return Ok(BTreeMap::new());
    }

    let mut found = BTreeMap::new();
    let mut missing = Vec::new();
    for name in &config.names {
        match provider.get(name) {
            Some(value) => {
                found.insert(name.clone(), value);
            }
            None => missing.push(name.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingSecret { names: missing });
    }

    log::debug!(
        "Loaded {} secrets from {}",
        found.len(),
        provider.provider_name()
    );
    Ok(found)
}
