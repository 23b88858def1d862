//! Secret resolution — the single source of truth for runtime secrets.
//!
//! Grounded on `mqk-config::secrets`: callers invoke [`resolve_secrets`] once
//! at startup; the returned [`ResolvedSecrets`] is passed into constructors
//! rather than letting `std::env::var` calls scatter across the codebase.
//! `Debug` redacts every secret value; error messages reference the env var
//! **name**, never its value.

use anyhow::{bail, Result};
use std::fmt;

/// Names of the environment variables this agent reads. Kept as named
/// constants (not inline string literals) so `resolve_secrets` and its error
/// messages cannot drift out of sync.
pub mod env_names {
    pub const AGENT_PRIVATE_KEY: &str = "AGENT_PRIVATE_KEY";
    pub const RPC_URL: &str = "RPC_URL";
    pub const STABLECOIN_ADDRESS: &str = "STABLECOIN_ADDRESS";
    pub const LEGACY_CONTRACT_ADDRESS: &str = "LEGACY_CONTRACT_ADDRESS";
    pub const CURRENT_CONTRACT_ADDRESS: &str = "CURRENT_CONTRACT_ADDRESS";
    pub const SOCIAL_API_KEY: &str = "SOCIAL_API_KEY";
    pub const LLM_API_KEY: &str = "LLM_API_KEY";
    pub const HISTORICAL_DATA_API_KEY: &str = "HISTORICAL_DATA_API_KEY";
    pub const PAUSE_POOL_CREATION: &str = "PAUSE_POOL_CREATION";
    pub const NEW_POOL_VARIANT: &str = "NEW_POOL_VARIANT";
    pub const AGENT_ROLE: &str = "AGENT_ROLE";
    pub const CHAIN_ID: &str = "CHAIN_ID";
    pub const ENCLAVE_MODE: &str = "ENCLAVE_MODE";
}

/// Secrets resolved from the environment. Never log or `Display` this type
/// directly — use `Debug`, which redacts every field.
#[derive(Clone)]
pub struct ResolvedSecrets {
    /// Hex-encoded ECDSA private key controlling the oracle wallet. Absent
    /// when `ENCLAVE_MODE` supplies a key internally.
    pub agent_private_key: Option<String>,
    pub social_api_key: Option<String>,
    pub llm_api_key: String,
    pub historical_data_api_key: Option<String>,
}

impl fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("agent_private_key", &self.agent_private_key.as_ref().map(|_| "<REDACTED>"))
            .field("social_api_key", &self.social_api_key.as_ref().map(|_| "<REDACTED>"))
            .field("llm_api_key", &"<REDACTED>")
            .field(
                "historical_data_api_key",
                &self.historical_data_api_key.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Resolve secrets for the given enclave mode. When `enclave_mode` is
/// `true`, `AGENT_PRIVATE_KEY` is not read (the key is derived inside the
/// enclave instead) and its absence is not an error.
pub fn resolve_secrets(enclave_mode: bool) -> Result<ResolvedSecrets> {
    let agent_private_key = if enclave_mode {
        None
    } else {
        Some(require_env(env_names::AGENT_PRIVATE_KEY)?)
    };

    Ok(ResolvedSecrets {
        agent_private_key,
        social_api_key: optional_env(env_names::SOCIAL_API_KEY),
        llm_api_key: require_env(env_names::LLM_API_KEY)?,
        historical_data_api_key: optional_env(env_names::HISTORICAL_DATA_API_KEY),
    })
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => bail!("missing required env var {name}"),
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_all_secret_fields() {
        let secrets = ResolvedSecrets {
            agent_private_key: Some("0xdeadbeef".to_string()),
            social_api_key: Some("sk-social".to_string()),
            llm_api_key: "sk-llm".to_string(),
            historical_data_api_key: None,
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("0xdeadbeef"));
        assert!(!rendered.contains("sk-social"));
        assert!(!rendered.contains("sk-llm"));
        assert!(rendered.contains("REDACTED"));
    }
}
