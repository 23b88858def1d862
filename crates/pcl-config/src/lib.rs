//! pcl-config
//!
//! Environment-driven configuration and secret resolution for the agent.
//! Grounded on `mqk-config`: secrets are resolved once at startup through
//! [`secrets::resolve_secrets`] (never scattered `std::env::var` calls), and
//! the non-secret configuration is canonicalized and hashed the same way
//! `mqk-config::load_layered_yaml` hashes its merged YAML, so a
//! `config_hash` can be logged at startup for run correlation.

pub mod secrets;

use anyhow::{bail, Context, Result};
use pcl_schemas::ContractVariant;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub use secrets::{resolve_secrets, ResolvedSecrets};

/// Which role this process instance plays — determines the heartbeat
/// interval (roughly 5 minutes for the oracle role, 10 minutes for the
/// social-only role, which has no on-chain resolution duties to keep up
/// with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Oracle,
    SocialOnly,
}

impl AgentRole {
    pub fn heartbeat_interval_secs(self) -> u64 {
        match self {
            AgentRole::Oracle => 5 * 60,
            AgentRole::SocialOnly => 10 * 60,
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ORACLE" => Ok(AgentRole::Oracle),
            "SOCIAL_ONLY" => Ok(AgentRole::SocialOnly),
            other => bail!("unrecognized {}: {other}", secrets::env_names::AGENT_ROLE),
        }
    }
}

/// On-chain contract addresses. At least one of `legacy`/`current` must be
/// configured, or the agent has no pool contract to act on.
#[derive(Debug, Clone, Serialize)]
pub struct ContractAddresses {
    pub legacy: Option<String>,
    pub current: Option<String>,
    pub stablecoin: String,
}

/// Non-secret agent configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    pub role: AgentRole,
    pub rpc_url: String,
    pub chain_id: u64,
    pub contracts: ContractAddresses,
    pub new_pool_variant: ContractVariant,
    pub pause_pool_creation: bool,
    pub enclave_mode: bool,
}

// `AgentRole` and `ContractVariant` do not derive Serialize upstream in a way
// this crate controls for the hash computation below; render through a
// parallel serializable shape instead of deriving on the public type.
#[derive(Serialize)]
struct AgentConfigHashView {
    role: &'static str,
    rpc_url: String,
    chain_id: u64,
    legacy_contract: Option<String>,
    current_contract: Option<String>,
    stablecoin: String,
    new_pool_variant: &'static str,
    pause_pool_creation: bool,
    enclave_mode: bool,
}

impl AgentConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let role = AgentRole::parse(&require_env(secrets::env_names::AGENT_ROLE)?)?;
        let rpc_url = require_env(secrets::env_names::RPC_URL)?;
        let chain_id: u64 = require_env(secrets::env_names::CHAIN_ID)?
            .parse()
            .context("CHAIN_ID must be a positive integer")?;
        let stablecoin = require_env(secrets::env_names::STABLECOIN_ADDRESS)?;
        let legacy = optional_env(secrets::env_names::LEGACY_CONTRACT_ADDRESS);
        let current = optional_env(secrets::env_names::CURRENT_CONTRACT_ADDRESS);
        if legacy.is_none() && current.is_none() {
            bail!(
                "at least one of {} or {} must be configured",
                secrets::env_names::LEGACY_CONTRACT_ADDRESS,
                secrets::env_names::CURRENT_CONTRACT_ADDRESS
            );
        }

        let new_pool_variant_str = optional_env(secrets::env_names::NEW_POOL_VARIANT)
            .unwrap_or_else(|| "current".to_string());
        let new_pool_variant = match new_pool_variant_str.to_ascii_lowercase().as_str() {
            "legacy" => ContractVariant::Legacy,
            "current" => ContractVariant::Current,
            other => bail!(
                "unrecognized {}: {other}",
                secrets::env_names::NEW_POOL_VARIANT
            ),
        };
        if new_pool_variant == ContractVariant::Legacy && legacy.is_none() {
            bail!("NEW_POOL_VARIANT=legacy but LEGACY_CONTRACT_ADDRESS is not configured");
        }
        if new_pool_variant == ContractVariant::Current && current.is_none() {
            bail!("NEW_POOL_VARIANT=current but CURRENT_CONTRACT_ADDRESS is not configured");
        }

        let pause_pool_creation = bool_env(secrets::env_names::PAUSE_POOL_CREATION);
        let enclave_mode = bool_env(secrets::env_names::ENCLAVE_MODE);

        Ok(AgentConfig {
            role,
            rpc_url,
            chain_id,
            contracts: ContractAddresses {
                legacy,
                current,
                stablecoin,
            },
            new_pool_variant,
            pause_pool_creation,
            enclave_mode,
        })
    }

    /// Deterministic sha256 hash over the canonical (sorted-key) JSON
    /// rendering of this config, logged at startup for run correlation —
    /// the same role `mqk-config::load_layered_yaml`'s `config_hash` plays
    /// for its layered YAML config.
    pub fn config_hash(&self) -> String {
        let view = AgentConfigHashView {
            role: match self.role {
                AgentRole::Oracle => "oracle",
                AgentRole::SocialOnly => "social_only",
            },
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id,
            legacy_contract: self.contracts.legacy.clone(),
            current_contract: self.contracts.current.clone(),
            stablecoin: self.contracts.stablecoin.clone(),
            new_pool_variant: match self.new_pool_variant {
                ContractVariant::Legacy => "legacy",
                ContractVariant::Current => "current",
            },
            pause_pool_creation: self.pause_pool_creation,
            enclave_mode: self.enclave_mode,
        };
        let json = serde_json::to_string(&view).expect("config hash view always serializes");
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        hex::encode(hasher.finalize())
    }
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

fn bool_env(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("True")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variable tests must not run concurrently with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all() {
        for name in [
            secrets::env_names::AGENT_ROLE,
            secrets::env_names::RPC_URL,
            secrets::env_names::CHAIN_ID,
            secrets::env_names::STABLECOIN_ADDRESS,
            secrets::env_names::LEGACY_CONTRACT_ADDRESS,
            secrets::env_names::CURRENT_CONTRACT_ADDRESS,
            secrets::env_names::NEW_POOL_VARIANT,
            secrets::env_names::PAUSE_POOL_CREATION,
            secrets::env_names::ENCLAVE_MODE,
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn requires_at_least_one_contract_address() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        std::env::set_var(secrets::env_names::AGENT_ROLE, "ORACLE");
        std::env::set_var(secrets::env_names::RPC_URL, "https://rpc.example");
        std::env::set_var(secrets::env_names::CHAIN_ID, "8453");
        std::env::set_var(secrets::env_names::STABLECOIN_ADDRESS, "0xabc");

        let err = AgentConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("at least one"));
        clear_all();
    }

    #[test]
    fn config_hash_is_deterministic() {
        let cfg = AgentConfig {
            role: AgentRole::Oracle,
            rpc_url: "https://rpc.example".into(),
            chain_id: 8453,
            contracts: ContractAddresses {
                legacy: None,
                current: Some("0xcurrent".into()),
                stablecoin: "0xusdc".into(),
            },
            new_pool_variant: ContractVariant::Current,
            pause_pool_creation: false,
            enclave_mode: false,
        };
        assert_eq!(cfg.config_hash(), cfg.config_hash());
    }
}
