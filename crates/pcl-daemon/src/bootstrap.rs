//! Assembles the real [`Controller`](pcl_controller::Controller) from
//! environment configuration, grounded on `mqk-daemon`'s `AppState::new`
//! composing its sub-engines once at startup — generalized here to a much
//! larger dependency graph (chain client, risk engine, evidence fetcher,
//! LLM auditor, registry snapshot, audit log).

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use pcl_audit::AuditWriter;
use pcl_cache::{RateLimiter, ReadCache};
use pcl_chain::{build_provider, ChainClient, ContractAddresses};
use pcl_config::{resolve_secrets, AgentConfig};
use pcl_controller::{Controller, ControllerConfig};
use pcl_evidence::EvidenceFetcher;
use pcl_oracle::{AttestationRecorder, EvidenceAuditor, LlmAuditor};
use pcl_registry::PoolRegistry;
use pcl_risk::engine::RiskEngine;
use pcl_risk::fetchers::{CryptoPriceFetcher, GasFeeFetcher, WeatherFetcher};
use pcl_social::FakeSocialClient;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Where the registry snapshot and audit log live on disk, read from
/// environment so an operator can point multiple agent instances at
/// distinct state directories.
pub struct StatePaths {
    pub registry_snapshot: PathBuf,
    pub audit_log: PathBuf,
}

impl StatePaths {
    fn from_env() -> Self {
        let dir = std::env::var("PCL_STATE_DIR").unwrap_or_else(|_| "./pcl-state".to_string());
        StatePaths {
            registry_snapshot: PathBuf::from(&dir).join("registry.json"),
            audit_log: PathBuf::from(&dir).join("audit.jsonl"),
        }
    }
}

/// Everything the daemon's heartbeat loop and HTTP surface need: the
/// assembled controller plus the config it was built from (for
/// `config_hash` logging and status reporting) and where its state lives.
pub struct Bootstrapped {
    pub controller: Controller,
    pub config: AgentConfig,
    pub paths: StatePaths,
}

/// Build the full agent out of environment configuration. No test double
/// anywhere in this path except [`FakeSocialClient`] — `pcl-social` has no
/// network-backed implementation of its own (social platform adapters are
/// an external collaborator, specified only at the interface).
pub async fn bootstrap() -> Result<Bootstrapped> {
    let config = AgentConfig::from_env().context("load AgentConfig")?;
    let secrets = resolve_secrets(config.enclave_mode).context("resolve secrets")?;
    let paths = StatePaths::from_env();

    let Some(private_key) = secrets.agent_private_key.as_deref() else {
        bail!("AGENT_PRIVATE_KEY is required outside enclave mode");
    };
    let provider = build_provider(&config.rpc_url, private_key).context("build chain provider")?;
    let addresses = ContractAddresses {
        legacy: parse_optional_address(config.contracts.legacy.as_deref(), "LEGACY_CONTRACT_ADDRESS")?,
        current: parse_optional_address(config.contracts.current.as_deref(), "CURRENT_CONTRACT_ADDRESS")?,
        stablecoin: parse_address(&config.contracts.stablecoin, "STABLECOIN_ADDRESS")?,
    };
    let chain = Arc::new(ChainClient::new(provider, addresses, config.chain_id));

    let risk_engine = RiskEngine::new(vec![
        Arc::new(WeatherFetcher::default()),
        Arc::new(CryptoPriceFetcher::new(
            reqwest::Client::new(),
            secrets.historical_data_api_key.clone(),
            std::env::var("CRYPTO_PRICE_API_URL").unwrap_or_else(|_| "https://api.coinbase.com".to_string()),
        )),
        Arc::new(GasFeeFetcher),
    ]);

    let evidence_fetcher = EvidenceFetcher::new(config.enclave_mode).context("build evidence fetcher")?;

    let auditor: Arc<dyn EvidenceAuditor> = Arc::new(
        LlmAuditor::new(
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            secrets.llm_api_key.clone(),
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        )
        .context("build LLM auditor")?,
    );

    let social = Arc::new(FakeSocialClient::new(
        std::env::var("AGENT_SOCIAL_HANDLE").unwrap_or_else(|_| "pcl-agent".to_string()),
    ));

    let registry = pcl_registry::load(&paths.registry_snapshot).context("load registry snapshot")?;

    let writer = AuditWriter::new(&paths.audit_log, true).context("open audit log")?;
    let attestation = AttestationRecorder::new(writer, Uuid::new_v4());

    let mut controller_config = ControllerConfig::default();
    controller_config.pause_pool_creation = config.pause_pool_creation;
    if let Some(handle) = std::env::var("AGENT_SOCIAL_HANDLE").ok() {
        controller_config.own_social_handle = handle;
    }

    let controller = Controller {
        chain: chain.clone(),
        cache: Arc::new(ReadCache::with_default_ttl()),
        rate_limiter: Arc::new(RateLimiter::with_default_delay()),
        risk_engine: Arc::new(risk_engine),
        evidence_fetcher: Arc::new(evidence_fetcher),
        auditor,
        social,
        registry: Arc::new(RwLock::new(registry)),
        attestation: Arc::new(Mutex::new(attestation)),
        new_pool_variant: config.new_pool_variant,
        oracle_armed: Arc::new(AtomicBool::new(true)),
        not_suspended: Arc::new(AtomicBool::new(true)),
        chain_write_lock: Arc::new(Mutex::new(())),
        config: controller_config,
    };

    Ok(Bootstrapped { controller, config, paths })
}

fn parse_address(raw: &str, env_name: &str) -> Result<Address> {
    raw.parse::<Address>()
        .with_context(|| format!("{env_name} is not a valid address: {raw}"))
}

fn parse_optional_address(raw: Option<&str>, env_name: &str) -> Result<Option<Address>> {
    raw.map(|r| parse_address(r, env_name)).transpose()
}
