//! `ChainClient`: reads and writes against whichever of the two pool
//! contracts is configured, behind retry and a single-writer lock.

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use pcl_cache::{PoolKey, RateLimiter, ReadCache};
use pcl_schemas::chain_abi::{ICurrentInsurancePool, IErc20Stablecoin, ILegacyInsurancePool};
use pcl_schemas::{ContractVariant, Money, PoolId};

use crate::error::ChainError;
use crate::gateway::TxGateway;
use crate::retry::with_retry;
use crate::views::{CreatePoolParams, PoolAccounting, PoolParticipants, PoolView};

/// Build the wallet-filled HTTP provider used for every chain interaction.
/// One provider instance is shared by both contract variants (they live on
/// the same chain and are signed by the same oracle wallet).
pub fn build_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<impl Provider<Ethereum> + Clone, ChainError> {
    let signer: PrivateKeySigner = private_key
        .parse()
        .map_err(|e| ChainError::Config(format!("invalid AGENT_PRIVATE_KEY: {e}")))?;
    let wallet = EthereumWallet::from(signer);
    let url = rpc_url
        .parse()
        .map_err(|e| ChainError::Config(format!("invalid RPC_URL: {e}")))?;
    Ok(ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(url))
}

/// Which of the two contracts a call targets, resolved from configuration.
#[derive(Debug, Clone)]
pub struct ContractAddresses {
    pub legacy: Option<Address>,
    pub current: Option<Address>,
    pub stablecoin: Address,
}

/// The agent's single point of contact with the chain: read cache + pacing +
/// bounded retry + serialized writes, composed in front of the raw `sol!`
/// contract bindings.
pub struct ChainClient<P: Provider<Ethereum> + Clone> {
    provider: P,
    addresses: ContractAddresses,
    chain_id: u64,
    cache: ReadCache<PoolView>,
    limiter: RateLimiter,
    gateway: TxGateway,
}

impl<P: Provider<Ethereum> + Clone> ChainClient<P> {
    pub fn new(provider: P, addresses: ContractAddresses, chain_id: u64) -> Self {
        ChainClient {
            provider,
            addresses,
            chain_id,
            cache: ReadCache::with_default_ttl(),
            limiter: RateLimiter::with_default_delay(),
            gateway: TxGateway::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn contract_address(&self, variant: ContractVariant) -> Option<Address> {
        match variant {
            ContractVariant::Legacy => self.addresses.legacy,
            ContractVariant::Current => self.addresses.current,
        }
    }

    pub fn stablecoin_address(&self) -> Address {
        self.addresses.stablecoin
    }

    fn address_for(&self, variant: ContractVariant) -> Result<Address, ChainError> {
        match variant {
            ContractVariant::Legacy => self
                .addresses
                .legacy
                .ok_or_else(|| ChainError::Config("LEGACY_CONTRACT_ADDRESS not configured".into())),
            ContractVariant::Current => self
                .addresses
                .current
                .ok_or_else(|| ChainError::Config("CURRENT_CONTRACT_ADDRESS not configured".into())),
        }
    }

    /// Clear every cached read. Called once at the start of each heartbeat.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Self-verification: compare the configured oracle wallet against the
    /// contract's own `oracle()` getter, case-insensitively (both are
    /// `Address`, whose `Eq` impl already ignores checksum casing).
    pub async fn get_configured_oracle(&self, variant: ContractVariant) -> Result<Address, ChainError> {
        let addr = self.address_for(variant)?;
        self.limiter.wait().await;
        with_retry(|| async {
            match variant {
                ContractVariant::Legacy => {
                    let c = ILegacyInsurancePool::new(addr, &self.provider);
                    c.oracle()
                        .call()
                        .await
                        .map(|r| r._0)
                        .map_err(ChainError::from_alloy_contract_error)
                }
                ContractVariant::Current => {
                    let c = ICurrentInsurancePool::new(addr, &self.provider);
                    c.oracle()
                        .call()
                        .await
                        .map(|r| r._0)
                        .map_err(ChainError::from_alloy_contract_error)
                }
            }
        })
        .await
    }

    pub async fn get_next_pool_id(&self, variant: ContractVariant) -> Result<PoolId, ChainError> {
        let addr = self.address_for(variant)?;
        self.limiter.wait().await;
        let id: U256 = with_retry(|| async {
            match variant {
                ContractVariant::Legacy => {
                    let c = ILegacyInsurancePool::new(addr, &self.provider);
                    c.nextPoolId()
                        .call()
                        .await
                        .map(|r| r._0)
                        .map_err(ChainError::from_alloy_contract_error)
                }
                ContractVariant::Current => {
                    let c = ICurrentInsurancePool::new(addr, &self.provider);
                    c.nextPoolId()
                        .call()
                        .await
                        .map(|r| r._0)
                        .map_err(ChainError::from_alloy_contract_error)
                }
            }
        })
        .await?;
        u256_to_pool_id(id)
    }

    pub async fn get_pool(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolView, ChainError> {
        let key = PoolKey::new(variant, pool_id);
        self.cache
            .get_or_fetch(key, || self.fetch_pool(variant, pool_id))
            .await
    }

    async fn fetch_pool(&self, variant: ContractVariant, pool_id: PoolId) -> Result<PoolView, ChainError> {
        let addr = self.address_for(variant)?;
        self.limiter.wait().await;
        let id = U256::from(pool_id);
        with_retry(|| async {
            match variant {
                ContractVariant::Legacy => {
                    let c = ILegacyInsurancePool::new(addr, &self.provider);
                    let r = c
                        .getPool(id)
                        .call()
                        .await
                        .map_err(ChainError::from_alloy_contract_error)?;
                    Ok(PoolView {
                        status_code: r.status,
                        coverage_amount: Money::from_smallest_units(
                            u256_to_i64(r.coverageAmount)?,
                        ),
                        premium_amount: Money::from_smallest_units(u256_to_i64(r.premiumAmount)?),
                        deadline: u256_to_i64(r.deadline)?,
                        insured: r.insured,
                        claim_approved: r.claimApproved,
                    })
                }
                ContractVariant::Current => {
                    let c = ICurrentInsurancePool::new(addr, &self.provider);
                    let r = c
                        .getPool(id)
                        .call()
                        .await
                        .map_err(ChainError::from_alloy_contract_error)?;
                    Ok(PoolView {
                        status_code: r.status,
                        coverage_amount: Money::from_smallest_units(
                            u256_to_i64(r.coverageAmount)?,
                        ),
                        premium_amount: Money::from_smallest_units(u256_to_i64(r.premiumAmount)?),
                        deadline: u256_to_i64(r.deadline)?,
                        insured: r.insured,
                        claim_approved: r.claimApproved,
                    })
                }
            }
        })
        .await
    }

    pub async fn get_pool_accounting(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolAccounting, ChainError> {
        let addr = self.address_for(variant)?;
        self.limiter.wait().await;
        let id = U256::from(pool_id);
        with_retry(|| async {
            match variant {
                ContractVariant::Legacy => {
                    let c = ILegacyInsurancePool::new(addr, &self.provider);
                    let r = c
                        .getPoolAccounting(id)
                        .call()
                        .await
                        .map_err(ChainError::from_alloy_contract_error)?;
                    Ok(PoolAccounting {
                        total_collateral: Money::from_smallest_units(u256_to_i64(
                            r.totalCollateral,
                        )?),
                        premium_collected: Money::from_smallest_units(u256_to_i64(
                            r.premiumCollected,
                        )?),
                        protocol_fee_bps: r.protocolFeeBps.try_into().unwrap_or(u32::MAX),
                    })
                }
                ContractVariant::Current => {
                    let c = ICurrentInsurancePool::new(addr, &self.provider);
                    let r = c
                        .getPoolAccounting(id)
                        .call()
                        .await
                        .map_err(ChainError::from_alloy_contract_error)?;
                    Ok(PoolAccounting {
                        total_collateral: Money::from_smallest_units(u256_to_i64(
                            r.totalCollateral,
                        )?),
                        premium_collected: Money::from_smallest_units(u256_to_i64(
                            r.premiumCollected,
                        )?),
                        protocol_fee_bps: r.protocolFeeBps.try_into().unwrap_or(u32::MAX),
                    })
                }
            }
        })
        .await
    }

    pub async fn get_pool_participants(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolParticipants, ChainError> {
        let addr = self.address_for(variant)?;
        self.limiter.wait().await;
        let id = U256::from(pool_id);
        with_retry(|| async {
            match variant {
                ContractVariant::Legacy => {
                    let c = ILegacyInsurancePool::new(addr, &self.provider);
                    let r = c
                        .getPoolParticipants(id)
                        .call()
                        .await
                        .map_err(ChainError::from_alloy_contract_error)?;
                    Ok(PoolParticipants {
                        insured: r.insured,
                        collateral_providers: r.collateralProviders,
                    })
                }
                ContractVariant::Current => {
                    let c = ICurrentInsurancePool::new(addr, &self.provider);
                    let r = c
                        .getPoolParticipants(id)
                        .call()
                        .await
                        .map_err(ChainError::from_alloy_contract_error)?;
                    Ok(PoolParticipants {
                        insured: r.insured,
                        collateral_providers: r.collateralProviders,
                    })
                }
            }
        })
        .await
    }

    /// Legacy-only: amount of premium still owed before the pool opens.
    pub async fn get_required_premium(&self, pool_id: PoolId) -> Result<Money, ChainError> {
        let addr = self.address_for(ContractVariant::Legacy)?;
        self.limiter.wait().await;
        let id = U256::from(pool_id);
        let amount: U256 = with_retry(|| async {
            let c = ILegacyInsurancePool::new(addr, &self.provider);
            c.getRequiredPremium(id)
                .call()
                .await
                .map(|r| r.premium)
                .map_err(ChainError::from_alloy_contract_error)
        })
        .await?;
        Ok(Money::from_smallest_units(u256_to_i64(amount)?))
    }

    /// Create a pool. On `Current` this is the atomic create-and-fund call
    /// (pool opens immediately); on `Legacy` it only creates the pool in
    /// `Pending`, awaiting a separate premium-funding step. The pool id is
    /// read back from `nextPoolId` immediately before submission — the
    /// gateway's write lock guarantees no other creation can race it.
    pub async fn create_pool(
        &self,
        variant: ContractVariant,
        params: CreatePoolParams,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<(PoolId, String), ChainError> {
        let addr = self.address_for(variant)?;
        let deadline = U256::from(params.deadline.max(0) as u64);
        let coverage = U256::from(params.coverage_amount.smallest_units());
        let rate_bps = U256::from(params.premium_rate_bps);

        self.gateway
            .run(oracle_armed, not_suspended, || async {
                let pool_id = self.get_next_pool_id(variant).await?;
                self.limiter.wait().await;
                let tx_hash = with_retry(|| async {
                    match variant {
                        ContractVariant::Legacy => {
                            let c = ILegacyInsurancePool::new(addr, &self.provider);
                            let pending = c
                                .createPool(
                                    params.product_id.clone(),
                                    params.description.clone(),
                                    params.evidence_source_url.clone(),
                                    coverage,
                                    rate_bps,
                                    deadline,
                                )
                                .send()
                                .await
                                .map_err(ChainError::from_alloy_contract_error)?;
                            let receipt = pending
                                .get_receipt()
                                .await
                                .map_err(|e| ChainError::Transport(e.to_string()))?;
                            Ok(format!("{:#x}", receipt.transaction_hash))
                        }
                        ContractVariant::Current => {
                            let c = ICurrentInsurancePool::new(addr, &self.provider);
                            let pending = c
                                .createAndFund(
                                    params.product_id.clone(),
                                    params.description.clone(),
                                    params.evidence_source_url.clone(),
                                    coverage,
                                    rate_bps,
                                    deadline,
                                )
                                .send()
                                .await
                                .map_err(ChainError::from_alloy_contract_error)?;
                            let receipt = pending
                                .get_receipt()
                                .await
                                .map_err(|e| ChainError::Transport(e.to_string()))?;
                            Ok(format!("{:#x}", receipt.transaction_hash))
                        }
                    }
                })
                .await?;
                self.cache.invalidate(PoolKey::new(variant, pool_id));
                Ok((pool_id, tx_hash))
            })
            .await
    }

    pub async fn resolve_pool(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
        claim_approved: bool,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<String, ChainError> {
        let addr = self.address_for(variant)?;
        let id = U256::from(pool_id);
        let tx_hash = self
            .gateway
            .run(oracle_armed, not_suspended, || async {
                self.limiter.wait().await;
                with_retry(|| async {
                    let hash = match variant {
                        ContractVariant::Legacy => {
                            let c = ILegacyInsurancePool::new(addr, &self.provider);
                            send_and_wait(c.resolvePool(id, claim_approved)).await?
                        }
                        ContractVariant::Current => {
                            let c = ICurrentInsurancePool::new(addr, &self.provider);
                            send_and_wait(c.resolvePool(id, claim_approved)).await?
                        }
                    };
                    Ok(hash)
                })
                .await
            })
            .await?;
        self.cache.invalidate(PoolKey::new(variant, pool_id));
        Ok(tx_hash)
    }

    pub async fn cancel_and_refund(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<String, ChainError> {
        // Permissionless — no gate verdicts required, but still serialized
        // through the write lock so it cannot interleave nonces with a
        // gated write.
        let addr = self.address_for(variant)?;
        let id = U256::from(pool_id);
        let tx_hash = self
            .gateway
            .run(true, true, || async {
                self.limiter.wait().await;
                with_retry(|| async {
                    match variant {
                        ContractVariant::Legacy => {
                            let c = ILegacyInsurancePool::new(addr, &self.provider);
                            send_and_wait(c.cancelAndRefund(id)).await
                        }
                        ContractVariant::Current => {
                            let c = ICurrentInsurancePool::new(addr, &self.provider);
                            send_and_wait(c.cancelAndRefund(id)).await
                        }
                    }
                })
                .await
            })
            .await?;
        self.cache.invalidate(PoolKey::new(variant, pool_id));
        Ok(tx_hash)
    }

    pub async fn emergency_resolve(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<String, ChainError> {
        let addr = self.address_for(variant)?;
        let id = U256::from(pool_id);
        let tx_hash = self
            .gateway
            .run(true, true, || async {
                self.limiter.wait().await;
                with_retry(|| async {
                    match variant {
                        ContractVariant::Legacy => {
                            let c = ILegacyInsurancePool::new(addr, &self.provider);
                            send_and_wait(c.emergencyResolve(id)).await
                        }
                        ContractVariant::Current => {
                            let c = ICurrentInsurancePool::new(addr, &self.provider);
                            send_and_wait(c.emergencyResolve(id)).await
                        }
                    }
                })
                .await
            })
            .await?;
        self.cache.invalidate(PoolKey::new(variant, pool_id));
        Ok(tx_hash)
    }

    /// Legacy-only: submit a separate premium payment for a `Pending` pool.
    pub async fn fund_premium(&self, pool_id: PoolId, amount: Money) -> Result<String, ChainError> {
        let addr = self.address_for(ContractVariant::Legacy)?;
        let id = U256::from(pool_id);
        let amount_units = U256::from(amount.smallest_units());
        let tx_hash = self
            .gateway
            .run(true, true, || async {
                self.limiter.wait().await;
                with_retry(|| async {
                    let c = ILegacyInsurancePool::new(addr, &self.provider);
                    send_and_wait(c.fundPremium(id, amount_units)).await
                })
                .await
            })
            .await?;
        self.cache.invalidate(PoolKey::new(ContractVariant::Legacy, pool_id));
        Ok(tx_hash)
    }

    pub fn stablecoin(&self) -> IErc20Stablecoin::IErc20StablecoinInstance<&P> {
        IErc20Stablecoin::new(self.addresses.stablecoin, &self.provider)
    }
}

/// Send a prepared contract call and await one confirmation, returning the
/// transaction hash as a `0x`-prefixed hex string. Generic over the call
/// builder so every write above (on either contract variant) shares one
/// send-and-confirm path.
async fn send_and_wait<T, P, D, N>(call: alloy::contract::CallBuilder<T, P, D, N>) -> Result<String, ChainError>
where
    P: Provider<N>,
    D: alloy::contract::CallDecoder,
    N: alloy::network::Network,
{
    let pending = call
        .send()
        .await
        .map_err(ChainError::from_alloy_contract_error)?;
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| ChainError::Transport(e.to_string()))?;
    Ok(format!("{:#x}", receipt.transaction_hash))
}

fn u256_to_i64(v: U256) -> Result<i64, ChainError> {
    i64::try_from(v).map_err(|_| ChainError::Decode(format!("value {v} does not fit in i64")))
}

fn u256_to_pool_id(v: U256) -> Result<PoolId, ChainError> {
    u64::try_from(v).map_err(|_| ChainError::Decode(format!("pool id {v} does not fit in u64")))
}
