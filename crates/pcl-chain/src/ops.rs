//! Object-safe async trait over [`crate::client::ChainClient`]'s operations.
//!
//! Grounded on `mqk-execution::order_router::BrokerAdapter`: a trait plus a
//! real implementation plus a test double sharing one seam, so the
//! controller and commerce handler can be exercised against a fake chain
//! without a live RPC endpoint.

use alloy::primitives::Address;
use async_trait::async_trait;
use pcl_schemas::{ContractVariant, Money, PoolId};

use crate::error::ChainError;
use crate::views::{CreatePoolParams, PoolAccounting, PoolParticipants, PoolView};

#[async_trait]
pub trait ChainOps: Send + Sync {
    fn clear_cache(&self);

    /// The chain id this client is configured against, for the artifact
    /// payload's `chain_id` field (spec §4.7) — not an RPC call, read back
    /// from startup configuration.
    fn chain_id(&self) -> u64;

    /// The deployed address for `variant`, or `None` if that variant is not
    /// configured. Used to build the machine-execution payload's `to`
    /// fields and `contract_addresses` list, never to issue a call.
    fn contract_address(&self, variant: ContractVariant) -> Option<Address>;

    /// The stablecoin address, for the `approve` call step that precedes
    /// every fund/collateral call.
    fn stablecoin_address(&self) -> Address;

    async fn get_configured_oracle(&self, variant: ContractVariant) -> Result<Address, ChainError>;

    async fn get_next_pool_id(&self, variant: ContractVariant) -> Result<PoolId, ChainError>;

    async fn get_pool(&self, variant: ContractVariant, pool_id: PoolId) -> Result<PoolView, ChainError>;

    async fn get_pool_accounting(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolAccounting, ChainError>;

    async fn get_pool_participants(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolParticipants, ChainError>;

    async fn get_required_premium(&self, pool_id: PoolId) -> Result<Money, ChainError>;

    async fn create_pool(
        &self,
        variant: ContractVariant,
        params: CreatePoolParams,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<(PoolId, String), ChainError>;

    async fn resolve_pool(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
        claim_approved: bool,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<String, ChainError>;

    async fn cancel_and_refund(&self, variant: ContractVariant, pool_id: PoolId) -> Result<String, ChainError>;

    async fn emergency_resolve(&self, variant: ContractVariant, pool_id: PoolId) -> Result<String, ChainError>;

    async fn fund_premium(&self, pool_id: PoolId, amount: Money) -> Result<String, ChainError>;
}

#[async_trait]
impl<P> ChainOps for crate::client::ChainClient<P>
where
    P: alloy::providers::Provider<alloy::network::Ethereum> + Clone + Send + Sync,
{
    fn clear_cache(&self) {
        crate::client::ChainClient::clear_cache(self)
    }

    fn chain_id(&self) -> u64 {
        crate::client::ChainClient::chain_id(self)
    }

    fn contract_address(&self, variant: ContractVariant) -> Option<Address> {
        crate::client::ChainClient::contract_address(self, variant)
    }

    fn stablecoin_address(&self) -> Address {
        crate::client::ChainClient::stablecoin_address(self)
    }

    async fn get_configured_oracle(&self, variant: ContractVariant) -> Result<Address, ChainError> {
        crate::client::ChainClient::get_configured_oracle(self, variant).await
    }

    async fn get_next_pool_id(&self, variant: ContractVariant) -> Result<PoolId, ChainError> {
        crate::client::ChainClient::get_next_pool_id(self, variant).await
    }

    async fn get_pool(&self, variant: ContractVariant, pool_id: PoolId) -> Result<PoolView, ChainError> {
        crate::client::ChainClient::get_pool(self, variant, pool_id).await
    }

    async fn get_pool_accounting(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolAccounting, ChainError> {
        crate::client::ChainClient::get_pool_accounting(self, variant, pool_id).await
    }

    async fn get_pool_participants(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolParticipants, ChainError> {
        crate::client::ChainClient::get_pool_participants(self, variant, pool_id).await
    }

    async fn get_required_premium(&self, pool_id: PoolId) -> Result<Money, ChainError> {
        crate::client::ChainClient::get_required_premium(self, pool_id).await
    }

    async fn create_pool(
        &self,
        variant: ContractVariant,
        params: CreatePoolParams,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<(PoolId, String), ChainError> {
        crate::client::ChainClient::create_pool(self, variant, params, oracle_armed, not_suspended).await
    }

    async fn resolve_pool(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
        claim_approved: bool,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<String, ChainError> {
        crate::client::ChainClient::resolve_pool(
            self,
            variant,
            pool_id,
            claim_approved,
            oracle_armed,
            not_suspended,
        )
        .await
    }

    async fn cancel_and_refund(&self, variant: ContractVariant, pool_id: PoolId) -> Result<String, ChainError> {
        crate::client::ChainClient::cancel_and_refund(self, variant, pool_id).await
    }

    async fn emergency_resolve(&self, variant: ContractVariant, pool_id: PoolId) -> Result<String, ChainError> {
        crate::client::ChainClient::emergency_resolve(self, variant, pool_id).await
    }

    async fn fund_premium(&self, pool_id: PoolId, amount: Money) -> Result<String, ChainError> {
        crate::client::ChainClient::fund_premium(self, pool_id, amount).await
    }
}
