//! Plain read-side shapes returned by [`crate::client::ChainClient`], kept
//! separate from `pcl_schemas::PoolRegistryEntry` — a `PoolView` is exactly
//! what the contract returned this call, the registry entry is what the
//! controller has decided to remember about a pool over time.

use alloy::primitives::Address;
use pcl_schemas::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolView {
    pub status_code: u8,
    pub coverage_amount: Money,
    pub premium_amount: Money,
    pub deadline: i64,
    pub insured: Address,
    pub claim_approved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolAccounting {
    pub total_collateral: Money,
    pub premium_collected: Money,
    pub protocol_fee_bps: u32,
}

#[derive(Debug, Clone)]
pub struct PoolParticipants {
    pub insured: Address,
    pub collateral_providers: Vec<Address>,
}

/// Parameters for `create_pool`/`create_and_fund`.
#[derive(Debug, Clone)]
pub struct CreatePoolParams {
    pub product_id: String,
    pub description: String,
    pub evidence_source_url: String,
    pub coverage_amount: Money,
    pub premium_rate_bps: u32,
    pub deadline: i64,
}
