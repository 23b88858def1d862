//! Pure ABI-encoding helpers for the outbound machine-execution payload
//! (spec §4.7): an ordered list of wallet-ready call objects a collateral
//! provider's or insured's own wallet-agent can submit directly, with no
//! RPC round-trip and no provider instance — the Chain Client is the only
//! crate that touches contract ABIs (spec §4.1), so the social artifact
//! builder in `pcl_social::payload` asks this module for the call steps
//! instead of encoding anything itself.

use alloy::primitives::Address;
use alloy::sol_types::SolCall;
use pcl_schemas::chain_abi::{ICurrentInsurancePool, IErc20Stablecoin, ILegacyInsurancePool};
use pcl_schemas::{CallStep, ContractVariant, Money, PoolId};

fn hex_data(bytes: Vec<u8>) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn addr_str(addr: Address) -> String {
    format!("{addr:#x}")
}

/// `approve` the pool contract for `amount`, then call `fundPremium`
/// (Legacy only — on `Current` the premium is already funded atomically at
/// creation, so this path is never built for that variant).
pub fn fund_premium_call_steps(
    pool_addr: Address,
    stablecoin_addr: Address,
    pool_id: PoolId,
    amount: Money,
) -> Vec<CallStep> {
    let amount_units = amount.smallest_units();
    let approve = IErc20Stablecoin::approveCall {
        spender: pool_addr,
        amount: alloy::primitives::U256::from(amount_units),
    };
    let fund = ILegacyInsurancePool::fundPremiumCall {
        poolId: alloy::primitives::U256::from(pool_id),
        amount: alloy::primitives::U256::from(amount_units),
    };
    vec![
        CallStep {
            step: 1,
            action: "approve".to_string(),
            to: addr_str(stablecoin_addr),
            data: hex_data(approve.abi_encode()),
            value: "0".to_string(),
            description: "approve the pool contract to pull the premium amount".to_string(),
            decoded: serde_json::json!({"spender": addr_str(pool_addr), "amount": amount_units}),
        },
        CallStep {
            step: 2,
            action: "fundPremium".to_string(),
            to: addr_str(pool_addr),
            data: hex_data(fund.abi_encode()),
            value: "0".to_string(),
            description: "pay the premium to open the pool".to_string(),
            decoded: serde_json::json!({"poolId": pool_id, "amount": amount_units}),
        },
    ]
}

/// `approve` the pool contract for `amount`, then call `joinPool` to
/// co-underwrite collateral.
pub fn provide_collateral_call_steps(
    variant: ContractVariant,
    pool_addr: Address,
    stablecoin_addr: Address,
    pool_id: PoolId,
    amount: Money,
) -> Vec<CallStep> {
    let amount_units = amount.smallest_units();
    let approve = IErc20Stablecoin::approveCall {
        spender: pool_addr,
        amount: alloy::primitives::U256::from(amount_units),
    };
    let join_data = match variant {
        ContractVariant::Legacy => ILegacyInsurancePool::joinPoolCall {
            poolId: alloy::primitives::U256::from(pool_id),
            amount: alloy::primitives::U256::from(amount_units),
        }
        .abi_encode(),
        ContractVariant::Current => ICurrentInsurancePool::joinPoolCall {
            poolId: alloy::primitives::U256::from(pool_id),
            amount: alloy::primitives::U256::from(amount_units),
        }
        .abi_encode(),
    };
    vec![
        CallStep {
            step: 1,
            action: "approve".to_string(),
            to: addr_str(stablecoin_addr),
            data: hex_data(approve.abi_encode()),
            value: "0".to_string(),
            description: "approve the pool contract to pull the collateral amount".to_string(),
            decoded: serde_json::json!({"spender": addr_str(pool_addr), "amount": amount_units}),
        },
        CallStep {
            step: 2,
            action: "joinPool".to_string(),
            to: addr_str(pool_addr),
            data: hex_data(join_data),
            value: "0".to_string(),
            description: "co-underwrite the pool with collateral".to_string(),
            decoded: serde_json::json!({"poolId": pool_id, "amount": amount_units}),
        },
    ]
}

/// `withdraw` after resolution — the contract alone decides whether the
/// caller is owed anything (insured payout, collateral return, or nothing);
/// the agent never computes a per-party share.
pub fn withdraw_call_steps(variant: ContractVariant, pool_addr: Address, pool_id: PoolId) -> Vec<CallStep> {
    let data = match variant {
        ContractVariant::Legacy => ILegacyInsurancePool::withdrawCall {
            poolId: alloy::primitives::U256::from(pool_id),
        }
        .abi_encode(),
        ContractVariant::Current => ICurrentInsurancePool::withdrawCall {
            poolId: alloy::primitives::U256::from(pool_id),
        }
        .abi_encode(),
    };
    vec![CallStep {
        step: 1,
        action: "withdraw".to_string(),
        to: addr_str(pool_addr),
        data: hex_data(data),
        value: "0".to_string(),
        description: "claim whatever this pool's resolution entitles the caller to".to_string(),
        decoded: serde_json::json!({"poolId": pool_id}),
    }]
}
