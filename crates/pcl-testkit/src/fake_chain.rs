//! Deterministic in-memory [`ChainOps`] double standing in for the two
//! deployed contract variants, grounded directly on
//! `mqk-testkit::paper_broker::PaperBroker`: no RPC, no RNG, state injected
//! and read back exactly as the test wrote it. Write-class calls enforce
//! the same gate/serialization discipline as [`pcl_chain::TxGateway`] so
//! scenario tests exercise the real refusal paths, not a shortcut.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::primitives::Address;
use async_trait::async_trait;

use pcl_chain::{ChainError, ChainOps, CreatePoolParams, PoolAccounting, PoolParticipants, PoolView};
use pcl_schemas::{ContractVariant, Money, PoolId};

/// One pool's on-chain-equivalent state, as this fake understands it.
#[derive(Debug, Clone)]
pub struct FakePoolRecord {
    pub status_code: u8,
    pub coverage_amount: Money,
    pub premium_amount: Money,
    pub deadline: i64,
    pub insured: Address,
    pub claim_approved: bool,
    pub total_collateral: Money,
    pub premium_collected: Money,
    pub collateral_providers: Vec<Address>,
}

impl FakePoolRecord {
    pub fn new(coverage_amount: Money, premium_amount: Money, deadline: i64) -> Self {
        FakePoolRecord {
            status_code: 0,
            coverage_amount,
            premium_amount,
            deadline,
            insured: Address::repeat_byte(0x11),
            claim_approved: false,
            total_collateral: Money::ZERO,
            premium_collected: Money::ZERO,
            collateral_providers: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Counters {
    create_pool_calls: u64,
    resolve_pool_calls: u64,
    cancel_calls: u64,
    emergency_calls: u64,
}

struct State {
    pools: HashMap<(ContractVariant, PoolId), FakePoolRecord>,
    next_id: HashMap<ContractVariant, u64>,
    oracle_address: Address,
    counters: Counters,
}

/// In-memory chain double. Construct with [`FakeChain::new`], seed state
/// with [`FakeChain::insert_pool`]/[`FakeChain::set_status`], then hand an
/// `Arc<FakeChain>` to a [`pcl_controller::Controller`] as its
/// `dyn ChainOps`.
pub struct FakeChain {
    state: Mutex<State>,
    next_tx_seq: AtomicU64,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChain {
    pub fn new() -> Self {
        FakeChain {
            state: Mutex::new(State {
                pools: HashMap::new(),
                next_id: HashMap::new(),
                oracle_address: Address::repeat_byte(0xAA),
                counters: Counters::default(),
            }),
            next_tx_seq: AtomicU64::new(1),
        }
    }

    /// The address this fake reports from `get_configured_oracle`. Defaults
    /// to `0xAA..AA`; tests simulating an oracle-authorization failure
    /// configure the controller's wallet to a different address instead of
    /// changing this.
    pub fn oracle_address(&self) -> Address {
        self.state.lock().unwrap().oracle_address
    }

    pub fn set_oracle_address(&self, addr: Address) {
        self.state.lock().unwrap().oracle_address = addr;
    }

    /// Directly inject a pool as though it already existed on-chain before
    /// the local registry ever saw it (cold-start reconciliation tests).
    pub fn insert_pool(&self, variant: ContractVariant, pool_id: PoolId, record: FakePoolRecord) {
        let mut state = self.state.lock().unwrap();
        state.pools.insert((variant, pool_id), record);
        let next = state.next_id.entry(variant).or_insert(0);
        if pool_id + 1 > *next {
            *next = pool_id + 1;
        }
    }

    /// Simulate an externally observed status change (e.g. a collateral
    /// provider joining, or premium funding on a Legacy pool) without going
    /// through this fake's own write methods.
    pub fn set_status(&self, variant: ContractVariant, pool_id: PoolId, status_code: u8) {
        if let Some(record) = self.state.lock().unwrap().pools.get_mut(&(variant, pool_id)) {
            record.status_code = status_code;
        }
    }

    pub fn set_total_collateral(&self, variant: ContractVariant, pool_id: PoolId, amount: Money) {
        if let Some(record) = self.state.lock().unwrap().pools.get_mut(&(variant, pool_id)) {
            record.total_collateral = amount;
        }
    }

    pub fn get_record(&self, variant: ContractVariant, pool_id: PoolId) -> Option<FakePoolRecord> {
        self.state.lock().unwrap().pools.get(&(variant, pool_id)).cloned()
    }

    pub fn create_pool_call_count(&self) -> u64 {
        self.state.lock().unwrap().counters.create_pool_calls
    }

    pub fn resolve_pool_call_count(&self) -> u64 {
        self.state.lock().unwrap().counters.resolve_pool_calls
    }

    pub fn cancel_call_count(&self) -> u64 {
        self.state.lock().unwrap().counters.cancel_calls
    }

    pub fn emergency_call_count(&self) -> u64 {
        self.state.lock().unwrap().counters.emergency_calls
    }

    fn next_tx_hash(&self) -> String {
        let seq = self.next_tx_seq.fetch_add(1, Ordering::SeqCst);
        format!("0xfaketx{seq:08x}")
    }

    fn enforce_gates(oracle_armed: bool, not_suspended: bool) -> Result<(), ChainError> {
        if !oracle_armed {
            return Err(ChainError::Config("GATE_REFUSED: oracle wallet not armed".to_string()));
        }
        if !not_suspended {
            return Err(ChainError::Config("GATE_REFUSED: controller suspended".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainOps for FakeChain {
    fn clear_cache(&self) {}

    fn chain_id(&self) -> u64 {
        8453
    }

    fn contract_address(&self, variant: ContractVariant) -> Option<Address> {
        Some(match variant {
            ContractVariant::Legacy => Address::repeat_byte(0x01),
            ContractVariant::Current => Address::repeat_byte(0x02),
        })
    }

    fn stablecoin_address(&self) -> Address {
        Address::repeat_byte(0x03)
    }

    async fn get_configured_oracle(&self, _variant: ContractVariant) -> Result<Address, ChainError> {
        Ok(self.oracle_address())
    }

    async fn get_next_pool_id(&self, variant: ContractVariant) -> Result<PoolId, ChainError> {
        Ok(*self.state.lock().unwrap().next_id.get(&variant).unwrap_or(&0))
    }

    async fn get_pool(&self, variant: ContractVariant, pool_id: PoolId) -> Result<PoolView, ChainError> {
        let state = self.state.lock().unwrap();
        let record = state
            .pools
            .get(&(variant, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such pool {pool_id}")))?;
        Ok(PoolView {
            status_code: record.status_code,
            coverage_amount: record.coverage_amount,
            premium_amount: record.premium_amount,
            deadline: record.deadline,
            insured: record.insured,
            claim_approved: record.claim_approved,
        })
    }

    async fn get_pool_accounting(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolAccounting, ChainError> {
        let state = self.state.lock().unwrap();
        let record = state
            .pools
            .get(&(variant, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such pool {pool_id}")))?;
        Ok(PoolAccounting {
            total_collateral: record.total_collateral,
            premium_collected: record.premium_collected,
            protocol_fee_bps: 300,
        })
    }

    async fn get_pool_participants(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
    ) -> Result<PoolParticipants, ChainError> {
        let state = self.state.lock().unwrap();
        let record = state
            .pools
            .get(&(variant, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such pool {pool_id}")))?;
        Ok(PoolParticipants {
            insured: record.insured,
            collateral_providers: record.collateral_providers.clone(),
        })
    }

    async fn get_required_premium(&self, pool_id: PoolId) -> Result<Money, ChainError> {
        let state = self.state.lock().unwrap();
        let record = state
            .pools
            .get(&(ContractVariant::Legacy, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such legacy pool {pool_id}")))?;
        Ok(record.premium_amount)
    }

    async fn create_pool(
        &self,
        variant: ContractVariant,
        params: CreatePoolParams,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<(PoolId, String), ChainError> {
        Self::enforce_gates(oracle_armed, not_suspended)?;
        let tx_hash = self.next_tx_hash();
        let mut state = self.state.lock().unwrap();
        let pool_id = *state.next_id.get(&variant).unwrap_or(&0);
        let initial_status = match variant {
            ContractVariant::Legacy => 0, // Pending, awaits separate premium funding
            ContractVariant::Current => 0, // Open: create-and-fund is atomic
        };
        state.pools.insert(
            (variant, pool_id),
            FakePoolRecord {
                status_code: initial_status,
                coverage_amount: params.coverage_amount,
                premium_amount: params.coverage_amount.mul_bps_floor(params.premium_rate_bps),
                deadline: params.deadline,
                insured: Address::repeat_byte(0x11),
                claim_approved: false,
                total_collateral: Money::ZERO,
                premium_collected: Money::ZERO,
                collateral_providers: Vec::new(),
            },
        );
        state.next_id.insert(variant, pool_id + 1);
        state.counters.create_pool_calls += 1;
        Ok((pool_id, tx_hash))
    }

    async fn resolve_pool(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
        claim_approved: bool,
        oracle_armed: bool,
        not_suspended: bool,
    ) -> Result<String, ChainError> {
        Self::enforce_gates(oracle_armed, not_suspended)?;
        let tx_hash = self.next_tx_hash();
        let mut state = self.state.lock().unwrap();
        let resolved_code = match variant {
            ContractVariant::Legacy => 3,
            ContractVariant::Current => 2,
        };
        let record = state
            .pools
            .get_mut(&(variant, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such pool {pool_id}")))?;
        record.status_code = resolved_code;
        record.claim_approved = claim_approved;
        state.counters.resolve_pool_calls += 1;
        Ok(tx_hash)
    }

    async fn cancel_and_refund(&self, variant: ContractVariant, pool_id: PoolId) -> Result<String, ChainError> {
        let tx_hash = self.next_tx_hash();
        let mut state = self.state.lock().unwrap();
        let cancelled_code = match variant {
            ContractVariant::Legacy => 4,
            ContractVariant::Current => 3,
        };
        let record = state
            .pools
            .get_mut(&(variant, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such pool {pool_id}")))?;
        record.status_code = cancelled_code;
        state.counters.cancel_calls += 1;
        Ok(tx_hash)
    }

    async fn emergency_resolve(&self, variant: ContractVariant, pool_id: PoolId) -> Result<String, ChainError> {
        let tx_hash = self.next_tx_hash();
        let mut state = self.state.lock().unwrap();
        let resolved_code = match variant {
            ContractVariant::Legacy => 3,
            ContractVariant::Current => 2,
        };
        let record = state
            .pools
            .get_mut(&(variant, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such pool {pool_id}")))?;
        record.status_code = resolved_code;
        record.claim_approved = false;
        state.counters.emergency_calls += 1;
        Ok(tx_hash)
    }

    async fn fund_premium(&self, pool_id: PoolId, amount: Money) -> Result<String, ChainError> {
        let tx_hash = self.next_tx_hash();
        let mut state = self.state.lock().unwrap();
        let record = state
            .pools
            .get_mut(&(ContractVariant::Legacy, pool_id))
            .ok_or_else(|| ChainError::Reverted(format!("no such legacy pool {pool_id}")))?;
        record.premium_collected = amount;
        record.status_code = 1; // Open
        Ok(tx_hash)
    }
}
