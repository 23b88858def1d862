//! The in-memory pool registry and its counters (spec §3).
//!
//! The Lifecycle Controller is the registry's exclusive owner (spec §3
//! "Ownership"); every other crate reads or proposes mutations through it.
//! Status writes are guarded by [`is_legal_transition`] so a stale or
//! out-of-order chain read can never regress or skip an FSM edge.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;

use pcl_schemas::{is_legal_transition, ContractVariant, PoolId, PoolRegistryEntry, PoolStatus};

/// Bound on the recently-posted-content-hash FIFO (spec §3, §9 "Content
/// duplication" — a correctness aid, not a hard guarantee, so a generous
/// bound is fine).
pub const CONTENT_HASH_FIFO_CAP: usize = 500;
/// Bound on the processed-inbound-post-id FIFO (spec §4.8 step 5: "already
/// processed (FIFO of 500)").
pub const PROCESSED_POST_ID_FIFO_CAP: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct DailyCounters {
    pub comments: u32,
    pub posts: u32,
}

/// A single pool keyed by `(contract_variant, pool_id)` — the pair the spec
/// names as the registry's uniqueness constraint.
pub type RegistryKey = (ContractVariant, PoolId);

/// Reason a proposed status update was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionRejected {
    /// No entry exists for this key; callers must insert first.
    UnknownEntry,
    /// `prev -> next` is not a legal edge in the pool FSM (spec §4.8).
    IllegalTransition { prev: PoolStatus, next: PoolStatus },
}

pub struct PoolRegistry {
    pools: HashMap<RegistryKey, PoolRegistryEntry>,
    cycle_count: u64,
    last_pool_created_cycle: u64,
    last_heartbeat_unix: Option<i64>,
    daily_counters: HashMap<String, DailyCounters>,
    content_hashes: VecDeque<String>,
    processed_post_ids: VecDeque<String>,
    suspension_expiry_unix: Option<i64>,
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolRegistry {
    pub fn new() -> Self {
        PoolRegistry {
            pools: HashMap::new(),
            cycle_count: 0,
            last_pool_created_cycle: 0,
            last_heartbeat_unix: None,
            daily_counters: HashMap::new(),
            content_hashes: VecDeque::new(),
            processed_post_ids: VecDeque::new(),
            suspension_expiry_unix: None,
        }
    }

    // -- pool entries ------------------------------------------------------

    /// Insert a brand-new entry. Overwrites silently only when the key is
    /// genuinely absent; callers that mean to update status must go through
    /// [`Self::apply_status`].
    pub fn insert(&mut self, entry: PoolRegistryEntry) {
        let key = (entry.contract_variant, entry.pool_id);
        self.pools.insert(key, entry);
    }

    pub fn get(&self, variant: ContractVariant, pool_id: PoolId) -> Option<&PoolRegistryEntry> {
        self.pools.get(&(variant, pool_id))
    }

    pub fn get_mut(&mut self, variant: ContractVariant, pool_id: PoolId) -> Option<&mut PoolRegistryEntry> {
        self.pools.get_mut(&(variant, pool_id))
    }

    pub fn contains(&self, variant: ContractVariant, pool_id: PoolId) -> bool {
        self.pools.contains_key(&(variant, pool_id))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolRegistryEntry> {
        self.pools.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PoolRegistryEntry> {
        self.pools.values_mut()
    }

    pub fn live_entries(&self) -> impl Iterator<Item = &PoolRegistryEntry> {
        self.pools.values().filter(|e| e.status.is_live())
    }

    pub fn live_pool_count(&self) -> usize {
        self.live_entries().count()
    }

    /// Apply a freshly observed on-chain status, refusing illegal or
    /// regressive transitions (spec §9 "Two status encodings").
    pub fn apply_status(
        &mut self,
        variant: ContractVariant,
        pool_id: PoolId,
        next: PoolStatus,
    ) -> Result<bool, TransitionRejected> {
        let entry = self
            .pools
            .get_mut(&(variant, pool_id))
            .ok_or(TransitionRejected::UnknownEntry)?;
        if entry.status == next {
            return Ok(false);
        }
        if !is_legal_transition(entry.status, next) {
            return Err(TransitionRejected::IllegalTransition { prev: entry.status, next });
        }
        entry.status = next;
        Ok(true)
    }

    pub fn due_for_resolution(&self, now: i64) -> impl Iterator<Item = &PoolRegistryEntry> {
        self.pools.values().filter(move |e| e.is_due_for_resolution(now))
    }

    pub fn due_for_emergency_resolution(&self, now: i64) -> impl Iterator<Item = &PoolRegistryEntry> {
        self.pools.values().filter(move |e| e.is_due_for_emergency_resolution(now))
    }

    // -- cycle / creation cooldown ------------------------------------------

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn increment_cycle(&mut self) -> u64 {
        self.cycle_count += 1;
        self.cycle_count
    }

    pub fn last_pool_created_cycle(&self) -> u64 {
        self.last_pool_created_cycle
    }

    pub fn record_pool_created_this_cycle(&mut self) {
        self.last_pool_created_cycle = self.cycle_count;
    }

    pub fn cycles_since_last_pool_created(&self) -> u64 {
        self.cycle_count.saturating_sub(self.last_pool_created_cycle)
    }

    pub fn last_heartbeat_unix(&self) -> Option<i64> {
        self.last_heartbeat_unix
    }

    pub fn set_last_heartbeat_unix(&mut self, now: i64) {
        self.last_heartbeat_unix = Some(now);
    }

    // -- duplicate / replay suppression --------------------------------------

    /// `true` if `hash` has not been seen before, and records it. Bounded
    /// FIFO: oldest hash is evicted once the cap is reached.
    pub fn record_content_hash_if_new(&mut self, hash: String) -> bool {
        if self.content_hashes.contains(&hash) {
            return false;
        }
        if self.content_hashes.len() >= CONTENT_HASH_FIFO_CAP {
            self.content_hashes.pop_front();
        }
        self.content_hashes.push_back(hash);
        true
    }

    /// `true` if `post_id` has not been processed before, and records it.
    pub fn mark_post_processed_if_new(&mut self, post_id: String) -> bool {
        if self.processed_post_ids.contains(&post_id) {
            return false;
        }
        if self.processed_post_ids.len() >= PROCESSED_POST_ID_FIFO_CAP {
            self.processed_post_ids.pop_front();
        }
        self.processed_post_ids.push_back(post_id);
        true
    }

    // -- daily counters -------------------------------------------------------

    pub fn increment_comment_count(&mut self, date: NaiveDate) -> u32 {
        let entry = self.daily_counters.entry(date.to_string()).or_default();
        entry.comments += 1;
        entry.comments
    }

    pub fn increment_post_count(&mut self, date: NaiveDate) -> u32 {
        let entry = self.daily_counters.entry(date.to_string()).or_default();
        entry.posts += 1;
        entry.posts
    }

    pub fn comment_count(&self, date: NaiveDate) -> u32 {
        self.daily_counters.get(&date.to_string()).map(|c| c.comments).unwrap_or(0)
    }

    pub fn post_count(&self, date: NaiveDate) -> u32 {
        self.daily_counters.get(&date.to_string()).map(|c| c.posts).unwrap_or(0)
    }

    // -- suspension -----------------------------------------------------------

    pub fn suspension_expiry_unix(&self) -> Option<i64> {
        self.suspension_expiry_unix
    }

    pub fn set_suspended_until(&mut self, until_unix: i64) {
        self.suspension_expiry_unix = Some(until_unix);
    }

    pub fn clear_suspension(&mut self) {
        self.suspension_expiry_unix = None;
    }

    pub fn is_suspended(&self, now: i64) -> bool {
        self.suspension_expiry_unix.map(|until| now < until).unwrap_or(false)
    }

    // -- snapshot access for persistence --------------------------------------

    pub(crate) fn pools_snapshot(&self) -> Vec<PoolRegistryEntry> {
        self.pools.values().cloned().collect()
    }

    pub(crate) fn content_hashes_snapshot(&self) -> Vec<String> {
        self.content_hashes.iter().cloned().collect()
    }

    pub(crate) fn processed_post_ids_snapshot(&self) -> Vec<String> {
        self.processed_post_ids.iter().cloned().collect()
    }

    pub(crate) fn daily_counters_snapshot(&self) -> &HashMap<String, DailyCounters> {
        &self.daily_counters
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        pools: Vec<PoolRegistryEntry>,
        cycle_count: u64,
        last_pool_created_cycle: u64,
        last_heartbeat_unix: Option<i64>,
        daily_counters: HashMap<String, DailyCounters>,
        content_hashes: Vec<String>,
        processed_post_ids: Vec<String>,
        suspension_expiry_unix: Option<i64>,
    ) -> Self {
        let mut map = HashMap::with_capacity(pools.len());
        for entry in pools {
            map.insert((entry.contract_variant, entry.pool_id), entry);
        }
        PoolRegistry {
            pools: map,
            cycle_count,
            last_pool_created_cycle,
            last_heartbeat_unix,
            daily_counters,
            content_hashes: content_hashes.into(),
            processed_post_ids: processed_post_ids.into(),
            suspension_expiry_unix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_schemas::{Money, PublishedArtifacts};

    fn sample_entry(pool_id: PoolId, status: PoolStatus) -> PoolRegistryEntry {
        PoolRegistryEntry {
            schema_version: 1,
            pool_id,
            contract_variant: ContractVariant::Current,
            product_id: "weather-rain".into(),
            description: "test".into(),
            evidence_source_url: "https://example.com".into(),
            coverage_amount: Money::from_units(1000),
            premium_amount: Money::from_units(50),
            premium_rate_bps: 500,
            deadline: 1_000,
            deposit_deadline: 1_000 - 7_200,
            event_probability: 0.1,
            status,
            creation_tx_hash: None,
            resolution_tx_hash: None,
            published_artifacts: PublishedArtifacts::default(),
            claim_approved: None,
            dual_auth_result: None,
            commerce_sourced: false,
        }
    }

    #[test]
    fn no_duplicate_pool_ids_per_variant() {
        let mut reg = PoolRegistry::new();
        reg.insert(sample_entry(1, PoolStatus::Open));
        reg.insert(sample_entry(1, PoolStatus::Active));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(ContractVariant::Current, 1).unwrap().status, PoolStatus::Active);
    }

    #[test]
    fn illegal_transition_rejected() {
        let mut reg = PoolRegistry::new();
        reg.insert(sample_entry(1, PoolStatus::Resolved));
        let err = reg.apply_status(ContractVariant::Current, 1, PoolStatus::Active).unwrap_err();
        assert!(matches!(err, TransitionRejected::IllegalTransition { .. }));
    }

    #[test]
    fn legal_transition_applies() {
        let mut reg = PoolRegistry::new();
        reg.insert(sample_entry(1, PoolStatus::Open));
        let changed = reg.apply_status(ContractVariant::Current, 1, PoolStatus::Active).unwrap();
        assert!(changed);
        assert_eq!(reg.get(ContractVariant::Current, 1).unwrap().status, PoolStatus::Active);
    }

    #[test]
    fn self_loop_is_not_a_change() {
        let mut reg = PoolRegistry::new();
        reg.insert(sample_entry(1, PoolStatus::Open));
        let changed = reg.apply_status(ContractVariant::Current, 1, PoolStatus::Open).unwrap();
        assert!(!changed);
    }

    #[test]
    fn content_hash_dedup_suppresses_repeats() {
        let mut reg = PoolRegistry::new();
        assert!(reg.record_content_hash_if_new("abc".into()));
        assert!(!reg.record_content_hash_if_new("abc".into()));
        assert!(reg.record_content_hash_if_new("def".into()));
    }

    #[test]
    fn content_hash_fifo_evicts_oldest_past_cap() {
        let mut reg = PoolRegistry::new();
        for i in 0..CONTENT_HASH_FIFO_CAP {
            reg.record_content_hash_if_new(format!("hash-{i}"));
        }
        // cap reached; pushing one more evicts hash-0, so it is "new" again
        assert!(reg.record_content_hash_if_new("hash-new".into()));
        assert!(reg.record_content_hash_if_new("hash-0".into()));
    }

    #[test]
    fn cooldown_counts_cycles_since_last_creation() {
        let mut reg = PoolRegistry::new();
        reg.increment_cycle();
        reg.increment_cycle();
        reg.record_pool_created_this_cycle();
        reg.increment_cycle();
        assert_eq!(reg.cycles_since_last_pool_created(), 1);
    }

    #[test]
    fn suspension_window_is_exclusive_of_expiry() {
        let mut reg = PoolRegistry::new();
        reg.set_suspended_until(1_000);
        assert!(reg.is_suspended(999));
        assert!(!reg.is_suspended(1_000));
    }
}
