//! The Lifecycle Controller (spec §4.8): one `heartbeat` call composes every
//! sub-engine in a fixed order, exactly like `mqk_testkit::Orchestrator::run`
//! composes its sub-engines — a running error list instead of aborting on
//! the first failure, so one bad pool or one bad social call never stalls
//! every other pool's progress this cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use pcl_cache::{PoolKey, RateLimiter, ReadCache};
use pcl_chain::{ChainError, ChainOps, CreatePoolParams, PoolView};
use pcl_evidence::EvidenceFetcher;
use pcl_oracle::{AttestationRecorder, EvidenceAuditor};
use pcl_registry::PoolRegistry;
use pcl_risk::catalog::{self, CATALOG};
use pcl_risk::engine::{RiskEngine, RiskOutcome};
use pcl_schemas::{ContractVariant, Money, PoolId, PoolRegistryEntry, PoolStatus, PublishedArtifacts};
use pcl_social::{FeedOrdering, SocialClient, SocialError};
use tokio::sync::{Mutex, RwLock};

use crate::error::ControllerError;
use crate::social::{classify_mention, MentionIntent};

/// Tunables that are configuration, not code: per-cycle caps, cooldowns,
/// and the handful of strings the heartbeat needs but no sub-crate owns.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub pause_pool_creation: bool,
    pub max_live_pools: usize,
    pub min_cycles_between_creations: u64,
    pub max_replies_per_cycle: usize,
    pub max_feed_scan: usize,
    pub max_mentions_scan: usize,
    pub own_social_handle: String,
    /// Base URL the human deep-link in every published artifact is built
    /// against (spec §4.7); the pool id and query params are appended per
    /// artifact.
    pub deep_link_base_url: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            pause_pool_creation: false,
            max_live_pools: 15,
            min_cycles_between_creations: 3,
            max_replies_per_cycle: 5,
            max_feed_scan: 20,
            max_mentions_scan: 10,
            own_social_handle: "pcl-agent".to_string(),
            deep_link_base_url: "https://paracle.example/p".to_string(),
        }
    }
}

/// Tally of what one `heartbeat` call did, for logging and tests.
#[derive(Debug, Default)]
pub struct HeartbeatReport {
    pub cycle: u64,
    pub transitions_applied: usize,
    pub cancelled: usize,
    pub resolved: usize,
    pub emergency_resolved: usize,
    pub pool_created: bool,
    pub social_replies: usize,
    pub errors: Vec<ControllerError>,
}

/// Every sub-engine's state, held behind the locks the controller and the
/// commerce job handler both need to touch (spec §5).
pub struct Controller {
    pub chain: Arc<dyn ChainOps>,
    pub cache: Arc<ReadCache<PoolView>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub risk_engine: Arc<RiskEngine>,
    pub evidence_fetcher: Arc<EvidenceFetcher>,
    pub auditor: Arc<dyn EvidenceAuditor>,
    pub social: Arc<dyn SocialClient>,
    pub registry: Arc<RwLock<PoolRegistry>>,
    /// Owns the audit log's hash-chain position; constructed once at
    /// startup from an [`pcl_audit::AuditWriter`] (spec §6 persistence).
    pub attestation: Arc<Mutex<AttestationRecorder>>,
    pub new_pool_variant: ContractVariant,
    /// `false` once the contract's configured oracle no longer matches the
    /// wallet this controller signs with; resolution/creation writes stop,
    /// reads continue (spec §4.8, §7 `OracleNotAuthorized`).
    pub oracle_armed: Arc<AtomicBool>,
    /// `false` while a social suspension/rate-limit window is open; shared
    /// with [`crate::error::ControllerError::SocialSuspended`] handling.
    pub not_suspended: Arc<AtomicBool>,
    /// Shared with `pcl_commerce::CommerceJobHandler` (spec §5): a commerce
    /// job waits on this lock if a heartbeat is mid chain-write, and vice
    /// versa. Layered atop `pcl_chain::TxGateway`'s own internal lock, which
    /// only serializes calls made through one `ChainClient`.
    pub chain_write_lock: Arc<Mutex<()>>,
    pub config: ControllerConfig,
}

impl Controller {
    /// Run one full cycle: clear the read cache, advance the cycle counter,
    /// then monitor → resolve → (maybe) create → engage socially → record
    /// suspension state. Every step's errors are collected rather than
    /// aborting the cycle, mirroring `mqk_testkit::Orchestrator::run`.
    pub async fn heartbeat(&self, now: i64) -> HeartbeatReport {
        self.cache.clear();
        let cycle = {
            let mut registry = self.registry.write().await;
            registry.set_last_heartbeat_unix(now);
            registry.increment_cycle()
        };

        let mut report = HeartbeatReport { cycle, ..Default::default() };

        self.monitor_transitions(now, &mut report).await;
        self.resolve_due_pools(now, &mut report).await;
        self.maybe_create_pool(now, &mut report).await;
        self.social_engagement(now, &mut report).await;

        for err in &report.errors {
            if err.is_alarm() {
                tracing::error!(cycle, error = %err, "heartbeat alarm");
            } else {
                tracing::warn!(cycle, error = %err, "heartbeat warning");
            }
        }
        report
    }

    /// Cold-start reconciliation (spec §4.8 "must resume correctly with an
    /// empty local snapshot"): probe each contract variant's next pool id
    /// and ingest every pool the chain knows about that the local registry
    /// doesn't, so a wiped snapshot converges back to the live chain state
    /// on the very first heartbeat instead of silently ignoring pre-existing
    /// pools.
    pub async fn reconcile_cold_start(&self, now: i64) -> Vec<ControllerError> {
        let mut errors = Vec::new();
        for variant in [ContractVariant::Legacy, ContractVariant::Current] {
            let next_id = match self.chain.get_next_pool_id(variant).await {
                Ok(id) => id,
                Err(err) => {
                    errors.push(ControllerError::TransientIo {
                        context: format!("cold-start get_next_pool_id({variant:?})"),
                        detail: err.to_string(),
                    });
                    continue;
                }
            };
            for pool_id in 0..next_id {
                if self.registry.read().await.contains(variant, pool_id) {
                    continue;
                }
                self.rate_limiter.wait().await;
                match self.chain.get_pool(variant, pool_id).await {
                    Ok(view) => self.ingest_unknown_pool(variant, pool_id, view, now).await,
                    Err(err) => errors.push(ControllerError::TransientIo {
                        context: format!("cold-start get_pool({variant:?}, {pool_id})"),
                        detail: err.to_string(),
                    }),
                }
            }
        }
        errors
    }

    async fn ingest_unknown_pool(&self, variant: ContractVariant, pool_id: PoolId, view: PoolView, now: i64) {
        let Some(status) = PoolStatus::from_code(variant, view.status_code) else {
            return;
        };
        let entry = PoolRegistryEntry {
            schema_version: 1,
            pool_id,
            contract_variant: variant,
            product_id: "unknown-reconciled".to_string(),
            description: format!("reconciled at cold start, pool {pool_id}"),
            evidence_source_url: String::new(),
            coverage_amount: view.coverage_amount,
            premium_amount: view.premium_amount,
            premium_rate_bps: 0,
            deadline: view.deadline,
            deposit_deadline: view.deadline - pcl_schemas::DEPOSIT_WINDOW_SECS,
            event_probability: 0.0,
            status,
            creation_tx_hash: None,
            resolution_tx_hash: None,
            published_artifacts: PublishedArtifacts::default(),
            claim_approved: if status.is_resolved() { Some(view.claim_approved) } else { None },
            dual_auth_result: None,
            commerce_sourced: false,
        };
        self.registry.write().await.insert(entry);
        let _ = now;
    }

    /// Step 2: refresh every live pool's status from the chain and apply
    /// legal transitions; cancel-and-refund any pool still `Open`/`Pending`
    /// once its deposit window has closed underfunded.
    async fn monitor_transitions(&self, now: i64, report: &mut HeartbeatReport) {
        let live_keys: Vec<(ContractVariant, PoolId)> = {
            let registry = self.registry.read().await;
            registry.live_entries().map(|e| (e.contract_variant, e.pool_id)).collect()
        };

        for (variant, pool_id) in live_keys {
            self.rate_limiter.wait().await;
            let key = PoolKey::new(variant, pool_id);
            let view = match self.cache.get_or_fetch(key, || self.chain.get_pool(variant, pool_id)).await {
                Ok(v) => v,
                Err(err) => {
                    report.errors.push(ControllerError::TransientIo {
                        context: format!("get_pool({variant:?}, {pool_id})"),
                        detail: err.to_string(),
                    });
                    continue;
                }
            };

            if let Some(status) = PoolStatus::from_code(variant, view.status_code) {
                let prev_status = self.registry.read().await.get(variant, pool_id).map(|e| e.status);
                let applied = {
                    let mut registry = self.registry.write().await;
                    registry.apply_status(variant, pool_id, status)
                };
                match applied {
                    Ok(true) => {
                        report.transitions_applied += 1;
                        self.cache.invalidate(key);
                        self.publish_for_transition(variant, pool_id, prev_status, status, now, report).await;
                    }
                    Ok(false) => {}
                    Err(rejected) => {
                        report.errors.push(ControllerError::ContractRevert {
                            pool_id,
                            reason: format!("{rejected:?}"),
                        });
                    }
                }
            } else {
                report.errors.push(ControllerError::ContractRevert {
                    pool_id,
                    reason: format!("unrecognized status code {}", view.status_code),
                });
            }

            let needs_cancel = {
                let registry = self.registry.read().await;
                registry
                    .get(variant, pool_id)
                    .map(|e| !e.status.is_terminal() && e.status != PoolStatus::Active && e.deposit_window_closed(now))
                    .unwrap_or(false)
            };
            if needs_cancel {
                self.cancel_underfunded_pool(variant, pool_id, report).await;
            }
        }
    }

    /// Publish the phase-2/phase-3 artifact for a freshly applied transition
    /// (spec §4.8 step 2: "for `Pending → Open` on Legacy pools publish a
    /// provide-collateral artifact"). `Open -> Active` additionally gets a
    /// lightweight phase-3 activation announcement.
    async fn publish_for_transition(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
        prev_status: Option<PoolStatus>,
        next_status: PoolStatus,
        now: i64,
        report: &mut HeartbeatReport,
    ) {
        let entry = match self.registry.read().await.get(variant, pool_id) {
            Some(e) => e.clone(),
            None => return,
        };
        match (prev_status, next_status) {
            (Some(PoolStatus::Pending), PoolStatus::Open) => {
                self.publish_collateral_open_artifact(&entry, now, report).await;
            }
            (Some(PoolStatus::Open), PoolStatus::Active) => {
                self.publish_activation_artifact(&entry, now, report).await;
            }
            _ => {}
        }
    }

    async fn cancel_underfunded_pool(&self, variant: ContractVariant, pool_id: PoolId, report: &mut HeartbeatReport) {
        let oracle_armed = self.oracle_armed.load(Ordering::SeqCst);
        let not_suspended = self.not_suspended.load(Ordering::SeqCst);
        let _ = (oracle_armed, not_suspended);
        let result = {
            let _guard = self.chain_write_lock.lock().await;
            self.chain.cancel_and_refund(variant, pool_id).await
        };
        match result {
            Ok(_tx_hash) => {
                let mut registry = self.registry.write().await;
                if registry.apply_status(variant, pool_id, PoolStatus::Cancelled).is_ok() {
                    report.cancelled += 1;
                    self.cache.invalidate(PoolKey::new(variant, pool_id));
                }
            }
            Err(err) => report.errors.push(ControllerError::ContractRevert { pool_id, reason: err.to_string() }),
        }
    }

    /// Step 3: resolve every pool whose deadline has passed via the
    /// dual-auditor pipeline, then emergency-resolve anything still `Active`
    /// 24h past its deadline (spec §4.8, `PoolRegistryEntry::is_due_for_*`).
    async fn resolve_due_pools(&self, now: i64, report: &mut HeartbeatReport) {
        let due: Vec<(ContractVariant, PoolId, String, String)> = {
            let registry = self.registry.read().await;
            registry
                .due_for_resolution(now)
                .map(|e| (e.contract_variant, e.pool_id, e.description.clone(), e.evidence_source_url.clone()))
                .collect()
        };

        for (variant, pool_id, description, evidence_url) in due {
            let result = pcl_oracle::resolve(&self.evidence_fetcher, self.auditor.as_ref(), &evidence_url, &description).await;

            if result.judge.is_none() && result.auditor.is_none() {
                report.errors.push(ControllerError::EvidenceFetchFailed { pool_id });
                continue;
            }

            let oracle_armed = self.oracle_armed.load(Ordering::SeqCst);
            let not_suspended = self.not_suspended.load(Ordering::SeqCst);
            let tx_result = {
                let _guard = self.chain_write_lock.lock().await;
                self.chain.resolve_pool(variant, pool_id, result.claim_approved, oracle_armed, not_suspended).await
            };

            match tx_result {
                Ok(tx_hash) => {
                    self.finalize_resolution(variant, pool_id, &tx_hash, &result).await;
                    report.resolved += 1;
                    let hash = self.record_attestation(pool_id, &result).await;
                    let _ = hash;
                    if let Some(entry) = self.registry.read().await.get(variant, pool_id).cloned() {
                        self.publish_resolution_artifact(&entry, now, report).await;
                    }
                }
                Err(err) => report.errors.push(ControllerError::ResolveRevertAfterDeadline {
                    pool_id,
                    reason: err.to_string(),
                }),
            }
        }

        let emergency_due: Vec<(ContractVariant, PoolId)> = {
            let registry = self.registry.read().await;
            registry.due_for_emergency_resolution(now).map(|e| (e.contract_variant, e.pool_id)).collect()
        };

        for (variant, pool_id) in emergency_due {
            let still_active = self
                .registry
                .read()
                .await
                .get(variant, pool_id)
                .map(|e| e.status == PoolStatus::Active)
                .unwrap_or(false);
            if !still_active {
                continue;
            }
            let tx_result = {
                let _guard = self.chain_write_lock.lock().await;
                self.chain.emergency_resolve(variant, pool_id).await
            };
            match tx_result {
                Ok(tx_hash) => {
                    let resolved_entry = {
                        let mut registry = self.registry.write().await;
                        if registry.apply_status(variant, pool_id, PoolStatus::Resolved).is_ok() {
                            if let Some(entry) = registry.get_mut(variant, pool_id) {
                                entry.resolution_tx_hash = Some(tx_hash);
                                entry.claim_approved = Some(false);
                            }
                            report.emergency_resolved += 1;
                            self.cache.invalidate(PoolKey::new(variant, pool_id));
                            registry.get(variant, pool_id).cloned()
                        } else {
                            None
                        }
                    };
                    if let Some(entry) = resolved_entry {
                        self.publish_resolution_artifact(&entry, now, report).await;
                    }
                }
                Err(err) => report.errors.push(ControllerError::ContractRevert { pool_id, reason: err.to_string() }),
            }
        }
    }

    async fn finalize_resolution(
        &self,
        variant: ContractVariant,
        pool_id: PoolId,
        tx_hash: &str,
        result: &pcl_schemas::DualAuthResult,
    ) {
        let mut registry = self.registry.write().await;
        if registry.apply_status(variant, pool_id, PoolStatus::Resolved).is_ok() {
            if let Some(entry) = registry.get_mut(variant, pool_id) {
                entry.resolution_tx_hash = Some(tx_hash.to_string());
                entry.claim_approved = Some(result.claim_approved);
                entry.dual_auth_result = Some(result.clone());
            }
            drop(registry);
            self.cache.invalidate(PoolKey::new(variant, pool_id));
        }
    }

    async fn record_attestation(&self, pool_id: PoolId, result: &pcl_schemas::DualAuthResult) -> Option<String> {
        let mut recorder = self.attestation.lock().await;
        recorder.record(pool_id, result)
    }

    /// Step 4: create one new pool per cooldown window, gated on the oracle
    /// being armed, not being suspended, and staying under the live-pool cap
    /// (spec §4.8 step 4, §5 creation cadence).
    async fn maybe_create_pool(&self, now: i64, report: &mut HeartbeatReport) {
        if self.config.pause_pool_creation {
            return;
        }
        let (cycles_since, live_count, cycle) = {
            let registry = self.registry.read().await;
            (registry.cycles_since_last_pool_created(), registry.live_pool_count(), registry.cycle_count())
        };
        if cycles_since < self.config.min_cycles_between_creations {
            return;
        }
        if live_count >= self.config.max_live_pools {
            return;
        }

        let product = &CATALOG[(cycle as usize) % CATALOG.len()];
        let coverage_amount = Money::from_units(product.suggested_coverage_min as i64);
        let deadline = now + i64::from(product.suggested_deadline_days_min) * 86_400;
        let description = format!("{} (auto-created cycle {cycle})", product.display_name);

        let approved = match self.risk_engine.evaluate(&description, coverage_amount, deadline, now).await {
            RiskOutcome::Approved(a) => a,
            RiskOutcome::Rejected(rejection) => {
                report.errors.push(ControllerError::ParseValidation { reason: rejection.reason });
                return;
            }
        };

        let params = CreatePoolParams {
            product_id: product.id.to_string(),
            description: description.clone(),
            evidence_source_url: product.evidence_source_url.to_string(),
            coverage_amount,
            premium_rate_bps: approved.premium_rate_bps,
            deadline,
        };

        let oracle_armed = self.oracle_armed.load(Ordering::SeqCst);
        let not_suspended = self.not_suspended.load(Ordering::SeqCst);
        let create_result: Result<(PoolId, String), ChainError> = {
            let _guard = self.chain_write_lock.lock().await;
            self.chain.create_pool(self.new_pool_variant, params, oracle_armed, not_suspended).await
        };

        match create_result {
            Ok((pool_id, tx_hash)) => {
                let entry = PoolRegistryEntry {
                    schema_version: 1,
                    pool_id,
                    contract_variant: self.new_pool_variant,
                    product_id: product.id.to_string(),
                    description,
                    evidence_source_url: product.evidence_source_url.to_string(),
                    coverage_amount,
                    premium_amount: approved.premium_amount,
                    premium_rate_bps: approved.premium_rate_bps,
                    deadline,
                    deposit_deadline: deadline - pcl_schemas::DEPOSIT_WINDOW_SECS,
                    event_probability: approved.frequency,
                    status: PoolStatus::Open,
                    creation_tx_hash: Some(tx_hash),
                    resolution_tx_hash: None,
                    published_artifacts: PublishedArtifacts::default(),
                    claim_approved: None,
                    dual_auth_result: None,
                    commerce_sourced: false,
                };
                let created_entry = entry.clone();
                {
                    let mut registry = self.registry.write().await;
                    registry.insert(entry);
                    registry.record_pool_created_this_cycle();
                }
                report.pool_created = true;
                self.publish_creation_artifact(&created_entry, now, report).await;
            }
            Err(err) => report.errors.push(ControllerError::ContractRevert { pool_id: 0, reason: err.to_string() }),
        }
    }

    /// Step 5/6: scan the feed for product-matching opportunities, answer
    /// mentions, and stop entirely (read-only) once a suspension window is
    /// open (spec §4.8 step 5-6).
    async fn social_engagement(&self, now: i64, report: &mut HeartbeatReport) {
        if self.registry.read().await.is_suspended(now) {
            return;
        }

        let feed = match self.social.read_feed(FeedOrdering::Hot, self.config.max_feed_scan).await {
            Ok(posts) => posts,
            Err(err) => {
                self.record_social_error(err, report).await;
                return;
            }
        };

        for post in feed {
            if report.social_replies >= self.config.max_replies_per_cycle {
                break;
            }
            if post.author == self.config.own_social_handle {
                continue;
            }
            let is_new = self.registry.write().await.mark_post_processed_if_new(post.id.clone());
            if !is_new {
                continue;
            }
            let Some(product) = catalog::match_product(&post.body) else {
                continue;
            };
            let body = format!(
                "Looks like you might want {} coverage — reply 'quote' and we'll size a pool for you.",
                product.display_name
            );
            if !self.content_hash_is_new(&body).await {
                continue;
            }
            match self.social.reply(&post.id, &body).await {
                Ok(_) => report.social_replies += 1,
                Err(err) => {
                    self.record_social_error(err, report).await;
                    return;
                }
            }
        }

        let mentions = match self.social.read_mentions(self.config.max_mentions_scan).await {
            Ok(m) => m,
            Err(err) => {
                self.record_social_error(err, report).await;
                return;
            }
        };

        for mention in mentions {
            if report.social_replies >= self.config.max_replies_per_cycle {
                break;
            }
            let is_new = self.registry.write().await.mark_post_processed_if_new(mention.id.clone());
            if !is_new {
                continue;
            }
            let body = match classify_mention(&mention.body) {
                MentionIntent::PoolStatusQuery => {
                    let live = self.registry.read().await.live_pool_count();
                    format!("{live} pools currently live.")
                }
                MentionIntent::ProductCatalogQuery => {
                    format!("We currently cover: {}", CATALOG.iter().map(|p| p.display_name).collect::<Vec<_>>().join(", "))
                }
                MentionIntent::Help => {
                    "Describe what you want covered (amount, duration, event) and we'll quote it.".to_string()
                }
                MentionIntent::Unrecognized => continue,
            };
            if !self.content_hash_is_new(&body).await {
                continue;
            }
            match self.social.reply(&mention.id, &body).await {
                Ok(_) => report.social_replies += 1,
                Err(err) => {
                    self.record_social_error(err, report).await;
                    return;
                }
            }
        }
    }

    pub(crate) async fn content_hash_is_new(&self, body: &str) -> bool {
        let normalized = body.trim().to_lowercase();
        self.registry.write().await.record_content_hash_if_new(normalized)
    }

    pub(crate) async fn record_social_error(&self, err: SocialError, report: &mut HeartbeatReport) {
        match err {
            SocialError::Suspended { until_unix } => {
                self.registry.write().await.set_suspended_until(until_unix);
                self.not_suspended.store(false, Ordering::SeqCst);
                report.errors.push(ControllerError::SocialSuspended { until_unix });
            }
            SocialError::RateLimited { retry_after_secs } => {
                let until_unix = Utc::now().timestamp() + retry_after_secs as i64;
                self.registry.write().await.set_suspended_until(until_unix);
                report.errors.push(ControllerError::SocialSuspended { until_unix });
            }
            other => report.errors.push(ControllerError::TransientIo {
                context: "social call".to_string(),
                detail: other.to_string(),
            }),
        }
    }
}
