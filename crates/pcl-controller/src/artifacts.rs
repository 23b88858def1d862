//! Phase-specific social artifact publishing (spec §4.7/§4.8): every
//! lifecycle phase the heartbeat drives a pool through — creation,
//! collateral-open, activation, resolution — gets a short post (and an
//! accompanying long article repeating the full payload JSON) carrying the
//! machine-execution payload the pool's counterparties act on.

use pcl_chain::artifact_calls;
use pcl_schemas::{ArtifactIntent, CallStep, PoolRegistryEntry};
use pcl_social::payload::{build_long_article_body, build_payload, build_short_post_body, BuildPayloadArgs};

use crate::controller::{Controller, HeartbeatReport};

impl Controller {
    /// Build and publish the artifact for one lifecycle phase. Returns the
    /// short post's id (to store in `PublishedArtifacts`) on success; `None`
    /// if suspended, gated by duplicate-content suppression, or the social
    /// call itself failed (recorded as a non-fatal error, per spec §4.7).
    pub(crate) async fn publish_phase_artifact(
        &self,
        entry: &PoolRegistryEntry,
        intent: ArtifactIntent,
        call_steps: Vec<CallStep>,
        summary: &str,
        now: i64,
        report: &mut HeartbeatReport,
    ) -> Option<String> {
        if self.registry.read().await.is_suspended(now) {
            return None;
        }

        let Some(pool_addr) = self.chain.contract_address(entry.contract_variant) else {
            return None;
        };

        let payload = build_payload(BuildPayloadArgs {
            chain_id: self.chain.chain_id(),
            intent,
            pool_id: entry.pool_id,
            coverage_amount: entry.coverage_amount,
            premium_amount: entry.premium_amount,
            deadline: entry.deadline,
            contract_addresses: vec![format!("{pool_addr:#x}")],
            frequency: entry.event_probability,
            ev_per_100_units: entry.event_probability * 100.0,
            machine_execution_payload: call_steps,
            deep_link_base_url: &format!("{}/{}", self.config.deep_link_base_url, entry.pool_id),
        });

        let short_body = build_short_post_body(&payload, summary);
        if !self.content_hash_is_new(&short_body).await {
            return None;
        }

        let ack = match self.social.publish_short(&short_body).await {
            Ok(ack) => ack,
            Err(err) => {
                self.record_social_error(err, report).await;
                return None;
            }
        };

        if let Ok(article) = build_long_article_body(&payload, summary) {
            if let Err(err) = self.social.publish_long(summary, &article).await {
                self.record_social_error(err, report).await;
            }
        }

        Some(ack.post_id)
    }

    /// Phase 1: a pool was just created on-chain. `Legacy` still needs
    /// premium funding before it opens; `Current` is already premium-funded
    /// atomically and needs collateral providers instead.
    pub(crate) async fn publish_creation_artifact(
        &self,
        entry: &PoolRegistryEntry,
        now: i64,
        report: &mut HeartbeatReport,
    ) {
        let Some(pool_addr) = self.chain.contract_address(entry.contract_variant) else {
            return;
        };
        let (intent, steps, summary) = match entry.contract_variant {
            pcl_schemas::ContractVariant::Legacy => (
                ArtifactIntent::FundPremium,
                artifact_calls::fund_premium_call_steps(
                    pool_addr,
                    self.chain.stablecoin_address(),
                    entry.pool_id,
                    entry.premium_amount,
                ),
                format!("new pool #{} open — fund the premium to activate it", entry.pool_id),
            ),
            pcl_schemas::ContractVariant::Current => (
                ArtifactIntent::ProvideLiquidity,
                artifact_calls::provide_collateral_call_steps(
                    entry.contract_variant,
                    pool_addr,
                    self.chain.stablecoin_address(),
                    entry.pool_id,
                    entry.coverage_amount,
                ),
                format!("new pool #{} seeking collateral providers", entry.pool_id),
            ),
        };
        let post_id = self.publish_phase_artifact(entry, intent, steps, &summary, now, report).await;
        if let Some(id) = post_id {
            let mut registry = self.registry.write().await;
            if let Some(e) = registry.get_mut(entry.contract_variant, entry.pool_id) {
                e.published_artifacts.phase1_creation = Some(id);
            }
        }
    }

    /// Phase 2: a `Legacy` pool's premium was funded externally, moving it
    /// `Pending -> Open`. It now needs collateral providers.
    pub(crate) async fn publish_collateral_open_artifact(
        &self,
        entry: &PoolRegistryEntry,
        now: i64,
        report: &mut HeartbeatReport,
    ) {
        let Some(pool_addr) = self.chain.contract_address(entry.contract_variant) else {
            return;
        };
        let steps = artifact_calls::provide_collateral_call_steps(
            entry.contract_variant,
            pool_addr,
            self.chain.stablecoin_address(),
            entry.pool_id,
            entry.coverage_amount,
        );
        let summary = format!("pool #{} premium funded — seeking collateral providers", entry.pool_id);
        let post_id = self
            .publish_phase_artifact(entry, ArtifactIntent::ProvideLiquidity, steps, &summary, now, report)
            .await;
        if let Some(id) = post_id {
            let mut registry = self.registry.write().await;
            if let Some(e) = registry.get_mut(entry.contract_variant, entry.pool_id) {
                e.published_artifacts.phase2_collateral = Some(id);
            }
        }
    }

    /// Phase 3: a pool reached full collateral and transitioned to
    /// `Active`. Informational only — no further action requested, so the
    /// artifact carries an empty machine-execution payload.
    pub(crate) async fn publish_activation_artifact(
        &self,
        entry: &PoolRegistryEntry,
        now: i64,
        report: &mut HeartbeatReport,
    ) {
        let summary = format!("pool #{} fully collateralized and now active", entry.pool_id);
        let post_id = self
            .publish_phase_artifact(entry, ArtifactIntent::ProvideLiquidity, Vec::new(), &summary, now, report)
            .await;
        if let Some(id) = post_id {
            let mut registry = self.registry.write().await;
            if let Some(e) = registry.get_mut(entry.contract_variant, entry.pool_id) {
                e.published_artifacts.phase3_activation = Some(id);
            }
        }
    }

    /// Phase 4: a pool resolved (regular or emergency). Both the insured
    /// (if approved) and collateral providers (always) may have something
    /// to withdraw.
    pub(crate) async fn publish_resolution_artifact(
        &self,
        entry: &PoolRegistryEntry,
        now: i64,
        report: &mut HeartbeatReport,
    ) {
        let Some(pool_addr) = self.chain.contract_address(entry.contract_variant) else {
            return;
        };
        let steps = artifact_calls::withdraw_call_steps(entry.contract_variant, pool_addr, entry.pool_id);
        let verdict = match entry.claim_approved {
            Some(true) => "claim approved",
            Some(false) => "claim denied",
            None => "resolved",
        };
        let summary = format!("pool #{} resolved — {verdict}, withdraw if entitled", entry.pool_id);
        let post_id = self
            .publish_phase_artifact(entry, ArtifactIntent::Withdraw, steps, &summary, now, report)
            .await;
        if let Some(id) = post_id {
            let mut registry = self.registry.write().await;
            if let Some(e) = registry.get_mut(entry.contract_variant, entry.pool_id) {
                e.published_artifacts.phase4_resolution = Some(id);
            }
        }
    }
}
