//! The commerce job pipeline (spec §4.6 steps 2-7): validate, match a
//! catalog product, run the risk engine, create the pool on-chain, and
//! record the new pool in the registry tagged `commerce_sourced`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pcl_chain::{ChainOps, CreatePoolParams};
use pcl_registry::PoolRegistry;
use pcl_risk::catalog::{self, Product};
use pcl_risk::engine::{ApprovedRisk, RiskEngine, RiskOutcome};
use pcl_schemas::{
    CommerceDeliverable, ContractVariant, Money, PoolRegistryEntry, PoolStatus, PublishedArtifacts,
    ServiceRequest, DEPOSIT_WINDOW_SECS,
};
use tokio::sync::{Mutex, RwLock};

use crate::validate;

/// Everything the commerce handler needs to turn one [`ServiceRequest`] into
/// a pool on-chain: the chain adapter, the risk engine, the shared registry,
/// the two gate flags the controller also consults for its own writes, and
/// the chain write lock shared with the controller's heartbeat (spec §5: a
/// commerce job waits on this lock if a heartbeat is mid chain-write).
pub struct CommerceJobHandler {
    pub chain: Arc<dyn ChainOps>,
    pub risk_engine: Arc<RiskEngine>,
    pub registry: Arc<RwLock<PoolRegistry>>,
    pub variant: ContractVariant,
    pub oracle_armed: Arc<AtomicBool>,
    pub not_suspended: Arc<AtomicBool>,
    pub chain_write_lock: Arc<Mutex<()>>,
}

impl CommerceJobHandler {
    pub async fn process_job(&self, request: ServiceRequest, now: i64) -> CommerceDeliverable {
        if let Err(err) = validate::validate(&request) {
            return CommerceDeliverable::rejected(err.reason);
        }

        let match_text = format!(
            "{} {}",
            request.protocol.as_deref().unwrap_or(""),
            request.coverage_type
        );
        let match_text = if let Some(raw) = &request.raw_text {
            format!("{match_text} {raw}")
        } else {
            match_text
        };
        let product = match catalog::match_product(&match_text) {
            Some(p) => p,
            None => return CommerceDeliverable::rejected("no matching insurance product for this request"),
        };

        let description = request
            .raw_text
            .clone()
            .unwrap_or_else(|| describe_from_product(product, &request));
        let deadline = now + i64::from(request.duration_days) * 86_400;

        let approved = match self.risk_engine.evaluate(&description, request.coverage_amount, deadline, now).await
        {
            RiskOutcome::Approved(approved) => approved,
            RiskOutcome::Rejected(rejection) => return CommerceDeliverable::rejected(rejection.reason),
        };

        let params = CreatePoolParams {
            product_id: product.id.to_string(),
            description: description.clone(),
            evidence_source_url: product.evidence_source_url.to_string(),
            coverage_amount: request.coverage_amount,
            premium_rate_bps: approved.premium_rate_bps,
            deadline,
        };

        let oracle_armed = self.oracle_armed.load(Ordering::SeqCst);
        let not_suspended = self.not_suspended.load(Ordering::SeqCst);

        let (pool_id, tx_hash) = {
            let _write_guard = self.chain_write_lock.lock().await;
            match self.chain.create_pool(self.variant, params, oracle_armed, not_suspended).await {
                Ok(result) => result,
                Err(err) => return CommerceDeliverable::errored(format!("pool creation failed: {err}")),
            }
        };

        self.insert_into_registry(pool_id, product, &description, &request, &approved, deadline, &tx_hash)
            .await;

        CommerceDeliverable {
            status: pcl_schemas::CommerceStatus::CoverageCreated,
            pool_id: Some(pool_id),
            transaction_hash: Some(tx_hash),
            coverage_amount: Some(request.coverage_amount),
            premium_amount: Some(approved.premium_amount),
            evidence_source_url: Some(product.evidence_source_url.to_string()),
            resolution_mechanism: "dual_auditor_oracle".to_string(),
            reason: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_into_registry(
        &self,
        pool_id: pcl_schemas::PoolId,
        product: &Product,
        description: &str,
        request: &ServiceRequest,
        approved: &ApprovedRisk,
        deadline: i64,
        tx_hash: &str,
    ) {
        let entry = PoolRegistryEntry {
            schema_version: 1,
            pool_id,
            contract_variant: self.variant,
            product_id: product.id.to_string(),
            description: description.to_string(),
            evidence_source_url: product.evidence_source_url.to_string(),
            coverage_amount: request.coverage_amount,
            premium_amount: approved.premium_amount,
            premium_rate_bps: approved.premium_rate_bps,
            deadline,
            deposit_deadline: deadline - DEPOSIT_WINDOW_SECS,
            event_probability: approved.frequency,
            status: PoolStatus::Open,
            creation_tx_hash: Some(tx_hash.to_string()),
            resolution_tx_hash: None,
            published_artifacts: PublishedArtifacts::default(),
            claim_approved: None,
            dual_auth_result: None,
            commerce_sourced: true,
        };
        self.registry.write().await.insert(entry);
    }
}

fn describe_from_product(product: &Product, request: &ServiceRequest) -> String {
    format!(
        "{} ({} coverage, {} days)",
        product.display_name, request.coverage_type, request.duration_days
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_chain::ChainError;
    use pcl_risk::fetchers::WeatherFetcher;
    use std::sync::atomic::AtomicBool;

    struct FakeChain {
        next_pool_id: std::sync::atomic::AtomicU64,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ChainOps for FakeChain {
        fn clear_cache(&self) {}

        async fn get_configured_oracle(
            &self,
            _variant: ContractVariant,
        ) -> Result<alloy::primitives::Address, ChainError> {
            unimplemented!()
        }

        async fn get_next_pool_id(&self, _variant: ContractVariant) -> Result<pcl_schemas::PoolId, ChainError> {
            unimplemented!()
        }

        async fn get_pool(
            &self,
            _variant: ContractVariant,
            _pool_id: pcl_schemas::PoolId,
        ) -> Result<pcl_chain::PoolView, ChainError> {
            unimplemented!()
        }

        async fn get_pool_accounting(
            &self,
            _variant: ContractVariant,
            _pool_id: pcl_schemas::PoolId,
        ) -> Result<pcl_chain::PoolAccounting, ChainError> {
            unimplemented!()
        }

        async fn get_pool_participants(
            &self,
            _variant: ContractVariant,
            _pool_id: pcl_schemas::PoolId,
        ) -> Result<pcl_chain::PoolParticipants, ChainError> {
            unimplemented!()
        }

        async fn get_required_premium(&self, _pool_id: pcl_schemas::PoolId) -> Result<Money, ChainError> {
            unimplemented!()
        }

        async fn create_pool(
            &self,
            _variant: ContractVariant,
            _params: CreatePoolParams,
            _oracle_armed: bool,
            _not_suspended: bool,
        ) -> Result<(pcl_schemas::PoolId, String), ChainError> {
            if self.fail {
                return Err(ChainError::Transport("simulated rpc failure".to_string()));
            }
            let id = self.next_pool_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok((id, format!("0xtx{id}")))
        }

        async fn resolve_pool(
            &self,
            _variant: ContractVariant,
            _pool_id: pcl_schemas::PoolId,
            _claim_approved: bool,
            _oracle_armed: bool,
            _not_suspended: bool,
        ) -> Result<String, ChainError> {
            unimplemented!()
        }

        async fn cancel_and_refund(
            &self,
            _variant: ContractVariant,
            _pool_id: pcl_schemas::PoolId,
        ) -> Result<String, ChainError> {
            unimplemented!()
        }

        async fn emergency_resolve(
            &self,
            _variant: ContractVariant,
            _pool_id: pcl_schemas::PoolId,
        ) -> Result<String, ChainError> {
            unimplemented!()
        }

        async fn fund_premium(&self, _pool_id: pcl_schemas::PoolId, _amount: Money) -> Result<String, ChainError> {
            unimplemented!()
        }
    }

    fn handler(fail_chain: bool) -> CommerceJobHandler {
        CommerceJobHandler {
            chain: Arc::new(FakeChain { next_pool_id: std::sync::atomic::AtomicU64::new(1), fail: fail_chain }),
            risk_engine: Arc::new(RiskEngine::new(vec![Arc::new(WeatherFetcher::default())])),
            registry: Arc::new(RwLock::new(PoolRegistry::new())),
            variant: ContractVariant::Current,
            oracle_armed: Arc::new(AtomicBool::new(true)),
            not_suspended: Arc::new(AtomicBool::new(true)),
            chain_write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn good_request() -> ServiceRequest {
        ServiceRequest {
            coverage_amount: Money::from_units(500),
            duration_days: 10,
            protocol: None,
            coverage_type: "weather".to_string(),
            raw_text: Some("Will it rain more than 10mm in Seattle this week?".to_string()),
        }
    }

    #[tokio::test]
    async fn rejects_request_failing_basic_validation() {
        let h = handler(false);
        let mut req = good_request();
        req.coverage_amount = Money::from_units(1);
        let deliverable = h.process_job(req, 0).await;
        assert_eq!(deliverable.status, pcl_schemas::CommerceStatus::CoverageRejected);
    }

    #[tokio::test]
    async fn rejects_request_with_no_matching_product() {
        let h = handler(false);
        let mut req = good_request();
        req.raw_text = Some("completely unrelated text with no hits".to_string());
        req.coverage_type = "unknown".to_string();
        let deliverable = h.process_job(req, 0).await;
        assert_eq!(deliverable.status, pcl_schemas::CommerceStatus::CoverageRejected);
        assert!(deliverable.reason.unwrap().contains("no matching"));
    }

    #[tokio::test]
    async fn approved_request_creates_pool_and_registers_it() {
        let h = handler(false);
        let deliverable = h.process_job(good_request(), 0).await;
        assert_eq!(deliverable.status, pcl_schemas::CommerceStatus::CoverageCreated);
        assert_eq!(deliverable.pool_id, Some(1));
        let registry = h.registry.read().await;
        let entry = registry.get(ContractVariant::Current, 1).unwrap();
        assert!(entry.commerce_sourced);
    }

    #[tokio::test]
    async fn chain_failure_surfaces_as_errored_deliverable() {
        let h = handler(true);
        let deliverable = h.process_job(good_request(), 0).await;
        assert_eq!(deliverable.status, pcl_schemas::CommerceStatus::Error);
    }
}
