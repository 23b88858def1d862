//! Sequential in-process commerce job queue (spec §4.6 "one job processed
//! at a time, no overlap"). Grounded on `mqk-db`'s outbox claim-lock idea
//! (`PENDING -> CLAIMED -> SENT`, one claim at a time) reimplemented without
//! a database: jobs sit in a `Mutex`-guarded `VecDeque` until a single
//! worker claims, processes, and releases one.

use std::collections::VecDeque;

use pcl_schemas::{CommerceDeliverable, ServiceRequest};
use tokio::sync::{oneshot, Mutex, Notify};

use crate::handler::CommerceJobHandler;

pub struct CommerceJob {
    pub request: ServiceRequest,
    pub submitted_at_unix: i64,
    respond_to: oneshot::Sender<CommerceDeliverable>,
}

/// FIFO queue of pending commerce jobs with a single worker loop.
pub struct CommerceQueue {
    jobs: Mutex<VecDeque<CommerceJob>>,
    notify: Notify,
}

impl Default for CommerceQueue {
    fn default() -> Self {
        CommerceQueue { jobs: Mutex::new(VecDeque::new()), notify: Notify::new() }
    }
}

impl CommerceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a job and return a receiver that resolves once the worker
    /// has produced a deliverable for it.
    pub async fn enqueue(&self, request: ServiceRequest, now: i64) -> oneshot::Receiver<CommerceDeliverable> {
        let (tx, rx) = oneshot::channel();
        let job = CommerceJob { request, submitted_at_unix: now, respond_to: tx };
        self.jobs.lock().await.push_back(job);
        self.notify.notify_one();
        rx
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Claim and process exactly one job, if any is pending. Returns `false`
    /// if the queue was empty. The handler call happens outside the queue
    /// lock so enqueuers are never blocked on an in-flight chain write.
    pub async fn process_one(&self, handler: &CommerceJobHandler, now: i64) -> bool {
        let job = {
            let mut jobs = self.jobs.lock().await;
            jobs.pop_front()
        };
        let Some(job) = job else {
            return false;
        };
        let deliverable = handler.process_job(job.request, now).await;
        let _ = job.respond_to.send(deliverable);
        true
    }

    /// Run the worker loop forever: wait for a notification, drain the
    /// queue one job at a time, then wait again.
    pub async fn run_worker(&self, handler: &CommerceJobHandler, now_fn: impl Fn() -> i64) {
        loop {
            while self.process_one(handler, now_fn()).await {}
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_chain::ChainOps;
    use pcl_registry::PoolRegistry;
    use pcl_risk::engine::RiskEngine;
    use pcl_schemas::{ContractVariant, Money};
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    struct NoopChain;

    #[async_trait::async_trait]
    impl ChainOps for NoopChain {
        fn clear_cache(&self) {}
        async fn get_configured_oracle(
            &self,
            _v: ContractVariant,
        ) -> Result<alloy::primitives::Address, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn get_next_pool_id(&self, _v: ContractVariant) -> Result<pcl_schemas::PoolId, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn get_pool(
            &self,
            _v: ContractVariant,
            _id: pcl_schemas::PoolId,
        ) -> Result<pcl_chain::PoolView, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn get_pool_accounting(
            &self,
            _v: ContractVariant,
            _id: pcl_schemas::PoolId,
        ) -> Result<pcl_chain::PoolAccounting, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn get_pool_participants(
            &self,
            _v: ContractVariant,
            _id: pcl_schemas::PoolId,
        ) -> Result<pcl_chain::PoolParticipants, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn get_required_premium(&self, _id: pcl_schemas::PoolId) -> Result<Money, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn create_pool(
            &self,
            _v: ContractVariant,
            _params: pcl_chain::CreatePoolParams,
            _oracle_armed: bool,
            _not_suspended: bool,
        ) -> Result<(pcl_schemas::PoolId, String), pcl_chain::ChainError> {
            Ok((1, "0xtx1".to_string()))
        }
        async fn resolve_pool(
            &self,
            _v: ContractVariant,
            _id: pcl_schemas::PoolId,
            _claim_approved: bool,
            _oracle_armed: bool,
            _not_suspended: bool,
        ) -> Result<String, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn cancel_and_refund(
            &self,
            _v: ContractVariant,
            _id: pcl_schemas::PoolId,
        ) -> Result<String, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn emergency_resolve(
            &self,
            _v: ContractVariant,
            _id: pcl_schemas::PoolId,
        ) -> Result<String, pcl_chain::ChainError> {
            unimplemented!()
        }
        async fn fund_premium(&self, _id: pcl_schemas::PoolId, _amount: Money) -> Result<String, pcl_chain::ChainError> {
            unimplemented!()
        }
    }

    fn handler() -> CommerceJobHandler {
        CommerceJobHandler {
            chain: Arc::new(NoopChain),
            risk_engine: Arc::new(RiskEngine::new(vec![Arc::new(
                pcl_risk::fetchers::WeatherFetcher::default(),
            )])),
            registry: Arc::new(RwLock::new(PoolRegistry::new())),
            variant: ContractVariant::Current,
            oracle_armed: Arc::new(AtomicBool::new(true)),
            not_suspended: Arc::new(AtomicBool::new(true)),
            chain_write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    #[tokio::test]
    async fn enqueue_then_process_one_resolves_the_receiver() {
        let queue = CommerceQueue::new();
        let rx = queue
            .enqueue(
                ServiceRequest {
                    coverage_amount: Money::from_units(500),
                    duration_days: 10,
                    protocol: None,
                    coverage_type: "weather".to_string(),
                    raw_text: Some("Will it rain more than 10mm in Seattle this week?".to_string()),
                },
                0,
            )
            .await;
        assert_eq!(queue.len().await, 1);

        let h = handler();
        assert!(queue.process_one(&h, 0).await);
        assert_eq!(queue.len().await, 0);

        let deliverable = rx.await.unwrap();
        assert_eq!(deliverable.status, pcl_schemas::CommerceStatus::CoverageCreated);
    }

    #[tokio::test]
    async fn process_one_on_empty_queue_returns_false() {
        let queue = CommerceQueue::new();
        let h = handler();
        assert!(!queue.process_one(&h, 0).await);
    }

    #[tokio::test]
    async fn jobs_are_processed_strictly_one_at_a_time() {
        let queue = CommerceQueue::new();
        let h = handler();
        for _ in 0..3 {
            queue
                .enqueue(
                    ServiceRequest {
                        coverage_amount: Money::from_units(500),
                        duration_days: 10,
                        protocol: None,
                        coverage_type: "weather".to_string(),
                        raw_text: Some("Will it rain more than 10mm in Seattle this week?".to_string()),
                    },
                    0,
                )
                .await;
        }
        assert_eq!(queue.len().await, 3);
        while queue.process_one(&h, 0).await {}
        assert_eq!(queue.len().await, 0);
    }
}
