//! `TxGateway` — the single choke-point for every on-chain write.
//!
//! Grounded directly on `mqk-execution::gateway::BrokerGateway`: gate
//! verdicts are evaluated once, immediately before dispatch, and refuse the
//! call outright if either fails; the actual submission only ever runs
//! behind a single-writer lock so nonces are assigned strictly in order.

use std::future::Future;

use tokio::sync::Mutex;

use crate::error::ChainError;

/// Why a write was refused before it ever reached the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRefusal {
    /// The configured wallet is not the contract's recognized oracle.
    OracleNotArmed,
    /// The controller is in a suspended/paused state.
    Suspended,
}

impl std::fmt::Display for GateRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateRefusal::OracleNotArmed => write!(f, "GATE_REFUSED: oracle wallet not armed"),
            GateRefusal::Suspended => write!(f, "GATE_REFUSED: controller suspended"),
        }
    }
}

impl std::error::Error for GateRefusal {}

impl From<GateRefusal> for ChainError {
    fn from(g: GateRefusal) -> Self {
        ChainError::Config(g.to_string())
    }
}

/// Serializes every on-chain write behind one lock, and evaluates the two
/// gate verdicts (oracle-armed, not-suspended) exactly once per call,
/// immediately before the locked section runs.
pub struct TxGateway {
    lock: Mutex<()>,
}

impl TxGateway {
    pub fn new() -> Self {
        TxGateway { lock: Mutex::new(()) }
    }

    fn enforce_gates(oracle_armed: bool, not_suspended: bool) -> Result<(), GateRefusal> {
        if !oracle_armed {
            return Err(GateRefusal::OracleNotArmed);
        }
        if !not_suspended {
            return Err(GateRefusal::Suspended);
        }
        Ok(())
    }

    /// Run `op` under the write lock, but only if both gate verdicts pass.
    /// `op` is given no arguments and is expected to close over whatever
    /// state it needs — this keeps the gateway itself free of any
    /// chain-specific knowledge.
    pub async fn run<F, Fut, T>(
        &self,
        oracle_armed: bool,
        not_suspended: bool,
        op: F,
    ) -> Result<T, ChainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        Self::enforce_gates(oracle_armed, not_suspended)?;
        let _guard = self.lock.lock().await;
        op().await
    }
}

impl Default for TxGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_when_oracle_not_armed() {
        let gw = TxGateway::new();
        let result: Result<(), ChainError> = gw.run(false, true, || async { Ok(()) }).await;
        assert!(matches!(result, Err(ChainError::Config(_))));
    }

    #[tokio::test]
    async fn refuses_when_suspended() {
        let gw = TxGateway::new();
        let result: Result<(), ChainError> = gw.run(true, false, || async { Ok(()) }).await;
        assert!(matches!(result, Err(ChainError::Config(_))));
    }

    #[tokio::test]
    async fn runs_when_both_gates_clear() {
        let gw = TxGateway::new();
        let result = gw.run(true, true, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn serializes_concurrent_writes() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let gw = Arc::new(TxGateway::new());
        let concurrent = Arc::new(AtomicU32::new(0));
        let max_concurrent = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let gw = gw.clone();
            let concurrent = concurrent.clone();
            let max_concurrent = max_concurrent.clone();
            handles.push(tokio::spawn(async move {
                gw.run(true, true, || async {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    max_concurrent.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, ChainError>(())
                })
                .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }
}
