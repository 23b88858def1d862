//! pcl-chain
//!
//! The agent's only path to the chain: reads are cached and paced, writes
//! are retried on transient failure and serialized behind a single gate,
//! grounded on `mqk-execution::gateway::BrokerGateway`/`OrderRouter`'s
//! "single choke-point" pattern applied to on-chain transactions instead of
//! broker orders.

pub mod artifact_calls;
pub mod client;
pub mod error;
pub mod gateway;
pub mod ops;
pub mod retry;
pub mod views;

pub use client::{build_provider, ChainClient, ContractAddresses};
pub use error::ChainError;
pub use gateway::{GateRefusal, TxGateway};
pub use ops::ChainOps;
pub use views::{CreatePoolParams, PoolAccounting, PoolParticipants, PoolView};
