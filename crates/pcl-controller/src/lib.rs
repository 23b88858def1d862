//! pcl-controller
//!
//! The Lifecycle Controller (spec §4.8): the single-threaded heartbeat loop
//! that owns the pool registry, monitors on-chain pool transitions, drives
//! dual-auditor resolution, gates new pool creation, and engages socially.
//! Grounded throughout on `mqk_testkit::orchestrator::Orchestrator`'s
//! fixed-order, error-collecting composition of sub-engines.

mod artifacts;
pub mod controller;
pub mod error;
pub mod social;

pub use controller::{Controller, ControllerConfig, HeartbeatReport};
pub use error::ControllerError;
