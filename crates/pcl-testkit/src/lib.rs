//! pcl-testkit
//!
//! Fakes and an end-to-end scenario harness, grounded on
//! `mqk-testkit::{paper_broker, orchestrator}`: deterministic doubles for
//! every boundary the Lifecycle Controller crosses, plus a one-call
//! [`harness::build`] that assembles a complete `Controller` against them so
//! `tests/scenario_*.rs` can drive whole heartbeats instead of unit-testing
//! sub-engines in isolation.

pub mod fake_chain;
pub mod harness;

pub use fake_chain::{FakeChain, FakePoolRecord};
pub use harness::{build, build_with_auditor, TestHarness};
