//! pcl-daemon library target.
//!
//! Exposes the router, state, and bootstrap assembly for integration tests;
//! `main.rs` is a thin binary depending on this library.

pub mod api_types;
pub mod bootstrap;
pub mod routes;
pub mod state;
