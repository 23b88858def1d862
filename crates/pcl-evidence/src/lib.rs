//! pcl-evidence
//!
//! Fetches evidence for a pool's resolution and sanitizes it before it is
//! ever shown to an auditor. This crate owns the only outbound HTTP calls
//! that feed into the oracle path.

pub mod fetcher;
pub mod sanitize;

pub use fetcher::{EvidenceFetchError, EvidenceFetcher};
pub use sanitize::sanitize;
