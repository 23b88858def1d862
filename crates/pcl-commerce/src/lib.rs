//! pcl-commerce
//!
//! The commerce job handler (spec §4.6): accepts a structured or free-text
//! service request, validates it, matches it to a catalog product, prices
//! it through the risk engine, creates the pool on-chain, and records it in
//! the registry. Jobs are processed strictly one at a time through
//! [`CommerceQueue`].

pub mod handler;
pub mod parse;
pub mod queue;
pub mod validate;

pub use handler::CommerceJobHandler;
pub use parse::{parse_free_text, parse_json};
pub use queue::{CommerceJob, CommerceQueue};
pub use validate::{validate, CommerceValidationError, MAX_DURATION_DAYS, MIN_COVERAGE_UNITS, MIN_DURATION_DAYS};
