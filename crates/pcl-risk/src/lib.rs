//! pcl-risk
//!
//! Turns a free-form coverage description into either an approved premium
//! quote or a rejection with a corrective suggestion. Pure aside from
//! bounded outbound HTTP in the historical-frequency stage, which always
//! degrades to a hardcoded base rate rather than blocking a quote.

pub mod catalog;
pub mod category;
pub mod engine;
pub mod fetchers;
pub mod frequency;
pub mod validation;

pub use catalog::{by_category, by_id, match_product, Product, CATALOG};
pub use category::{detect_category, Category};
pub use engine::{ApprovedRisk, RiskEngine, RiskOutcome};
pub use fetchers::{base_rate, CryptoPriceFetcher, DefiProtocolFetcher, GasFeeFetcher, OnChainEventFetcher, WeatherFetcher};
pub use frequency::{FetchError, FrequencyFetcher, FrequencyResult};
pub use validation::{extract_threshold, security_screen, validate_parametric, RiskRejection};
