//! Error taxonomy for the dual-auditor pipeline. Mirrors `pcl_chain::ChainError`'s
//! shape: a small closed enum consumed by name, not by message text.

use std::fmt;

#[derive(Debug)]
pub enum OracleError {
    Transport(String),
    Api(String),
    Decode(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Transport(m) => write!(f, "llm transport error: {m}"),
            OracleError::Api(m) => write!(f, "llm api error: {m}"),
            OracleError::Decode(m) => write!(f, "llm response decode error: {m}"),
        }
    }
}

impl std::error::Error for OracleError {}
