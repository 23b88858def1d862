//! Error taxonomy for chain operations.

use std::fmt;

/// Errors a [`crate::client::ChainClient`] call may return.
///
/// Mirrors the shape of `mqk-md::provider::ProviderError`: a small closed
/// enum consumed by name so callers can branch on failure kind instead of
/// matching on message text.
#[derive(Debug)]
pub enum ChainError {
    /// Transient transport failure (connection reset, HTTP 5xx/429, RPC
    /// timeout) — retried by [`crate::retry::with_retry`] up to its bound.
    Transport(String),
    /// The contract rejected the call (a Solidity `revert`). Terminal for
    /// that call; never retried.
    Reverted(String),
    /// A response could not be decoded into the expected ABI shape.
    Decode(String),
    /// Required configuration (RPC URL, signer, contract address) is
    /// missing or invalid.
    Config(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Transport(msg) => write!(f, "chain transport error: {msg}"),
            ChainError::Reverted(msg) => write!(f, "chain call reverted: {msg}"),
            ChainError::Decode(msg) => write!(f, "chain response decode error: {msg}"),
            ChainError::Config(msg) => write!(f, "chain client misconfigured: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl ChainError {
    /// `true` if this error class is worth retrying (transient transport
    /// failures only — a revert will never succeed on retry).
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Transport(_))
    }

    /// Classify an `alloy` contract-call error as transient or terminal.
    /// Reverts and decode failures carry the provider's own message; the
    /// transient bucket is everything else (connection, RPC-layer errors).
    pub fn from_alloy_contract_error(err: alloy::contract::Error) -> Self {
        match &err {
            alloy::contract::Error::TransportError(transport_err) => {
                if let Some(resp) = transport_err.as_error_resp() {
                    ChainError::Reverted(resp.message.to_string())
                } else {
                    ChainError::Transport(transport_err.to_string())
                }
            }
            alloy::contract::Error::AbiError(e) => ChainError::Decode(e.to_string()),
            other => ChainError::Transport(other.to_string()),
        }
    }
}
