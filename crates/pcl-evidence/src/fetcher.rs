//! Hardened outbound HTTP fetcher for oracle evidence.
//!
//! Grounded on `mqk-broker-alpaca`/`mqk-md`'s `reqwest::Client`
//! construction (timeout + `rustls-tls`), generalized with a redirect cap
//! and a size-bounded, sanitized body instead of a typed JSON response.

use std::fmt;
use std::time::Duration;

use crate::sanitize::{sanitize, MAX_EVIDENCE_BYTES};

const TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: usize = 3;

#[derive(Debug)]
pub enum EvidenceFetchError {
    InsecureUrlInEnclaveMode(String),
    Transport(String),
    Status(u16),
}

impl fmt::Display for EvidenceFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceFetchError::InsecureUrlInEnclaveMode(url) => {
                write!(f, "refusing non-HTTPS url in enclave mode: {url}")
            }
            EvidenceFetchError::Transport(m) => write!(f, "transport error: {m}"),
            EvidenceFetchError::Status(code) => write!(f, "evidence source returned status {code}"),
        }
    }
}

impl std::error::Error for EvidenceFetchError {}

/// Fetches and sanitizes evidence from a single URL. In enclave mode HTTPS
/// is mandatory and the client is built with a stricter TLS posture; outside
/// enclave mode HTTPS is preferred but plain HTTP is tolerated.
pub struct EvidenceFetcher {
    client: reqwest::Client,
    enclave_mode: bool,
}

impl EvidenceFetcher {
    pub fn new(enclave_mode: bool) -> Result<Self, EvidenceFetchError> {
        let client = build_client(enclave_mode)?;
        Ok(EvidenceFetcher { client, enclave_mode })
    }

    pub async fn fetch(&self, url: &str) -> Result<String, EvidenceFetchError> {
        if self.enclave_mode && !url.starts_with("https://") {
            return Err(EvidenceFetchError::InsecureUrlInEnclaveMode(url.to_string()));
        }

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EvidenceFetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EvidenceFetchError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| EvidenceFetchError::Transport(e.to_string()))?;
        let truncated = &bytes[..bytes.len().min(MAX_EVIDENCE_BYTES)];
        let raw = String::from_utf8_lossy(truncated);
        Ok(sanitize(&raw))
    }
}

fn build_client(enclave_mode: bool) -> Result<reqwest::Client, EvidenceFetchError> {
    let mut builder = reqwest::Client::builder()
        .timeout(TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

    if enclave_mode {
        builder = builder.https_only(true).min_tls_version(reqwest::tls::Version::TLS_1_2);
    }

    builder
        .build()
        .map_err(|e| EvidenceFetchError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_standard_client() {
        assert!(EvidenceFetcher::new(false).is_ok());
    }

    #[test]
    fn builds_an_enclave_mode_client() {
        assert!(EvidenceFetcher::new(true).is_ok());
    }

    #[tokio::test]
    async fn enclave_mode_refuses_plain_http() {
        let fetcher = EvidenceFetcher::new(true).unwrap();
        let err = fetcher.fetch("http://example.com/evidence").await.unwrap_err();
        assert!(matches!(err, EvidenceFetchError::InsecureUrlInEnclaveMode(_)));
    }
}
