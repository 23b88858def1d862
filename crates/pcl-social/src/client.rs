//! The `SocialClient` capability trait (spec §4.7), grounded on
//! `mqk-testkit::paper_broker::PaperBroker`: one trait shared by a real
//! network-backed implementation (out of scope per spec §1) and
//! [`crate::fake::FakeSocialClient`] for tests and the controller's own
//! fake-only CI path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SocialError;

pub const SHORT_POST_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrdering {
    Hot,
    New,
}

/// One post as surfaced by a feed/mentions/inbox read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_at_unix: i64,
    /// True when this post is a direct mention of the agent's own handle.
    pub is_mention: bool,
}

/// Acknowledgement returned by a publish/reply/like call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishAck {
    pub post_id: String,
}

/// Capability set consumed by the Lifecycle Controller. Every method can
/// fail; the caller treats failures as non-fatal (spec §4.7) except for
/// [`SocialError::Suspended`], which sets the suspension-expiry flag and
/// downgrades the rest of the cycle to on-chain-only (spec §7).
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Publish a short post. Caller must keep `body.len() <= SHORT_POST_MAX_CHARS`.
    async fn publish_short(&self, body: &str) -> Result<PublishAck, SocialError>;

    /// Publish a long-form article (larger bound than a short post).
    async fn publish_long(&self, title: &str, body: &str) -> Result<PublishAck, SocialError>;

    async fn reply(&self, in_reply_to: &str, body: &str) -> Result<PublishAck, SocialError>;

    async fn upvote(&self, post_id: &str) -> Result<(), SocialError>;

    async fn read_feed(&self, ordering: FeedOrdering, limit: usize) -> Result<Vec<Post>, SocialError>;

    async fn read_mentions(&self, limit: usize) -> Result<Vec<Post>, SocialError>;

    async fn read_inbox(&self, limit: usize) -> Result<Vec<Post>, SocialError>;

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<Post>, SocialError>;
}
