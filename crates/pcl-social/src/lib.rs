//! pcl-social
//!
//! The social-platform capability surface (spec §4.7): a trait so the
//! controller never talks to a concrete platform SDK directly, plus a
//! deterministic in-memory fake for tests, plus the outbound artifact
//! payload builder.

pub mod client;
pub mod error;
pub mod fake;
pub mod payload;

pub use client::{FeedOrdering, Post, PublishAck, SocialClient, SHORT_POST_MAX_CHARS};
pub use error::{classify_error_text, SocialError};
pub use fake::FakeSocialClient;
