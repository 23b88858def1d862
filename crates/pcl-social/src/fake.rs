//! Deterministic in-memory [`SocialClient`], grounded directly on
//! `mqk-testkit::paper_broker::PaperBroker`: counters for IDs, no RNG, no
//! network I/O, an append-only in-memory log of everything published.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{FeedOrdering, Post, PublishAck, SocialClient, SHORT_POST_MAX_CHARS};
use crate::error::SocialError;

struct State {
    next_post_id: u64,
    published: Vec<Post>,
    upvoted: Vec<String>,
    seeded_feed: Vec<Post>,
    seeded_mentions: Vec<Post>,
    seeded_inbox: Vec<Post>,
    /// When set, every write-class call returns this error instead of
    /// succeeding, simulating a suspended/rate-limited account.
    forced_error: Option<SocialError>,
}

/// Deterministic fake standing in for a network-backed social platform
/// adapter. `handle` is the agent's own username, used to tag authored posts.
pub struct FakeSocialClient {
    handle: String,
    state: Mutex<State>,
}

impl FakeSocialClient {
    pub fn new(handle: impl Into<String>) -> Self {
        FakeSocialClient {
            handle: handle.into(),
            state: Mutex::new(State {
                next_post_id: 1,
                published: Vec::new(),
                upvoted: Vec::new(),
                seeded_feed: Vec::new(),
                seeded_mentions: Vec::new(),
                seeded_inbox: Vec::new(),
                forced_error: None,
            }),
        }
    }

    pub fn seed_feed(&self, posts: Vec<Post>) {
        self.state.lock().unwrap().seeded_feed = posts;
    }

    pub fn seed_mentions(&self, posts: Vec<Post>) {
        self.state.lock().unwrap().seeded_mentions = posts;
    }

    pub fn seed_inbox(&self, posts: Vec<Post>) {
        self.state.lock().unwrap().seeded_inbox = posts;
    }

    /// Make every subsequent write-class call fail with `error`, simulating
    /// suspension/rate-limiting.
    pub fn force_error(&self, error: SocialError) {
        self.state.lock().unwrap().forced_error = Some(error);
    }

    pub fn clear_forced_error(&self) {
        self.state.lock().unwrap().forced_error = None;
    }

    pub fn published(&self) -> Vec<Post> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn upvoted_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().upvoted.clone()
    }

    fn next_id(state: &mut State) -> String {
        let id = format!("POST-{:06}", state.next_post_id);
        state.next_post_id += 1;
        id
    }
}

#[async_trait]
impl SocialClient for FakeSocialClient {
    async fn publish_short(&self, body: &str) -> Result<PublishAck, SocialError> {
        if body.len() > SHORT_POST_MAX_CHARS {
            return Err(SocialError::Other(format!(
                "short post body of {} chars exceeds {SHORT_POST_MAX_CHARS}",
                body.len()
            )));
        }
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.forced_error.clone() {
            return Err(err);
        }
        let id = Self::next_id(&mut state);
        state.published.push(Post {
            id: id.clone(),
            author: self.handle.clone(),
            body: body.to_string(),
            created_at_unix: 0,
            is_mention: false,
        });
        Ok(PublishAck { post_id: id })
    }

    async fn publish_long(&self, title: &str, body: &str) -> Result<PublishAck, SocialError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.forced_error.clone() {
            return Err(err);
        }
        let id = Self::next_id(&mut state);
        let full_body = format!("{title}\n\n{body}");
        state.published.push(Post {
            id: id.clone(),
            author: self.handle.clone(),
            body: full_body,
            created_at_unix: 0,
            is_mention: false,
        });
        Ok(PublishAck { post_id: id })
    }

    async fn reply(&self, in_reply_to: &str, body: &str) -> Result<PublishAck, SocialError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.forced_error.clone() {
            return Err(err);
        }
        let id = Self::next_id(&mut state);
        state.published.push(Post {
            id: id.clone(),
            author: self.handle.clone(),
            body: format!("@{in_reply_to} {body}"),
            created_at_unix: 0,
            is_mention: false,
        });
        Ok(PublishAck { post_id: id })
    }

    async fn upvote(&self, post_id: &str) -> Result<(), SocialError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.forced_error.clone() {
            return Err(err);
        }
        state.upvoted.push(post_id.to_string());
        Ok(())
    }

    async fn read_feed(&self, _ordering: FeedOrdering, limit: usize) -> Result<Vec<Post>, SocialError> {
        let state = self.state.lock().unwrap();
        Ok(state.seeded_feed.iter().take(limit).cloned().collect())
    }

    async fn read_mentions(&self, limit: usize) -> Result<Vec<Post>, SocialError> {
        let state = self.state.lock().unwrap();
        Ok(state.seeded_mentions.iter().take(limit).cloned().collect())
    }

    async fn read_inbox(&self, limit: usize) -> Result<Vec<Post>, SocialError> {
        let state = self.state.lock().unwrap();
        Ok(state.seeded_inbox.iter().take(limit).cloned().collect())
    }

    async fn search(&self, phrase: &str, limit: usize) -> Result<Vec<Post>, SocialError> {
        let state = self.state.lock().unwrap();
        let lower = phrase.to_lowercase();
        Ok(state
            .seeded_feed
            .iter()
            .filter(|p| p.body.to_lowercase().contains(&lower))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_short_rejects_oversized_body() {
        let client = FakeSocialClient::new("paracle_bot");
        let body = "x".repeat(SHORT_POST_MAX_CHARS + 1);
        assert!(client.publish_short(&body).await.is_err());
    }

    #[tokio::test]
    async fn publish_short_assigns_deterministic_ids() {
        let client = FakeSocialClient::new("paracle_bot");
        let a = client.publish_short("first").await.unwrap();
        let b = client.publish_short("second").await.unwrap();
        assert_eq!(a.post_id, "POST-000001");
        assert_eq!(b.post_id, "POST-000002");
        assert_eq!(client.published().len(), 2);
    }

    #[tokio::test]
    async fn forced_error_surfaces_on_write_calls_only() {
        let client = FakeSocialClient::new("paracle_bot");
        client.force_error(SocialError::Suspended { until_unix: 123 });
        assert!(client.publish_short("hi").await.is_err());
        assert!(client.upvote("POST-000001").await.is_err());
        assert!(client.read_feed(FeedOrdering::Hot, 10).await.is_ok());
    }
}
