//! Backend seam for the coordinators.
//!
//! The coordinators only ever see this trait, never `reqwest` directly,
//! so their state machines can be driven by a scripted stub in tests.

use async_trait::async_trait;

use spotter_net::api::{ApiClient, LikeOutcome};
use spotter_net::error::ApiError;
use spotter_shared::message::Message;
use spotter_shared::types::{Candidate, MatchEntry};

/// The four calls the coordinators depend on.
#[async_trait]
pub trait MatchBackend: Send + Sync {
    /// Fetch the ordered candidate deck for `email`.
    async fn recommendations(&self, email: &str) -> Result<Vec<Candidate>, ApiError>;

    /// Record an accept; the server decides whether it completed a
    /// mutual match.
    async fn like(&self, self_email: &str, email_to_like: &str)
        -> Result<LikeOutcome, ApiError>;

    /// Fetch the match roster.
    async fn matches(&self, email: &str) -> Result<Vec<MatchEntry>, ApiError>;

    /// Fetch persisted conversation history for the pair.
    async fn chat_history(
        &self,
        self_email: &str,
        peer_email: &str,
    ) -> Result<Vec<Message>, ApiError>;
}

#[async_trait]
impl MatchBackend for ApiClient {
    async fn recommendations(&self, email: &str) -> Result<Vec<Candidate>, ApiError> {
        ApiClient::recommendations(self, email).await
    }

    async fn like(
        &self,
        self_email: &str,
        email_to_like: &str,
    ) -> Result<LikeOutcome, ApiError> {
        ApiClient::like(self, self_email, email_to_like).await
    }

    async fn matches(&self, email: &str) -> Result<Vec<MatchEntry>, ApiError> {
        ApiClient::matches(self, email).await
    }

    async fn chat_history(
        &self,
        self_email: &str,
        peer_email: &str,
    ) -> Result<Vec<Message>, ApiError> {
        ApiClient::chat_history(self, self_email, peer_email).await
    }
}
