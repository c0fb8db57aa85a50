//! Chat session coordinator.
//!
//! Maintains one active peer conversation: merges durable history with
//! the live push stream and exposes an ordered, de-duplicated log.
//! The live subscription is additive at the transport layer (rooms are
//! never left), so the room-membership filter in [`ChatSession::on_incoming`]
//! is the only safeguard against cross-room delivery and must hold after
//! every peer switch.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use spotter_net::error::ApiError;
use spotter_net::socket::SocketCommand;
use spotter_shared::message::Message;
use spotter_shared::types::{MatchEntry, RoomKey};

use crate::backend::MatchBackend;

/// Lifecycle of the active conversation.
///
/// There is no error state: a failed history fetch leaves the log empty
/// and still reaches `Ready` (deliberate silent-degradation policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unselected,
    Loading,
    Ready,
}

#[derive(Error, Debug)]
pub enum ChatError {
    /// Empty after trimming; rejected before any network activity.
    #[error("Message is empty")]
    EmptyMessage,

    /// No peer selected yet.
    #[error("No conversation selected")]
    NoPeer,

    /// The live channel task is gone; the message was not published.
    #[error("Live channel closed")]
    ChannelClosed,
}

/// The active two-party conversation.
pub struct ChatSession {
    backend: Arc<dyn MatchBackend>,
    socket: mpsc::Sender<SocketCommand>,
    self_email: String,
    peer_email: Option<String>,
    room: Option<RoomKey>,
    history: Vec<Message>,
    phase: SessionPhase,
    select_generation: u64,
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn MatchBackend>,
        socket: mpsc::Sender<SocketCommand>,
        self_email: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            socket,
            self_email: self_email.into(),
            peer_email: None,
            room: None,
            history: Vec::new(),
            phase: SessionPhase::Unselected,
            select_generation: 0,
        }
    }

    // -----------------------------------------------------------------
    // Peer selection
    // -----------------------------------------------------------------

    /// Switch to `peer_email`: discard the previous conversation
    /// wholesale, join the new room on the live channel, and invalidate
    /// any history fetch still in flight. Returns the generation ticket
    /// the eventual [`ChatSession::apply_history`] must present.
    ///
    /// This is the only mutation path for the peer.
    pub fn begin_select(&mut self, peer_email: &str) -> u64 {
        let room = RoomKey::new(&self.self_email, peer_email);
        info!(peer = peer_email, room = %room, "Selecting chat peer");

        self.peer_email = Some(peer_email.to_string());
        self.room = Some(room);
        self.history.clear();
        self.phase = SessionPhase::Loading;
        self.select_generation += 1;

        // Additive join; stale rooms keep delivering and are filtered
        // out in on_incoming.
        let join = SocketCommand::JoinRoom {
            user_email1: self.self_email.clone(),
            user_email2: peer_email.to_string(),
        };
        if self.socket.try_send(join).is_err() {
            warn!("Live channel unavailable; room join not sent");
        }

        self.select_generation
    }

    /// Install a resolved history fetch. A stale ticket (superseded by
    /// a newer `begin_select`) is discarded, so a slow fetch for a
    /// previous peer can never overwrite the current conversation.
    ///
    /// Live messages that raced in while loading are merged with the
    /// fetched history, ordered by timestamp, and de-duplicated by
    /// field equality (no message ids exist on this wire).
    pub fn apply_history(
        &mut self,
        generation: u64,
        fetched: Result<Vec<Message>, ApiError>,
    ) -> bool {
        if generation != self.select_generation {
            debug!(
                generation,
                current = self.select_generation,
                "Discarding stale history fetch"
            );
            return false;
        }

        match fetched {
            Ok(mut messages) => {
                // Keep anything the live stream delivered while the
                // fetch was in flight, minus what the fetch also saw.
                let raced: Vec<Message> = self
                    .history
                    .drain(..)
                    .filter(|live| !messages.contains(live))
                    .collect();
                messages.extend(raced);
                messages.sort_by_key(|m| m.timestamp);
                self.history = messages;
            }
            Err(e) => {
                // Empty history, still Ready.
                warn!(error = %e, "Failed to load chat history");
            }
        }

        self.phase = SessionPhase::Ready;
        true
    }

    /// Select a peer and load its history. Out-of-order completions are
    /// safe: the last `select_peer` call wins.
    pub async fn select_peer(&mut self, peer_email: &str) -> SessionPhase {
        let generation = self.begin_select(peer_email);
        let fetched = self
            .backend
            .chat_history(&self.self_email, peer_email)
            .await;
        self.apply_history(generation, fetched);
        self.phase
    }

    // -----------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------

    /// Publish a message to the current peer.
    ///
    /// No optimistic local append: the message comes back through the
    /// same-room broadcast, sender included. If the connection dropped,
    /// the user's own message is absent from their view until reconnect
    /// (retained known fragility of the observed design).
    pub async fn send(&self, content: &str) -> Result<(), ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let peer = self.peer_email.as_deref().ok_or(ChatError::NoPeer)?;

        self.socket
            .send(SocketCommand::Publish {
                sender_email: self.self_email.clone(),
                receiver_email: peer.to_string(),
                content: content.to_string(),
            })
            .await
            .map_err(|_| ChatError::ChannelClosed)
    }

    /// Stream callback for a live `privateMessage` broadcast.
    ///
    /// Appends iff the message belongs to the active room; anything else
    /// is discarded, not queued. Returns whether the log changed.
    pub fn on_incoming(&mut self, message: Message) -> bool {
        let Some(peer) = self.peer_email.as_deref() else {
            return false;
        };
        if !message.is_between(&self.self_email, peer) {
            debug!(
                sender = %message.sender_email,
                receiver = %message.receiver_email,
                "Dropping message for another room"
            );
            return false;
        }
        self.history.push(message);
        true
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn peer_email(&self) -> Option<&str> {
        self.peer_email.as_deref()
    }

    pub fn room(&self) -> Option<&RoomKey> {
        self.room.as_ref()
    }

    /// The ordered message log for rendering.
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

/// The match roster plus the default peer to open with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub matches: Vec<MatchEntry>,
    /// Peer with the most recent message; first match when no history
    /// exists anywhere; `None` without matches.
    pub default_peer: Option<String>,
}

/// Fetch the match list and pick the default conversation.
///
/// History fetches fan out concurrently with per-item error isolation: a
/// failing fetch is logged and skipped, never retried, and never blocks
/// the others.
pub async fn load_roster(
    backend: &dyn MatchBackend,
    self_email: &str,
) -> Result<Roster, ApiError> {
    let matches = backend.matches(self_email).await?;
    if matches.is_empty() {
        return Ok(Roster {
            matches,
            default_peer: None,
        });
    }

    let histories = futures::future::join_all(
        matches
            .iter()
            .map(|entry| backend.chat_history(self_email, &entry.email)),
    )
    .await;

    let mut default_peer: Option<&str> = None;
    let mut latest = None;
    for (entry, fetched) in matches.iter().zip(histories) {
        match fetched {
            Ok(messages) => {
                if let Some(newest) = messages.iter().map(|m| m.timestamp).max() {
                    if latest.map_or(true, |seen| newest > seen) {
                        latest = Some(newest);
                        default_peer = Some(&entry.email);
                    }
                }
            }
            Err(e) => {
                warn!(peer = %entry.email, error = %e, "Failed to load chat history");
            }
        }
    }

    let default_peer = default_peer
        .map(str::to_string)
        .or_else(|| matches.first().map(|entry| entry.email.clone()));

    Ok(Roster {
        matches,
        default_peer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use spotter_net::api::LikeOutcome;
    use spotter_shared::types::Candidate;

    fn message(sender: &str, receiver: &str, content: &str, minute: u32) -> Message {
        Message {
            sender_email: sender.to_string(),
            receiver_email: receiver.to_string(),
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 10, minute, 0).unwrap(),
        }
    }

    fn entry(email: &str) -> MatchEntry {
        MatchEntry {
            email: email.to_string(),
            username: email.split('@').next().unwrap_or(email).to_string(),
            profile_picture_url: None,
        }
    }

    /// Per-peer scripted histories.
    struct StubBackend {
        roster: Vec<MatchEntry>,
        histories: Mutex<HashMap<String, Result<Vec<Message>, ApiError>>>,
    }

    impl StubBackend {
        fn new(roster: Vec<MatchEntry>) -> Self {
            Self {
                roster,
                histories: Mutex::new(HashMap::new()),
            }
        }

        fn history_for(self, peer: &str, result: Result<Vec<Message>, ApiError>) -> Self {
            self.histories
                .lock()
                .unwrap()
                .insert(peer.to_string(), result);
            self
        }
    }

    #[async_trait]
    impl MatchBackend for StubBackend {
        async fn recommendations(&self, _email: &str) -> Result<Vec<Candidate>, ApiError> {
            Ok(Vec::new())
        }

        async fn like(
            &self,
            _self_email: &str,
            _email_to_like: &str,
        ) -> Result<LikeOutcome, ApiError> {
            Ok(LikeOutcome::Liked)
        }

        async fn matches(&self, _email: &str) -> Result<Vec<MatchEntry>, ApiError> {
            Ok(self.roster.clone())
        }

        async fn chat_history(
            &self,
            _self_email: &str,
            peer_email: &str,
        ) -> Result<Vec<Message>, ApiError> {
            match self.histories.lock().unwrap().remove(peer_email) {
                Some(result) => result,
                None => Ok(Vec::new()),
            }
        }
    }

    fn session_with(
        backend: StubBackend,
    ) -> (ChatSession, mpsc::Receiver<SocketCommand>) {
        let (tx, rx) = mpsc::channel(16);
        (ChatSession::new(Arc::new(backend), tx, "me@x"), rx)
    }

    #[tokio::test]
    async fn test_select_peer_reaches_ready_with_history() {
        let backend = StubBackend::new(vec![entry("ana@x")]).history_for(
            "ana@x",
            Ok(vec![
                message("ana@x", "me@x", "hola", 5),
                message("me@x", "ana@x", "buenas", 2),
            ]),
        );
        let (mut session, _rx) = session_with(backend);
        assert_eq!(session.phase(), SessionPhase::Unselected);

        let phase = session.select_peer("ana@x").await;

        assert_eq!(phase, SessionPhase::Ready);
        assert_eq!(session.room().unwrap().as_str(), "ana@x_me@x");
        // History comes out chronological regardless of fetch order.
        let contents: Vec<&str> =
            session.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["buenas", "hola"]);
    }

    #[tokio::test]
    async fn test_select_emits_room_join() {
        let backend = StubBackend::new(vec![entry("ana@x")]);
        let (mut session, mut rx) = session_with(backend);

        session.select_peer("ana@x").await;

        match rx.try_recv().unwrap() {
            SocketCommand::JoinRoom {
                user_email1,
                user_email2,
            } => {
                assert_eq!(user_email1, "me@x");
                assert_eq!(user_email2, "ana@x");
            }
            other => panic!("expected a room join, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_history_fetch_still_reaches_ready() {
        let backend = StubBackend::new(vec![entry("ana@x")]).history_for(
            "ana@x",
            Err(ApiError::Rejected {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        let (mut session, _rx) = session_with(backend);

        let phase = session.select_peer("ana@x").await;

        assert_eq!(phase, SessionPhase::Ready);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_send_publishes_trimmed_without_local_append() {
        let backend = StubBackend::new(vec![entry("ana@x")]);
        let (mut session, mut rx) = session_with(backend);
        session.select_peer("ana@x").await;
        let _ = rx.try_recv(); // drop the join

        session.send("  nos vemos  ").await.unwrap();

        match rx.try_recv().unwrap() {
            SocketCommand::Publish {
                sender_email,
                receiver_email,
                content,
            } => {
                assert_eq!(sender_email, "me@x");
                assert_eq!(receiver_email, "ana@x");
                assert_eq!(content, "nos vemos");
            }
            other => panic!("expected a publish, got {other:?}"),
        }
        // The echo has not arrived yet, so the log must not contain it.
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_empty_before_any_network() {
        let backend = StubBackend::new(vec![entry("ana@x")]);
        let (mut session, mut rx) = session_with(backend);
        session.select_peer("ana@x").await;
        let _ = rx.try_recv();

        assert!(matches!(session.send("   ").await, Err(ChatError::EmptyMessage)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_without_peer_fails() {
        let backend = StubBackend::new(Vec::new());
        let (session, _rx) = session_with(backend);
        assert!(matches!(session.send("hola").await, Err(ChatError::NoPeer)));
    }

    #[tokio::test]
    async fn test_incoming_for_other_room_is_discarded() {
        let backend = StubBackend::new(vec![entry("ana@x")]);
        let (mut session, _rx) = session_with(backend);
        session.select_peer("ana@x").await;

        // A stale subscription keeps delivering another room's traffic.
        assert!(!session.on_incoming(message("elena@x", "me@x", "hey", 1)));
        assert!(!session.on_incoming(message("ana@x", "elena@x", "hi", 2)));
        assert!(session.history().is_empty());

        assert!(session.on_incoming(message("ana@x", "me@x", "hola", 3)));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_room_filter_holds_after_peer_switch() {
        let backend = StubBackend::new(vec![entry("ana@x"), entry("luis@x")]);
        let (mut session, _rx) = session_with(backend);
        session.select_peer("ana@x").await;
        session.select_peer("luis@x").await;

        // Ana's room still delivers; it is no longer the active one.
        assert!(!session.on_incoming(message("ana@x", "me@x", "sigues ahí?", 1)));
        assert!(session.on_incoming(message("luis@x", "me@x", "hola", 2)));
        let contents: Vec<&str> =
            session.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hola"]);
    }

    #[tokio::test]
    async fn test_last_select_wins_over_stale_fetch() {
        let backend = StubBackend::new(vec![entry("a@x"), entry("b@x")]);
        let (mut session, _rx) = session_with(backend);

        let gen_a = session.begin_select("a@x");
        let gen_b = session.begin_select("b@x");

        // B's fetch resolves first.
        assert!(session.apply_history(gen_b, Ok(vec![message("b@x", "me@x", "de b", 1)])));
        // A's fetch resolves late and must not regress the view.
        assert!(!session.apply_history(gen_a, Ok(vec![message("a@x", "me@x", "de a", 2)])));

        assert_eq!(session.peer_email(), Some("b@x"));
        let contents: Vec<&str> =
            session.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["de b"]);
    }

    #[tokio::test]
    async fn test_live_message_during_load_is_merged_without_duplicates() {
        let backend = StubBackend::new(vec![entry("ana@x")]);
        let (mut session, _rx) = session_with(backend);

        let generation = session.begin_select("ana@x");
        // Two live messages race in while the fetch is pending; one of
        // them is also part of the fetched history.
        let overlapping = message("ana@x", "me@x", "hola", 1);
        session.on_incoming(overlapping.clone());
        session.on_incoming(message("ana@x", "me@x", "sigues?", 4));

        session.apply_history(
            generation,
            Ok(vec![overlapping, message("me@x", "ana@x", "buenas", 2)]),
        );

        let contents: Vec<&str> =
            session.history().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hola", "buenas", "sigues?"]);
    }

    #[tokio::test]
    async fn test_phase_transitions() {
        let backend = StubBackend::new(vec![entry("ana@x")]);
        let (mut session, _rx) = session_with(backend);
        assert_eq!(session.phase(), SessionPhase::Unselected);

        let generation = session.begin_select("ana@x");
        assert_eq!(session.phase(), SessionPhase::Loading);

        session.apply_history(generation, Ok(Vec::new()));
        assert_eq!(session.phase(), SessionPhase::Ready);

        session.on_incoming(message("ana@x", "me@x", "hola", 1));
        assert_eq!(session.phase(), SessionPhase::Ready);

        session.begin_select("ana@x");
        assert_eq!(session.phase(), SessionPhase::Loading);
    }

    #[tokio::test]
    async fn test_roster_prefers_most_recent_message() {
        let backend = StubBackend::new(vec![entry("a@x"), entry("b@x"), entry("c@x")])
            .history_for("a@x", Ok(vec![message("a@x", "me@x", "x", 10)]))
            .history_for("b@x", Ok(vec![message("b@x", "me@x", "y", 30)]))
            .history_for("c@x", Ok(vec![message("c@x", "me@x", "z", 20)]));

        let roster = load_roster(&backend, "me@x").await.unwrap();

        assert_eq!(roster.default_peer.as_deref(), Some("b@x"));
        assert_eq!(roster.matches.len(), 3);
    }

    #[tokio::test]
    async fn test_roster_falls_back_to_first_match() {
        let backend = StubBackend::new(vec![entry("a@x"), entry("b@x")]);
        let roster = load_roster(&backend, "me@x").await.unwrap();
        assert_eq!(roster.default_peer.as_deref(), Some("a@x"));
    }

    #[tokio::test]
    async fn test_roster_isolates_failing_history_fetch() {
        let backend = StubBackend::new(vec![entry("a@x"), entry("b@x")])
            .history_for(
                "a@x",
                Err(ApiError::Rejected {
                    status: 500,
                    message: "boom".to_string(),
                }),
            )
            .history_for("b@x", Ok(vec![message("b@x", "me@x", "y", 5)]));

        let roster = load_roster(&backend, "me@x").await.unwrap();

        // The failure is logged and skipped; the rest still resolves.
        assert_eq!(roster.default_peer.as_deref(), Some("b@x"));
        assert_eq!(roster.matches.len(), 2);
    }

    #[tokio::test]
    async fn test_roster_empty_without_matches() {
        let backend = StubBackend::new(Vec::new());
        let roster = load_roster(&backend, "me@x").await.unwrap();
        assert!(roster.default_peer.is_none());
        assert!(roster.matches.is_empty());
    }
}
