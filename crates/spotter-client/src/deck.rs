//! Swipe deck coordinator.
//!
//! Owns the ordered candidate list, the cursor, and the accept/reject
//! bookkeeping. Exactly one candidate is current at a time; the cursor
//! only moves forward except on an explicit reload. Mutual-match
//! detection is entirely server-side; this coordinator just relays the
//! like call's verdict.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use spotter_net::api::LikeOutcome;
use spotter_net::error::ApiError;
use spotter_shared::types::{Candidate, DeckFilter};

use crate::backend::MatchBackend;

/// Drag distance, in units of the reference card width, past which a
/// release commits a decision. Fixed units, not viewport-proportional.
pub const SWIPE_THRESHOLD: f32 = 100.0;

/// What a released drag gesture resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDecision {
    Accept,
    Reject,
}

/// Map a horizontal release offset to a decision. Inside the dead zone
/// the gesture is cancelled and the candidate stays current.
pub fn gesture_decision(offset_x: f32) -> Option<SwipeDecision> {
    if offset_x > SWIPE_THRESHOLD {
        Some(SwipeDecision::Accept)
    } else if offset_x < -SWIPE_THRESHOLD {
        Some(SwipeDecision::Reject)
    } else {
        None
    }
}

/// What the deck currently shows.
#[derive(Debug, PartialEq)]
pub enum DeckCard<'a> {
    Candidate(&'a Candidate),
    /// Every candidate has been decided. A display state, not a dead
    /// end: a reload reopens the deck.
    Exhausted,
}

#[derive(Error, Debug)]
pub enum DeckError {
    /// `accept`/`reject` called with no candidate left.
    #[error("Deck is exhausted")]
    Exhausted,

    /// Inverted age range; rejected before any network call.
    #[error("Invalid filter: minimum age exceeds maximum")]
    InvalidFilter,

    /// The like call or the deck fetch failed. Deck state is unchanged
    /// and the operation may be retried.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Client-side swipe deck state.
pub struct SwipeDeck {
    backend: Arc<dyn MatchBackend>,
    self_email: String,
    filter: DeckFilter,
    candidates: Vec<Candidate>,
    cursor: usize,
    accepted: HashSet<String>,
    rejected: HashSet<String>,
    load_generation: u64,
}

impl SwipeDeck {
    /// An empty, exhausted deck. Call [`SwipeDeck::load_deck`] to fill it.
    pub fn new(backend: Arc<dyn MatchBackend>, self_email: impl Into<String>) -> Self {
        Self {
            backend,
            self_email: self_email.into(),
            filter: DeckFilter::default(),
            candidates: Vec::new(),
            cursor: 0,
            accepted: HashSet::new(),
            rejected: HashSet::new(),
            load_generation: 0,
        }
    }

    // -----------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------

    /// Start a load, invalidating any fetch still in flight. Returns the
    /// generation ticket the eventual [`SwipeDeck::apply_load`] must
    /// present. The visible deck is left untouched until new candidates
    /// arrive.
    pub fn begin_load(&mut self, filter: DeckFilter) -> u64 {
        self.filter = filter;
        self.load_generation += 1;
        self.load_generation
    }

    /// Install fetched candidates for the given generation. A stale
    /// ticket (superseded by a newer `begin_load`) is discarded so a
    /// slow fetch can never overwrite a newer deck.
    ///
    /// The server already filtered, but the predicates are re-applied
    /// here as a defensive re-check.
    pub fn apply_load(&mut self, generation: u64, fetched: Vec<Candidate>) -> bool {
        if generation != self.load_generation {
            debug!(generation, current = self.load_generation, "Discarding stale deck fetch");
            return false;
        }
        let total = fetched.len();
        self.candidates = fetched
            .into_iter()
            .filter(|c| self.filter.admits(c))
            .collect();
        self.cursor = 0;
        self.accepted.clear();
        self.rejected.clear();
        if self.candidates.len() < total {
            warn!(
                dropped = total - self.candidates.len(),
                "Server sent candidates outside the active filter"
            );
        }
        info!(count = self.candidates.len(), "Deck loaded");
        true
    }

    /// Fetch a fresh deck for `filter`, replacing all state.
    pub async fn load_deck(&mut self, filter: DeckFilter) -> Result<(), DeckError> {
        if !filter.is_valid() {
            return Err(DeckError::InvalidFilter);
        }
        let generation = self.begin_load(filter);
        let fetched = self.backend.recommendations(&self.self_email).await?;
        self.apply_load(generation, fetched);
        Ok(())
    }

    /// Re-fetch with the last-used filter, clearing all bookkeeping.
    /// Always a fresh fetch, since the server's recommendation set may
    /// have changed (already-matched candidates drop out).
    pub async fn reset_deck(&mut self) -> Result<(), DeckError> {
        let filter = self.filter.clone();
        self.load_deck(filter).await
    }

    // -----------------------------------------------------------------
    // Swiping
    // -----------------------------------------------------------------

    /// The candidate under the cursor, or `Exhausted` past the end.
    pub fn current(&self) -> DeckCard<'_> {
        match self.candidates.get(self.cursor) {
            Some(candidate) => DeckCard::Candidate(candidate),
            None => DeckCard::Exhausted,
        }
    }

    /// Accept the current candidate: issue the like call, then record
    /// the decision and advance. On failure nothing changes and the
    /// candidate stays current so the user can retry.
    pub async fn accept(&mut self) -> Result<LikeOutcome, DeckError> {
        let candidate_email = match self.current() {
            DeckCard::Candidate(c) => c.email.clone(),
            DeckCard::Exhausted => return Err(DeckError::Exhausted),
        };

        let outcome = self
            .backend
            .like(&self.self_email, &candidate_email)
            .await?;

        self.accepted.insert(candidate_email.clone());
        self.cursor += 1;
        info!(candidate = %candidate_email, ?outcome, cursor = self.cursor, "Candidate accepted");
        Ok(outcome)
    }

    /// Reject the current candidate. Purely local: no network call, and
    /// it cannot fail except on an exhausted deck.
    pub fn reject(&mut self) -> Result<(), DeckError> {
        let candidate_email = match self.current() {
            DeckCard::Candidate(c) => c.email.clone(),
            DeckCard::Exhausted => return Err(DeckError::Exhausted),
        };
        self.rejected.insert(candidate_email.clone());
        self.cursor += 1;
        debug!(candidate = %candidate_email, cursor = self.cursor, "Candidate rejected");
        Ok(())
    }

    /// Apply a released drag gesture. A cancelled gesture (inside the
    /// dead zone) is a no-op reported as `Ok(None)`.
    pub async fn swipe(&mut self, offset_x: f32) -> Result<Option<LikeOutcome>, DeckError> {
        match gesture_decision(offset_x) {
            Some(SwipeDecision::Accept) => self.accept().await.map(Some),
            Some(SwipeDecision::Reject) => self.reject().map(|()| None),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn filter(&self) -> &DeckFilter {
        &self.filter
    }

    pub fn accepted(&self) -> &HashSet<String> {
        &self.accepted
    }

    pub fn rejected(&self) -> &HashSet<String> {
        &self.rejected
    }
}
