//! # spotter-shared
//!
//! Domain types and wire formats shared by every Spotter client crate:
//! candidate/match/user profile shapes, chat messages with the versioned
//! wire timestamp, the live-channel event envelope, room keys, and
//! token-claims parsing.
//!
//! This crate performs no I/O. Everything here is plain data plus the
//! conversions needed at the wire boundary.

pub mod claims;
pub mod message;
pub mod protocol;
pub mod types;

pub use claims::Claims;
pub use message::Message;
pub use protocol::{ClientEvent, ServerEvent};
pub use types::{Candidate, DeckFilter, GenderFilter, MatchEntry, RoomKey, Theme, UserRecord};
