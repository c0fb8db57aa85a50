//! Application events.
//!
//! State changes are published on a broadcast channel so observers (UI
//! shells, loggers) react to them without polling ambient state.

use spotter_shared::claims::Claims;
use spotter_shared::types::Theme;

/// Capacity of the broadcast channel; slow observers lose the oldest
/// events rather than blocking publishers.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The persisted theme changed.
    ThemeChanged(Theme),

    /// A session token was stored and its display claims decoded.
    SignedIn(Claims),

    /// The session was cleared.
    SignedOut,

    /// The server reported that an accept completed a mutual match.
    MutualMatch { email: String },

    /// The live channel went up or down.
    LiveConnection { up: bool },
}
