// Network boundary: REST client over HTTPS plus the live WebSocket channel.

pub mod admin;
pub mod api;
pub mod error;
pub mod socket;

pub use api::{ApiClient, LikeOutcome, NewAccount, ProfileUpdate};
pub use error::{ApiError, SocketError};
pub use socket::{spawn_socket, SocketCommand, SocketNotification};
