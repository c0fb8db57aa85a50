//! # spotter-store
//!
//! Local persisted client state, backed by SQLite.
//!
//! This is the Rust counterpart of the browser's local storage: the
//! opaque session token and the app settings blob (theme, server URL
//! override). The crate exposes a synchronous [`Database`] handle that
//! wraps a `rusqlite::Connection` and provides typed helpers for each
//! stored item. Absence of a stored value always yields a default,
//! never an error.

pub mod database;
pub mod models;
pub mod sessions;
pub mod settings;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::StoredSettings;
