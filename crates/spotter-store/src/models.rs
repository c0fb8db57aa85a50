//! Structs persisted in the local database.

use serde::{Deserialize, Serialize};

use spotter_shared::types::Theme;

/// The app settings blob, stored as a single JSON row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    pub theme: Theme,
    /// Overrides the configured backend URL when set.
    pub server_url: Option<String>,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            server_url: None,
        }
    }
}
