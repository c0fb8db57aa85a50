//! App settings persistence.
//!
//! Settings are stored as a single JSON blob row, read whole and written
//! whole. A missing row yields [`StoredSettings::default`].

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::StoredSettings;

impl Database {
    /// Load the persisted settings, defaulting when nothing was saved yet.
    pub fn load_settings(&self) -> Result<StoredSettings> {
        let result: std::result::Result<String, _> =
            self.conn()
                .query_row("SELECT json FROM app_settings WHERE id = 1", [], |row| {
                    row.get(0)
                });
        match result {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(StoredSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the settings blob, replacing any previous one.
    pub fn save_settings(&self, settings: &StoredSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO app_settings (id, json) VALUES (1, ?1)",
            params![json],
        )?;
        tracing::info!("Settings updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotter_shared::types::Theme;

    #[test]
    fn test_defaults_when_empty() {
        let db = Database::open_in_memory().unwrap();
        let settings = db.load_settings().unwrap();
        assert_eq!(settings, StoredSettings::default());
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let settings = StoredSettings {
            theme: Theme::Dark,
            server_url: Some("http://localhost:3000".to_string()),
        };
        db.save_settings(&settings).unwrap();
        assert_eq!(db.load_settings().unwrap(), settings);
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO app_settings (id, json) VALUES (1, ?1)",
                params!["not json"],
            )
            .unwrap();
        assert!(db.load_settings().is_err());
    }
}
