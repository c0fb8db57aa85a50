//! Session token persistence.
//!
//! The token is an opaque server-issued credential stored verbatim. No
//! expiry management exists; the token lives until sign-out replaces or
//! clears it.

use rusqlite::params;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Persist the session token, replacing any previous one.
    pub fn save_token(&self, token: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO session (id, token) VALUES (1, ?1)",
            params![token],
        )?;
        Ok(())
    }

    /// Load the persisted token. `None` means signed out.
    pub fn load_token(&self) -> Result<Option<String>> {
        let result = self
            .conn()
            .query_row("SELECT token FROM session WHERE id = 1", [], |row| {
                row.get(0)
            });
        match result {
            Ok(token) => Ok(Some(token)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Forget the session token.
    pub fn clear_token(&self) -> Result<()> {
        self.conn().execute("DELETE FROM session WHERE id = 1", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::Database;

    #[test]
    fn test_token_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_token().unwrap().is_none());

        db.save_token("header.payload.signature").unwrap();
        assert_eq!(
            db.load_token().unwrap().as_deref(),
            Some("header.payload.signature")
        );

        db.save_token("replacement").unwrap();
        assert_eq!(db.load_token().unwrap().as_deref(), Some("replacement"));
    }

    #[test]
    fn test_clear_token() {
        let db = Database::open_in_memory().unwrap();
        db.save_token("tok").unwrap();
        db.clear_token().unwrap();
        assert!(db.load_token().unwrap().is_none());

        // Clearing an empty session is a no-op, not an error.
        db.clear_token().unwrap();
    }
}
