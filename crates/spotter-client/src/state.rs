//! Application context.
//!
//! The explicit home of everything the original design kept in ambient
//! browser storage: the session token (with its decoded display claims)
//! and the theme. State is read from the store once at init; every
//! change is persisted and published as an [`AppEvent`] for observers.
//! Claims decoding is pure parsing: an undecodable token simply means
//! signed out, and authorization stays entirely server-side.

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use spotter_shared::claims::Claims;
use spotter_shared::types::Theme;
use spotter_store::{Database, StoreError, StoredSettings};

use crate::events::{AppEvent, EVENT_CHANNEL_CAPACITY};

#[derive(Error, Debug)]
pub enum ContextError {
    /// The token's payload segment did not decode to usable claims.
    #[error("Token is not decodable")]
    InvalidToken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An authenticated session: the opaque token plus its display claims.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    claims: Claims,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

/// Central application context, injected into the coordinators'
/// surroundings instead of being looked up globally.
pub struct AppContext {
    store: Database,
    settings: StoredSettings,
    session: Option<Session>,
    events: broadcast::Sender<AppEvent>,
}

impl AppContext {
    /// Read persisted state and build the context.
    ///
    /// A stored token that no longer decodes is discarded with a
    /// warning; the user is signed out, nothing panics.
    pub fn init(store: Database) -> Result<Self, StoreError> {
        let settings = store.load_settings()?;
        let session = match store.load_token()? {
            Some(token) => match Claims::decode(&token) {
                Some(claims) => {
                    info!(email = %claims.email, "Session restored");
                    Some(Session { token, claims })
                }
                None => {
                    warn!("Stored token is not decodable; treating as signed out");
                    store.clear_token()?;
                    None
                }
            },
            None => None,
        };

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            store,
            settings,
            session,
            events,
        })
    }

    /// Subscribe to state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: AppEvent) {
        // No receivers is fine; events are best-effort notifications.
        let _ = self.events.send(event);
    }

    // -----------------------------------------------------------------
    // Theme
    // -----------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        if self.settings.theme == theme {
            return Ok(());
        }
        self.settings.theme = theme;
        self.store.save_settings(&self.settings)?;
        self.publish(AppEvent::ThemeChanged(theme));
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        let next = self.settings.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Stored backend URL override, when the user set one.
    pub fn server_url_override(&self) -> Option<&str> {
        self.settings.server_url.as_deref()
    }

    pub fn set_server_url_override(
        &mut self,
        server_url: Option<String>,
    ) -> Result<(), StoreError> {
        self.settings.server_url = server_url;
        self.store.save_settings(&self.settings)
    }

    // -----------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.session.as_ref().map(Session::claims)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(Session::token)
    }

    /// Store a freshly issued token and decode its display claims.
    pub fn sign_in(&mut self, token: String) -> Result<Claims, ContextError> {
        let claims = Claims::decode(&token).ok_or(ContextError::InvalidToken)?;
        self.store.save_token(&token)?;
        info!(email = %claims.email, "Signed in");
        self.publish(AppEvent::SignedIn(claims.clone()));
        self.session = Some(Session {
            token,
            claims: claims.clone(),
        });
        Ok(claims)
    }

    /// Clear the session everywhere.
    pub fn sign_out(&mut self) -> Result<(), StoreError> {
        self.session = None;
        self.store.clear_token()?;
        info!("Signed out");
        self.publish(AppEvent::SignedOut);
        Ok(())
    }

    /// Relay a server-detected mutual match to observers.
    pub fn notify_mutual_match(&self, email: &str) {
        self.publish(AppEvent::MutualMatch {
            email: email.to_string(),
        });
    }

    /// Relay live-channel connectivity to observers.
    pub fn notify_live_connection(&self, up: bool) {
        self.publish(AppEvent::LiveConnection { up });
    }
}
