//! # spotter-client
//!
//! Client coordinators for the Spotter fitness-partner matching service:
//! the swipe deck, the chat session, and the application context that
//! replaces ambient browser storage with explicit, observable state.

pub mod backend;
pub mod chat;
pub mod config;
pub mod deck;
pub mod events;
pub mod state;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use spotter_net::api::ApiClient;
use spotter_net::socket::{spawn_socket, SocketCommand, SocketNotification};
use spotter_store::Database;

pub use backend::MatchBackend;
pub use chat::{load_roster, ChatSession, Roster, SessionPhase};
pub use config::ClientConfig;
pub use deck::{DeckCard, SwipeDeck};
pub use events::AppEvent;
pub use state::AppContext;

/// Initialise structured logging once, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("spotter_client=debug,spotter_net=debug,spotter_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// A fully wired client: context, REST boundary, live channel, and both
/// coordinators sharing one backend.
pub struct App {
    pub context: AppContext,
    pub api: Arc<ApiClient>,
    pub deck: SwipeDeck,
    pub chat: ChatSession,
    /// Command handle for the process-wide live connection.
    pub socket: mpsc::Sender<SocketCommand>,
    /// Live-channel notifications; feed `Message` ones into
    /// [`ChatSession::on_incoming`].
    pub notifications: mpsc::Receiver<SocketNotification>,
}

/// Open the store, restore the session, and connect everything.
///
/// Requires a stored session; the sign-in flow only needs an
/// [`ApiClient`] and an [`AppContext`], not a full `App`.
pub async fn bootstrap(config: &ClientConfig) -> anyhow::Result<App> {
    let store = match &config.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Database::open_at(&dir.join("spotter.db"))?
        }
        None => Database::open_default()?,
    };
    let context = AppContext::init(store)?;
    let claims = context
        .claims()
        .cloned()
        .context("no stored session; sign in first")?;

    let server_url = context
        .server_url_override()
        .unwrap_or(&config.server_url)
        .to_string();
    let mut api = ApiClient::new(server_url, config.http_timeout)?;
    api.set_token(context.token().map(str::to_string));
    let api = Arc::new(api);

    let (socket, notifications) = spawn_socket(&config.socket_url).await?;

    let deck = SwipeDeck::new(api.clone(), claims.email.clone());
    let chat = ChatSession::new(api.clone(), socket.clone(), claims.email);

    Ok(App {
        context,
        api,
        deck,
        chat,
        socket,
        notifications,
    })
}
