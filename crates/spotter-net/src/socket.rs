//! Live channel with tokio mpsc command/notification pattern.
//!
//! One persistent WebSocket connection per process, created once and
//! shared for the application's lifetime. The connection task runs in a
//! dedicated tokio task; external code talks to it through typed command
//! and notification channels. Room joins are additive at the transport
//! layer (there is no leave event), so callers must filter incoming
//! messages by room themselves. Delivery is assumed at-most-once; a
//! dropped connection is reported but not auto-healed.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use spotter_shared::message::Message;
use spotter_shared::protocol::{ClientEvent, ServerEvent};

use crate::error::SocketError;

/// Commands sent *into* the connection task.
#[derive(Debug)]
pub enum SocketCommand {
    /// Subscribe to the room for the given email pair.
    JoinRoom {
        user_email1: String,
        user_email2: String,
    },
    /// Publish a chat message; the server stamps and broadcasts it back.
    Publish {
        sender_email: String,
        receiver_email: String,
        content: String,
    },
    /// Gracefully close the connection.
    Shutdown,
}

/// Notifications sent *from* the connection task to the application.
#[derive(Debug, Clone)]
pub enum SocketNotification {
    /// The connection is up and commands will be delivered.
    Connected,
    /// The connection is gone; subsequent publishes are lost.
    Disconnected,
    /// A `privateMessage` broadcast, sender's own messages included.
    Message(Message),
}

fn command_to_event(cmd: &SocketCommand) -> Option<ClientEvent> {
    match cmd {
        SocketCommand::JoinRoom {
            user_email1,
            user_email2,
        } => Some(ClientEvent::JoinRoom {
            user_email1: user_email1.clone(),
            user_email2: user_email2.clone(),
        }),
        SocketCommand::Publish {
            sender_email,
            receiver_email,
            content,
        } => Some(ClientEvent::PrivateMessage {
            sender_email: sender_email.clone(),
            receiver_email: receiver_email.clone(),
            content: content.clone(),
        }),
        SocketCommand::Shutdown => None,
    }
}

/// Connect to the live channel and spawn its event loop.
///
/// Returns channels for sending commands and receiving notifications.
/// Dropping every command sender shuts the task down, same as an explicit
/// [`SocketCommand::Shutdown`].
pub async fn spawn_socket(
    url: &str,
) -> Result<(mpsc::Sender<SocketCommand>, mpsc::Receiver<SocketNotification>), SocketError> {
    let (ws, _) = connect_async(url).await?;
    info!(url, "Live channel connected");

    let (mut sink, mut stream) = ws.split();
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<SocketCommand>(256);
    let (notif_tx, notif_rx) = mpsc::channel::<SocketNotification>(256);

    tokio::spawn(async move {
        let _ = notif_tx.send(SocketNotification::Connected).await;

        loop {
            tokio::select! {
                // --- Outgoing commands ---
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("Command channel closed, shutting down live channel");
                        let _ = sink.close().await;
                        break;
                    };
                    if matches!(cmd, SocketCommand::Shutdown) {
                        info!("Live channel shutdown requested");
                        let _ = sink.close().await;
                        break;
                    }
                    let Some(event) = command_to_event(&cmd) else { continue };
                    let json = match event.to_json() {
                        Ok(json) => json,
                        Err(e) => {
                            error!(error = %e, "Failed to serialize outgoing event");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(WsMessage::Text(json.into())).await {
                        error!(error = %e, "Publish failed; connection is gone");
                        let _ = notif_tx.send(SocketNotification::Disconnected).await;
                        break;
                    }
                }

                // --- Incoming frames ---
                frame = stream.next() => {
                    match frame {
                        Some(Ok(WsMessage::Text(text))) => {
                            match ServerEvent::from_json(text.as_str()) {
                                Ok(ServerEvent::PrivateMessage(message)) => {
                                    debug!(
                                        sender = %message.sender_email,
                                        receiver = %message.receiver_email,
                                        "Live message received"
                                    );
                                    let _ = notif_tx
                                        .send(SocketNotification::Message(message))
                                        .await;
                                }
                                Err(e) => {
                                    debug!(error = %e, "Ignoring unrecognised event");
                                }
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            info!("Live channel closed by server");
                            let _ = notif_tx.send(SocketNotification::Disconnected).await;
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ping/pong/binary frames carry no events.
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Live channel read error");
                            let _ = notif_tx.send(SocketNotification::Disconnected).await;
                            break;
                        }
                    }
                }
            }
        }

        info!("Live channel event loop terminated");
    });

    Ok((cmd_tx, notif_rx))
}
