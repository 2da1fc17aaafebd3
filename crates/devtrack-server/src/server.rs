//! WebSocket stream server.
//!
//! Each connection is registered with the [`BroadcastHub`] before anything is
//! sent, then greeted with a `hello` event, then fed every event published
//! while it stays connected. Accepting connections never starts the poller.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use devtrack_protocol::{encode_stream_event, StreamEvent};

use crate::error::ServerError;
use crate::hub::BroadcastHub;

/// The WebSocket event stream.
pub struct StreamServer {
    bind_addr: SocketAddr,
    hub: Arc<BroadcastHub>,
}

impl StreamServer {
    pub fn new(bind_addr: SocketAddr, hub: Arc<BroadcastHub>) -> Self {
        Self { bind_addr, hub }
    }

    /// Bind and serve until the task is dropped.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        info!("Stream server listening on {}", listener.local_addr()?);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let hub = self.hub.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, hub).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    hub: Arc<BroadcastHub>,
) -> Result<(), ServerError> {
    info!("New connection from {}", addr);

    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    // Register first so nothing published after the greeting is missed
    let mut subscription = hub.subscribe().await;
    let id = subscription.id();

    let result = async {
        let hello = encode_stream_event(&StreamEvent::hello())?;
        ws_tx.send(Message::Text(hello)).await?;
        debug!("Sent hello to {}", addr);

        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) => {
                            info!("Client {} closed connection", addr);
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            ws_tx.send(Message::Pong(data)).await?;
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error from {}: {}", addr, e);
                            break;
                        }
                        None => {
                            info!("Client {} disconnected", addr);
                            break;
                        }
                        // The stream is one-way; client text is ignored
                        _ => {}
                    }
                }

                event = subscription.recv() => {
                    let Some(event) = event else {
                        debug!("Subscriber {} dropped by hub", id);
                        break;
                    };
                    let msg = encode_stream_event(&event)?;
                    if let Err(e) = ws_tx.send(Message::Text(msg)).await {
                        warn!("Failed to send {} event to {}: {}", event.kind(), addr, e);
                        break;
                    }
                }
            }
        }

        Ok::<(), ServerError>(())
    }
    .await;

    hub.unsubscribe(id).await;
    result
}
