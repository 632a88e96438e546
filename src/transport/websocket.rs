//! WebSocket transport
//!
//! This file binds the broker to a WebSocket listener. Responsibilities:
//! - Accept TCP/WebSocket connections
//! - Give each connection a `ClientId` and register its outbound channel
//!   with the `ChannelTransport`
//! - Feed every inbound text or binary message to the broker as one frame
//! - Report the end of the connection to the broker
//!
//! Each STOMP frame travels as exactly one WebSocket message.

use std::io;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use super::channel::ChannelTransport;
use crate::broker::SharedBroker;
use crate::broker::engine::lock;
use crate::client::Client;

/// Bind `addr` and serve connections until the listener fails.
pub async fn start_websocket_server(
    addr: String,
    broker: SharedBroker<ChannelTransport>,
    transport: Arc<ChannelTransport>,
) -> io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("WebSocket server listening on ws://{addr}");
    serve(listener, broker, transport).await
}

/// Accept loop over an already bound listener.
pub async fn serve(
    listener: TcpListener,
    broker: SharedBroker<ChannelTransport>,
    transport: Arc<ChannelTransport>,
) -> io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "accepted tcp connection");
        spawn(handle_connection(stream, broker.clone(), transport.clone()));
    }
}

async fn handle_connection(
    stream: TcpStream,
    broker: SharedBroker<ChannelTransport>,
    transport: Arc<ChannelTransport>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake error: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx);
    let client_id = client.id;

    // the channel must exist before the broker sends CONNECTED
    transport.register(client);
    lock(&broker).on_connection(client_id);

    spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = msg.is_close();
            if let Err(e) = ws_sender.send(msg).await {
                warn!("Failed to send message to {client_id}: {e}");
                break;
            }
            if closing {
                break;
            }
        }
        debug!("Send loop closed for {client_id}");
    });

    while let Some(next) = ws_receiver.next().await {
        let msg = match next {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Read error from {client_id}: {e}");
                break;
            }
        };

        match msg {
            WsMessage::Text(text) => {
                lock(&broker).on_message(client_id, text.as_bytes());
            }
            WsMessage::Binary(data) => {
                lock(&broker).on_message(client_id, &data);
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    lock(&broker).on_close(client_id);
    transport.unregister(client_id);
    info!("{client_id} disconnected");
}
