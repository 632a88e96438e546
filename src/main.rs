//! CLI for stompsub
//!
//! Subcommands:
//! - `server`: run the WebSocket server
//! - `client`: run a simple example client (useful for smoke tests)

use clap::Parser;
use std::sync::Arc;
use stompsub::broker::{Broker, engine::lock};
use stompsub::config::{Settings, load_config};
use stompsub::frame::{Frame, decode};
use stompsub::transport::{ChannelTransport, start_websocket_server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "stompsub")]
enum Command {
    /// Start the WebSocket server
    Server,
    /// Run the example client (connects, subscribes, sends, prints what comes back)
    Client {
        /// WebSocket server URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:61613")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cmd = Command::parse();

    match cmd {
        Command::Server => {
            let config = match load_config() {
                Ok(config) => config,
                Err(e) => {
                    stompsub::utils::logging::init("info");
                    error!("Failed to load configuration: {}", e);
                    return;
                }
            };
            stompsub::utils::logging::init(&config.logging.level);
            if let Err(e) = run_server(config).await {
                error!("Server failed: {}", e);
            }
        }
        Command::Client { url } => {
            stompsub::utils::logging::init("info");
            if let Err(e) = run_client(&url).await {
                error!("Client failed: {}", e);
            }
        }
    }
}

async fn run_server(config: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let transport = Arc::new(ChannelTransport::new());
    let broker = Broker::with_settings(transport.clone(), config.broker).into_shared();

    tokio::select! {
        res = start_websocket_server(addr, broker.clone(), transport) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    lock(&broker).shutdown();
    Ok(())
}

async fn run_client(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let (mut ws_stream, _response) = connect_async(url).await?;

    // 1. CONNECTED arrives as soon as the socket is up
    if let Some(Ok(WsMessage::Text(msg))) = ws_stream.next().await {
        let connected = decode(msg.as_str())?;
        println!(
            "Connected, session {}",
            connected.header("session-id").unwrap_or("?")
        );
    }

    // 2. Subscribe, waiting for the receipt
    let subscribe = Frame::new("SUBSCRIBE")
        .with_header("destination", "/topic/demo")
        .with_header("id", "0")
        .with_header("receipt", "sub-0");
    ws_stream.send(WsMessage::text(subscribe.encode())).await?;
    if let Some(Ok(WsMessage::Text(msg))) = ws_stream.next().await {
        println!("Subscribe response: {}", decode(msg.as_str())?.command);
    }

    // 3. Send to our own destination
    let send = Frame::new("SEND")
        .with_header("destination", "/topic/demo")
        .with_body("Hello from example");
    ws_stream.send(WsMessage::text(send.encode())).await?;

    // Read the echoed message
    if let Some(Ok(WsMessage::Text(incoming))) = ws_stream.next().await {
        let frame = decode(incoming.as_str())?;
        println!("Incoming {}: {}", frame.command, frame.body);
    }

    ws_stream
        .send(WsMessage::text(Frame::new("DISCONNECT").encode()))
        .await?;

    Ok(())
}
