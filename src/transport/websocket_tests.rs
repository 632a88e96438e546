use crate::broker::{Broker, SharedBroker};
use crate::broker::engine::lock;
use crate::frame::{Frame, decode};
use crate::transport::ChannelTransport;
use crate::transport::websocket::serve;
use futures_util::{SinkExt, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};

async fn setup_server() -> (String, SharedBroker<ChannelTransport>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    let transport = Arc::new(ChannelTransport::new());
    let broker = Broker::new(transport.clone()).into_shared();

    tokio::spawn(serve(listener, broker.clone(), transport));

    (format!("ws://{addr}"), broker)
}

async fn recv<S>(ws: &mut S) -> WsMessage
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for the server")
        .expect("stream ended")
        .expect("websocket error")
}

async fn recv_frame<S>(ws: &mut S) -> Frame
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    match recv(ws).await {
        WsMessage::Text(text) => decode(text.as_str()).expect("malformed frame from server"),
        other => panic!("Expected a text message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pubsub_end_to_end() {
    let (url, broker) = setup_server().await;

    let (mut ws_a, _) = connect_async(url.as_str()).await.expect("client A connect");
    let (mut ws_b, _) = connect_async(url.as_str()).await.expect("client B connect");

    let connected = recv_frame(&mut ws_a).await;
    assert_eq!(connected.command, "CONNECTED");
    assert!(connected.header("session-id").is_some());
    assert_eq!(recv_frame(&mut ws_b).await.command, "CONNECTED");

    let subscribe = Frame::new("SUBSCRIBE")
        .with_header("destination", "/topic/news")
        .with_header("id", "1")
        .with_header("receipt", "r1");
    ws_a.send(WsMessage::text(subscribe.encode())).await.unwrap();
    let receipt = recv_frame(&mut ws_a).await;
    assert_eq!(receipt.command, "RECEIPT");
    assert_eq!(receipt.header("receipt-id"), Some("r1"));

    let send = Frame::new("SEND")
        .with_header("destination", "/topic/news")
        .with_body("hello");
    ws_b.send(WsMessage::text(send.encode())).await.unwrap();

    let message = recv_frame(&mut ws_a).await;
    assert_eq!(message.command, "MESSAGE");
    assert_eq!(message.header("destination"), Some("/topic/news"));
    assert_eq!(message.header("subscription"), Some("1"));
    assert_eq!(message.body, "hello");

    // a binary frame is handled like text
    ws_b.send(WsMessage::binary(send.encode().into_bytes()))
        .await
        .unwrap();
    assert_eq!(recv_frame(&mut ws_a).await.body, "hello");

    ws_a.send(WsMessage::text(Frame::new("DISCONNECT").encode()))
        .await
        .unwrap();
    assert!(matches!(recv(&mut ws_a).await, WsMessage::Close(_)));

    let mut cleaned = false;
    for _ in 0..50 {
        if !lock(&broker).subscriptions().contains("/topic/news") {
            cleaned = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(cleaned, "subscription index still references the disconnected client");
}

#[tokio::test]
async fn test_errors_keep_socket_open() {
    let (url, broker) = setup_server().await;
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
    assert_eq!(recv_frame(&mut ws).await.command, "CONNECTED");

    ws.send(WsMessage::text("garbage".to_string())).await.unwrap();
    let error = recv_frame(&mut ws).await;
    assert_eq!(error.command, "ERROR");
    assert_eq!(
        error.header("message"),
        Some("Error processing message: Invalid STOMP frame: missing command")
    );

    ws.send(WsMessage::text(Frame::new("ACK").with_header("id", "1").encode()))
        .await
        .unwrap();
    assert_eq!(
        recv_frame(&mut ws).await.header("message"),
        Some("Unsupported command: ACK")
    );

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = seen.clone();
    lock(&broker).subscribe("/queue/work", move |frame| {
        log.lock().unwrap().push(frame.body.clone())
    });
    let subscribe = Frame::new("SUBSCRIBE")
        .with_header("destination", "/queue/work")
        .with_header("id", "w")
        .with_header("receipt", "ok");
    ws.send(WsMessage::text(subscribe.encode())).await.unwrap();
    assert_eq!(recv_frame(&mut ws).await.command, "RECEIPT");

    let report = lock(&broker).publish("/queue/work", "job-1", Default::default());
    assert_eq!(report.delivered, 1);
    assert_eq!(recv_frame(&mut ws).await.body, "job-1");
    assert_eq!(*seen.lock().unwrap(), vec!["job-1".to_string()]);
}
