//! WebSocket transport tests against a local server.
//!
//! These run on the real clock: each test binds a listener on 127.0.0.1 and
//! scripts the server side with `tokio_tungstenite::accept_async`.

mod support;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use url::Url;

use support::realtime::wait_until;
use upsdash::adapter::outbound::backend::{socket_factory, WebSocketTransport};
use upsdash::config::RealtimeConfig;
use upsdash::port::{TransportEvent, TransportSocket};
use upsdash::realtime::ConnectionManager;
use upsdash::testkit::domain::{countdown_frame, status_update_frame};

const LIMIT: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = Url::parse(&format!("ws://127.0.0.1:{port}/api/ws?token=test-token")).unwrap();
    (listener, url)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_event(transport: &mut WebSocketTransport) -> Option<TransportEvent> {
    timeout(LIMIT, transport.next_event())
        .await
        .expect("transport produced no event")
}

#[tokio::test]
async fn text_frames_and_close_reason_are_reported() {
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::Text("hello".into())).await.unwrap();
        ws.send(Message::Close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "maintenance".into(),
        })))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut transport = WebSocketTransport::new(url);
    transport.connect().await.unwrap();

    assert_eq!(
        next_event(&mut transport).await,
        Some(TransportEvent::Frame("hello".into()))
    );
    assert_eq!(
        next_event(&mut transport).await,
        Some(TransportEvent::Closed {
            reason: "maintenance".into()
        })
    );
    assert_eq!(next_event(&mut transport).await, None);

    timeout(LIMIT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn server_ping_is_answered_with_pong() {
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::Ping(vec![1])).await.unwrap();
        ws.send(Message::Text("after ping".into())).await.unwrap();
        let reply = ws.next().await.unwrap().unwrap();
        ws.close(None).await.ok();
        reply
    });

    let mut transport = WebSocketTransport::new(url);
    transport.connect().await.unwrap();

    // The ping never surfaces as an event.
    assert_eq!(
        next_event(&mut transport).await,
        Some(TransportEvent::Frame("after ping".into()))
    );

    let reply = timeout(LIMIT, server).await.unwrap().unwrap();
    assert_eq!(reply, Message::Pong(vec![1]));
}

#[tokio::test]
async fn sent_text_reaches_the_server() {
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.next().await.unwrap().unwrap()
    });

    let mut transport = WebSocketTransport::new(url);
    transport.connect().await.unwrap();
    transport.send_text("ping".into()).await.unwrap();

    let received = timeout(LIMIT, server).await.unwrap().unwrap();
    assert_eq!(received, Message::Text("ping".into()));
    transport.close().await;
}

#[tokio::test]
async fn dropped_connection_reports_error_then_closed() {
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        let ws = accept(&listener).await;
        drop(ws);
    });

    let mut transport = WebSocketTransport::new(url);
    transport.connect().await.unwrap();
    timeout(LIMIT, server).await.unwrap().unwrap();

    assert!(matches!(
        next_event(&mut transport).await,
        Some(TransportEvent::Error(_))
    ));
    assert!(matches!(
        next_event(&mut transport).await,
        Some(TransportEvent::Closed { .. })
    ));
    assert_eq!(next_event(&mut transport).await, None);
}

#[tokio::test]
async fn manager_syncs_state_and_reconnects_over_a_real_socket() {
    let (listener, url) = bind().await;
    let config = RealtimeConfig {
        reconnect_interval_ms: 100,
        heartbeat_interval_ms: 200,
        ..RealtimeConfig::default()
    };

    let server = tokio::spawn(async move {
        // First session: snapshot, protocol ping, countdown, then wait for
        // the heartbeat probe and hang up.
        let mut ws = accept(&listener).await;
        ws.send(Message::Text(status_update_frame(80.0))).await.unwrap();
        ws.send(Message::Ping(vec![1])).await.unwrap();
        ws.send(Message::Text(countdown_frame(30, false))).await.unwrap();

        let mut received = Vec::new();
        while let Some(Ok(message)) = ws.next().await {
            let is_probe = message == Message::Text("ping".into());
            received.push(message);
            if is_probe {
                break;
            }
        }
        ws.close(None).await.ok();
        drop(ws);

        // Second session after the client's retry.
        let mut ws = accept(&listener).await;
        ws.send(Message::Text(status_update_frame(55.0))).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
        received
    });

    let manager = ConnectionManager::new(&config, socket_factory(url)).unwrap();
    let consumer = manager.consumer();

    wait_until(LIMIT, || {
        manager
            .snapshot()
            .is_some_and(|s| s.shutdown.shutting_down)
    })
    .await;
    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.battery_charge, Some(80.0));
    assert_eq!(snapshot.shutdown.remaining_seconds, Some(30));
    assert_eq!(snapshot.shutdown.in_final_countdown, Some(false));

    wait_until(LIMIT, || {
        manager
            .snapshot()
            .is_some_and(|s| s.battery_charge == Some(55.0))
    })
    .await;
    assert!(manager.is_connected());

    drop(consumer);
    let received = timeout(LIMIT, server).await.unwrap().unwrap();
    assert!(received.contains(&Message::Pong(vec![1])), "{received:?}");
    assert_eq!(received.last(), Some(&Message::Text("ping".into())));
}
