//! REST status client against a local one-shot HTTP listener.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use upsdash::adapter::outbound::backend::StatusClient;
use upsdash::domain::UpsStatus;
use upsdash::error::Error;
use upsdash::testkit;

/// Serve one request with `status_line` and `body`, returning the raw
/// request text.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

fn client(base_url: &str) -> StatusClient {
    let _ = rustls::crypto::ring::default_provider().install_default();
    StatusClient::from_config(&testkit::config::config(base_url).server).unwrap()
}

#[tokio::test]
async fn fetches_snapshot_with_bearer_token() {
    let body = r#"{"status":"ON_BATTERY","battery_charge":64,"load_percent":22,"shutdown":{"shutting_down":true,"remaining_seconds":120},"battery_voltage":13.1}"#;
    let (base_url, server) = serve_once("200 OK", body).await;

    let snapshot = client(&base_url).fetch_status().await.unwrap();
    let request = server.await.unwrap().to_lowercase();

    assert!(request.starts_with("get /api/status "), "{request}");
    assert!(request.contains("authorization: bearer test-token"), "{request}");
    assert_eq!(snapshot.status, Some(UpsStatus::OnBattery));
    assert_eq!(snapshot.battery_charge, Some(64.0));
    assert!(snapshot.shutdown.shutting_down);
    assert_eq!(snapshot.shutdown.remaining_seconds, Some(120));
    assert_eq!(snapshot.number("battery_voltage"), Some(13.1));
}

#[tokio::test]
async fn non_success_status_is_a_backend_error() {
    let (base_url, server) =
        serve_once("503 Service Unavailable", r#"{"detail":"Monitor not initialized"}"#).await;

    let result = client(&base_url).fetch_status().await;
    server.await.unwrap();

    match result {
        Err(Error::Backend { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("Monitor not initialized"));
        }
        other => panic!("Expected Backend error, got {other:?}"),
    }
}

#[test]
fn missing_token_fails_before_any_request() {
    let mut config = testkit::config::config("http://127.0.0.1:9");
    config.server.api_token = None;
    assert!(StatusClient::from_config(&config.server).is_err());
}
