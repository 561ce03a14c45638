//! Scenario tests for the HTTP server resource.

use std::time::Duration;

use axum::extract::Request;
use hostio_core::{ErrorKind, HostioConfig};
use hostio_lifecycle::{ProcessContext, ResourceHandle};
use hostio_net::{json, serve, text, Addr, ServeOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn ctx() -> ProcessContext {
    ProcessContext::new(HostioConfig::default())
}

async fn get(port: u16, path: &str) -> String {
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
        .await
        .unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn port_of(addr: &Addr) -> u16 {
    addr.as_net().expect("tcp address").port
}

#[tokio::test]
async fn serves_requests_on_an_ephemeral_port() {
    let ctx = ctx();
    let server = serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), |req: Request| async move {
        text(format!("you asked for {}", req.uri().path()))
    })
    .await
    .unwrap();

    let port = port_of(server.addr());
    assert_ne!(port, 0);
    let response = get(port, "/hello").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("content-type: text/plain"), "{response}");
    assert!(response.ends_with("you asked for /hello"), "{response}");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn json_helper_sets_content_type() {
    let ctx = ctx();
    let server = serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async {
        json(&serde_json::json!({ "ok": true }))
    })
    .await
    .unwrap();

    let response = get(port_of(server.addr()), "/").await;
    assert!(response.contains("content-type: application/json"), "{response}");
    assert!(response.ends_with(r#"{"ok":true}"#), "{response}");
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn unref_then_shutdown_settles_and_leaves_registry_idle() {
    let ctx = ctx();
    let server = serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async { text("x") })
        .await
        .unwrap();
    assert_eq!(ctx.keep_alive().active_count(), 1);

    server.unref();
    assert!(ctx.keep_alive().is_idle());

    server.shutdown().await.unwrap();
    assert_eq!(server.finished().peek(), Some(Ok(())));
    assert!(server.is_closed());
    assert!(ctx.keep_alive().is_idle());

    server.shutdown().await.unwrap();
    server.close().unwrap();
}

#[tokio::test]
async fn shutdown_settles_the_finished_future_for_every_subscriber() {
    let ctx = ctx();
    let server = serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async { text("x") })
        .await
        .unwrap();
    let early = server.finished();
    let waiter = tokio::spawn(async move { early.wait().await });

    server.shutdown().await.unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, Ok(()));
    assert_eq!(server.finished().wait().await, Ok(()));
}

#[tokio::test]
async fn wait_until_idle_resolves_after_shutdown() {
    let ctx = ctx();
    let server = serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async { text("x") })
        .await
        .unwrap();
    let idle = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.wait_until_idle().await })
    };
    server.shutdown().await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), idle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn binding_a_taken_port_fails() {
    let ctx = ctx();
    let first = serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async { text("x") })
        .await
        .unwrap();
    let port = port_of(first.addr());
    let err = serve(&ctx, ServeOptions::tcp("127.0.0.1", port), || async { text("y") })
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn vsock_is_rejected_as_invalid() {
    let ctx = ctx();
    let err = serve(&ctx, ServeOptions::Vsock { cid: 3, port: 80 }, || async { text("x") })
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(ctx.keep_alive().is_idle());
}

#[cfg(unix)]
#[tokio::test]
async fn serves_over_a_unix_socket() {
    let ws = test_fixtures::TempWorkspace::new();
    let path = ws.join("http.sock");
    let ctx = ctx();
    let server = serve(&ctx, ServeOptions::unix(&path), || async { text("over unix") })
        .await
        .unwrap();
    assert_eq!(server.addr().transport(), "unix");

    let mut stream = tokio::net::UnixStream::connect(&path).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.ends_with("over unix"), "{response}");

    server.shutdown().await.unwrap();
}

#[test]
fn addresses_serialize_with_a_kind_tag() {
    let addr = Addr::Net(hostio_net::NetAddr {
        transport: hostio_net::NetTransport::Tcp,
        hostname: "::1".into(),
        port: 8080,
    });
    let value = serde_json::to_value(&addr).unwrap();
    assert_eq!(value["kind"], "net");
    assert_eq!(value["transport"], "tcp");
    assert_eq!(addr.to_string(), "tcp://[::1]:8080");
}
