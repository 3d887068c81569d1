//! End-to-end tests over real TCP sockets.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use webserver::config::Config;
use webserver::http::connection::Timeouts;
use webserver::WebServer;

async fn start(server: WebServer) -> SocketAddr {
    let bound = server.bind().await.unwrap();
    let addr = bound.local_addr().unwrap();
    tokio::spawn(bound.serve());
    addr
}

async fn roundtrip(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

fn hello_server() -> WebServer {
    let mut server = WebServer::new("127.0.0.1:0");
    server.get("/", |ctx| ctx.res.write("Hello, world!"));
    server
}

#[test]
fn test_addr_keeps_host_and_port() {
    assert_eq!(WebServer::new("localhost:9090").addr(), "localhost:9090");
}

#[test]
fn test_non_numeric_port_defaults_to_80() {
    let server = WebServer::new("localhost:notanumber");
    assert_eq!(server.port(), 80);
    assert_eq!(server.addr(), "localhost:80");
}

#[test]
fn test_from_config_uses_listen_addr() {
    let cfg = Config::from_yaml("server:\n  listen_addr: 127.0.0.1:4321\n").unwrap();
    assert_eq!(WebServer::from_config(&cfg).addr(), "127.0.0.1:4321");
}

#[tokio::test]
async fn test_get_root_returns_hello() {
    let addr = start(hello_server()).await;

    let response = roundtrip(addr, b"GET / HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("\r\nHTTP/1.1 200 OK\r\n"));
    assert!(response.contains("\r\nDate: "));
    let (_, body) = response.split_once("\r\n\r\n").unwrap();
    assert_eq!(body, "Hello, world!\r\n");
}

#[tokio::test]
async fn test_unregistered_method_returns_405() {
    let addr = start(hello_server()).await;

    let response = roundtrip(addr, b"POST / HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("\r\nHTTP/1.1 405 METHOD NOT ALLOWED\r\n"));
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let addr = start(hello_server()).await;

    let response = roundtrip(addr, b"GET /nope HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with("\r\nHTTP/1.1 404 NOT FOUND\r\n"));
    let (_, body) = response.split_once("\r\n\r\n").unwrap();
    assert_eq!(body, "\r\n");
}

#[tokio::test]
async fn test_malformed_request_line_returns_400() {
    let addr = start(hello_server()).await;

    let response = roundtrip(addr, b"NONSENSE\r\n\r\n").await;

    assert!(response.starts_with("\r\nHTTP/1.1 400 BAD REQUEST\r\n"));
}

#[tokio::test]
async fn test_concurrent_connections() {
    let addr = start(hello_server()).await;

    let clients: Vec<_> = (0..16)
        .map(|_| tokio::spawn(roundtrip(addr, b"GET / HTTP/1.1\r\n\r\n")))
        .collect();

    for client in clients {
        let response = client.await.unwrap();
        assert!(response.contains("Hello, world!"));
    }
}

#[tokio::test]
async fn test_stalled_client_is_dropped_after_read_timeout() {
    let server = hello_server().with_timeouts(Timeouts {
        read: Duration::from_millis(100),
        write: Duration::from_secs(5),
    });
    let addr = start(server).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // never send the terminating blank line
    stream.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();

    let mut out = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut out)).await;

    assert!(read.is_ok(), "server kept the connection open");
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let first = hello_server().bind().await.unwrap();
    let taken = first.local_addr().unwrap();

    let result = WebServer::new(&taken.to_string()).bind().await;
    assert!(result.is_err());
}
