use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use webserver::http::connection::{Connection, Timeouts};
use webserver::router::RouterBuilder;

fn router() -> Arc<webserver::Router> {
    let mut builder = RouterBuilder::new();
    builder.get("/", |ctx| ctx.res.write("root"));
    Arc::new(builder.build())
}

#[tokio::test]
async fn test_connection_answers_one_request_and_closes() {
    let (mut client, server) = duplex(4096);
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, router(), Timeouts::default());
        conn.run().await
    });

    client
        .write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\nGET / HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();

    task.await.unwrap().unwrap();
    assert_eq!(out.matches("HTTP/1.1 200 OK").count(), 1);
    assert!(out.ends_with("root\r\n"));
}

#[tokio::test]
async fn test_connection_closed_without_request_writes_nothing() {
    let (mut client, server) = duplex(1024);
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, router(), Timeouts::default());
        conn.run().await
    });

    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    task.await.unwrap().unwrap();
    assert!(out.is_empty());
}
