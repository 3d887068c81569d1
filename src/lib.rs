//! webserver - a minimal HTTP request/response library
//!
//! Accepts TCP connections, parses one request head per connection,
//! dispatches on exact path and method, writes the response and closes.
//!
//! ```no_run
//! use webserver::WebServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = WebServer::new("127.0.0.1:8080");
//!     server.get("/", |ctx| ctx.res.write("Hello, world!"));
//!     server.listen().await
//! }
//! ```

pub mod config;
pub mod http;
pub mod router;
pub mod server;

pub use http::context::Context;
pub use router::{Flow, Router, RouterBuilder};
pub use server::{BoundServer, WebServer};
