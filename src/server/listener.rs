use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::http::connection::{Connection, Timeouts};
use crate::http::context::Context;
use crate::http::request::Method;
use crate::router::{Flow, Router, RouterBuilder};

const DEFAULT_PORT: u16 = 80;
const ACCEPT_BACKOFF_START: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// A web server that is still being configured.
///
/// Routes can only be added here; [`WebServer::bind`] consumes the
/// server and freezes the route table before any connection is accepted.
pub struct WebServer {
    host: String,
    port: u16,
    routes: RouterBuilder,
    timeouts: Timeouts,
}

/// A server whose socket is bound and ready to accept.
pub struct BoundServer {
    listener: TcpListener,
    router: Arc<Router>,
    timeouts: Timeouts,
}

impl WebServer {
    /// Creates a server for `<host>:<port>`.
    ///
    /// A port that is missing or not a number falls back to 80.
    pub fn new(addr: &str) -> Self {
        let (host, port) = match addr.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().unwrap_or(DEFAULT_PORT)),
            None => (addr, DEFAULT_PORT),
        };

        Self {
            host: host.to_string(),
            port,
            routes: RouterBuilder::new(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.server.listen_addr).with_timeouts(Timeouts::from(&cfg.server))
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Returns the address as `<host>:<port>`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn bind_addr(&self) -> String {
        if self.host.is_empty() {
            format!("0.0.0.0:{}", self.port)
        } else {
            self.addr()
        }
    }

    pub fn get<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> R + Send + Sync + 'static,
        R: Into<Flow>,
    {
        self.routes.get(path, handler);
        self
    }

    pub fn post<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> R + Send + Sync + 'static,
        R: Into<Flow>,
    {
        self.routes.post(path, handler);
        self
    }

    pub fn add_handler<F, R>(&mut self, path: &str, method: Method, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> R + Send + Sync + 'static,
        R: Into<Flow>,
    {
        self.routes.add_handler(path, method, handler);
        self
    }

    /// Binds the listening socket. A failure here is fatal for the caller.
    pub async fn bind(self) -> anyhow::Result<BoundServer> {
        let bind_addr = self.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to initialize server at {}", self.addr()))?;
        info!("Listening on {}", bind_addr);

        Ok(BoundServer {
            listener,
            router: Arc::new(self.routes.build()),
            timeouts: self.timeouts,
        })
    }

    /// Binds and serves forever.
    pub async fn listen(self) -> anyhow::Result<()> {
        self.bind().await?.serve().await
    }
}

impl BoundServer {
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Each connection runs on its own task.
    ///
    /// Accept errors are logged and retried after a growing pause so a
    /// broken listener cannot spin the loop.
    pub async fn serve(self) -> anyhow::Result<()> {
        let mut backoff = ACCEPT_BACKOFF_START;

        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(accepted) => {
                    backoff = ACCEPT_BACKOFF_START;
                    accepted
                }
                Err(e) => {
                    warn!(error = %e, retry_in = ?backoff, "Accept failed");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(ACCEPT_BACKOFF_MAX);
                    continue;
                }
            };
            debug!("Accepted connection from {}", peer);

            let router = Arc::clone(&self.router);
            let timeouts = self.timeouts;
            tokio::spawn(
                async move {
                    let mut conn = Connection::new(socket, router, timeouts);
                    if let Err(e) = conn.run().await {
                        tracing::error!("Connection error from {}: {}", peer, e);
                    }
                }
                .instrument(info_span!("conn", %peer)),
            );
        }
    }
}
