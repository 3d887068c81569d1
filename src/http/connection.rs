use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tracing::debug;

use crate::config::ServerConfig;
use crate::http::parser::{read_request, ParseError};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::router::Router;

/// Per-connection deadlines.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for Timeouts {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            read: cfg.read_timeout(),
            write: cfg.write_timeout(),
        }
    }
}

pub struct Connection<S> {
    stream: BufReader<S>,
    router: Arc<Router>,
    timeouts: Timeouts,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, timeouts: Timeouts) -> Self {
        Self {
            stream: BufReader::new(stream),
            router,
            timeouts,
            state: ConnectionState::Reading,
        }
    }

    /// Answers exactly one request, then closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = self.read().await?;
                }

                ConnectionState::Processing(req) => {
                    let response = self.handle_request(&req);
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(mut writer) => {
                    timeout(self.timeouts.write, writer.write_to_stream(&mut self.stream))
                        .await
                        .map_err(|_| {
                            anyhow::anyhow!(
                                "write deadline expired with {} bytes pending",
                                writer.remaining()
                            )
                        })??;

                    // no keep-alive: one response per connection
                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "shutdown after response failed");
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read(&mut self) -> anyhow::Result<ConnectionState> {
        let result = match timeout(self.timeouts.read, read_request(&mut self.stream)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(timeout = ?self.timeouts.read, "read deadline expired, closing");
                return Ok(ConnectionState::Closed);
            }
        };

        match result {
            Ok(req) => Ok(ConnectionState::Processing(req)),

            // Client went away without sending anything
            Err(ParseError::Empty) => Ok(ConnectionState::Closed),

            Err(e @ ParseError::MalformedRequestLine(_)) => {
                debug!(error = %e, "rejecting request");
                let mut response = Response::default();
                response.set_status(StatusCode::BadRequest);
                Ok(ConnectionState::Writing(ResponseWriter::new(&response)))
            }

            Err(ParseError::Io(e)) => Err(e.into()),
        }
    }

    fn handle_request(&self, req: &Request) -> Response {
        let mut response = Response::default();
        let outcome = self.router.dispatch(req, &mut response);

        debug!(
            method = %req.method,
            path = %req.path,
            status = response.status,
            outcome = ?outcome,
            "dispatched"
        );

        response
    }
}
