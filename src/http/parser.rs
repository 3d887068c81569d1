use std::collections::HashMap;
use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::http::request::{Method, Request};

#[derive(Debug)]
pub enum ParseError {
    /// The stream ended before a single line arrived.
    Empty,
    /// The first line did not carry both a method and a path.
    MalformedRequestLine(String),
    Io(std::io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("connection closed before a request line was sent"),
            ParseError::MalformedRequestLine(line) => {
                write!(f, "malformed request line: {:?}", line)
            }
            ParseError::Io(e) => write!(f, "i/o error while reading request: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Line-fed parser for a request head.
///
/// Feed it one line at a time (terminator already stripped). The first
/// line is the request line, every following line up to the first empty
/// one is a header.
#[derive(Debug, Default)]
pub struct RequestParser {
    request_line: Option<(Method, String, Option<String>)>,
    headers: HashMap<String, String>,
    lines_seen: usize,
    done: bool,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one line. Returns `Ok(true)` once the head is complete.
    pub fn feed_line(&mut self, line: &str) -> Result<bool, ParseError> {
        if self.done {
            return Ok(true);
        }
        self.lines_seen += 1;

        if line.is_empty() {
            self.done = true;
            return Ok(true);
        }

        if self.request_line.is_none() {
            self.request_line = Some(parse_request_line(line)?);
        } else if let Some((name, value)) = parse_header_line(line) {
            self.headers.insert(name.to_string(), value.to_string());
        }

        Ok(false)
    }

    /// Produces the request from everything fed so far.
    ///
    /// Works whether the head ended on a blank line or at end of stream.
    pub fn finish(self) -> Result<Request, ParseError> {
        let Some((method, path, version)) = self.request_line else {
            return Err(if self.lines_seen == 0 {
                ParseError::Empty
            } else {
                ParseError::MalformedRequestLine(String::new())
            });
        };

        Ok(Request {
            method,
            path,
            version,
            headers: self.headers,
            params: HashMap::new(),
            form: HashMap::new(),
            body: Vec::new(),
        })
    }
}

fn parse_request_line(line: &str) -> Result<(Method, String, Option<String>), ParseError> {
    let mut parts = line.split(' ');

    let method = parts.next().filter(|m| !m.is_empty());
    let path = parts.next().filter(|p| !p.is_empty());

    match (method, path) {
        (Some(method), Some(path)) => {
            let version = parts.next().filter(|v| !v.is_empty()).map(str::to_string);
            Ok((Method::parse(method), path.to_string(), version))
        }
        _ => Err(ParseError::MalformedRequestLine(line.to_string())),
    }
}

/// Splits `Name: value` at the first colon. Colons inside the value
/// (times, URLs) survive. Lines without a colon yield `None`.
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    Some((name, value.trim_start_matches([' ', '\t'])))
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parses a complete request head held in memory.
///
/// Bytes after the blank separator line are ignored.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    let text = String::from_utf8_lossy(buf);
    let mut parser = RequestParser::new();

    for line in text.split_inclusive('\n') {
        if parser.feed_line(strip_line_ending(line))? {
            break;
        }
    }

    parser.finish()
}

/// Reads a request head from the socket, line by line, until the blank
/// separator line or end of stream. The body, if any, is left unread.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = RequestParser::new();
    let mut raw = Vec::with_capacity(256);

    loop {
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&raw);
        if parser.feed_line(strip_line_ending(&line))? {
            break;
        }
    }

    parser.finish()
}
