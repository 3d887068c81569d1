use bytes::BytesMut;
use indexmap::IndexMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

/// HTTP status codes the server produces on its own.
///
/// Handlers may still set any numeric status through
/// [`Response::status`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webserver::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the status message written on the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use webserver::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.message(), "OK");
    /// assert_eq!(StatusCode::NotFound.message(), "NOT FOUND");
    /// ```
    pub fn message(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "BAD REQUEST",
            StatusCode::NotFound => "NOT FOUND",
            StatusCode::MethodNotAllowed => "METHOD NOT ALLOWED",
            StatusCode::InternalServerError => "INTERNAL SERVER ERROR",
        }
    }
}

/// The response sent back to the connected client.
///
/// Created fresh for every connection with 200/OK and a `Date` header,
/// then mutated by handlers. Headers keep insertion order so the wire
/// output is deterministic.
#[derive(Debug, Clone)]
pub struct Response {
    /// Numeric status code
    pub status: u16,
    /// Status message written after the code
    pub message: String,
    /// Response headers in insertion order
    pub headers: IndexMap<String, String>,
    body: BytesMut,
}

impl Response {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Date".to_string(), http_date());

        Self {
            status,
            message: message.into(),
            headers,
            body: BytesMut::new(),
        }
    }

    /// Overwrites status code and message in one go.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status.as_u16();
        self.message = status.message().to_string();
    }

    /// Appends raw bytes to the body. Nothing is escaped and no
    /// Content-Length is computed.
    pub fn write(&mut self, message: impl AsRef<[u8]>) {
        self.body.extend_from_slice(message.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Adds or replaces a header. A replaced header keeps its position.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok.as_u16(), StatusCode::Ok.message())
    }
}

// The local offset is unavailable on some platforms once the runtime has
// spawned threads, UTC stands in then.
fn http_date() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&Rfc2822).unwrap_or_else(|_| now.to_string())
}
