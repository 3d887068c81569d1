//! HTTP protocol implementation.
//!
//! One request per connection: the head is read, dispatched, answered and
//! the socket is closed. Request bodies are never read.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine with read/write deadlines
//! - **`parser`**: line-oriented request head parser
//! - **`request`**: parsed request and method types
//! - **`response`**: mutable response with status, ordered headers and body
//! - **`context`**: the request/response pair handed to handlers
//! - **`writer`**: serializes a response onto the socket
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read request head (deadline: read timeout)
//!        └──────┬──────┘
//!               │ head parsed          malformed request line ──┐
//!               ▼                                               │
//!        ┌──────────────────┐                                   │
//!        │   Processing     │ ← Dispatch through the router     │
//!        └──────┬───────────┘                                   │
//!               │ response ready                                │
//!               ▼                                               │
//!        ┌──────────────────┐                                   │
//!        │    Writing       │ ← 400 BAD REQUEST ◄────────────────┘
//!        └──────┬───────────┘   (deadline: write timeout)
//!               │ response sent
//!               ▼
//!            Closed
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod context;
pub mod connection;
pub mod writer;
