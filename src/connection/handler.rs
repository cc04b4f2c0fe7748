//! Connection Handler
//!
//! Each client gets its own handler task that runs in a loop, reading
//! requests and writing replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects, ConnectionHandler spawned
//!        │
//!        ▼
//! 2. ┌──────────────────────────────────┐
//!    │  read bytes into BytesMut        │
//!    │        │                         │
//!    │        ▼                         │
//!    │  parse every complete request    │◄──┐
//!    │        │                         │   │
//!    │        ▼                         │   │
//!    │  dispatch, buffer the reply      │───┘
//!    │        │                         │
//!    │        ▼                         │
//!    │  flush replies, read again       │
//!    └──────────────────────────────────┘
//!        │
//!        ▼
//! 3. Client disconnects, protocol error or I/O error
//! ```
//!
//! Pipelined requests that arrive in one read are answered in order and
//! flushed together. A malformed request gets one error reply and then the
//! connection is closed, since the stream position can no longer be trusted.

use crate::commands::Dispatcher;
use crate::protocol::{ParseError, Reply, Request, RequestParser};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Counters shared by all connections.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    pub connections_accepted: AtomicU64,
    pub active_connections: AtomicU64,
    pub commands_processed: AtomicU64,
    pub bytes_read: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection over any async byte stream.
pub struct ConnectionHandler<S> {
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Bytes received but not yet parsed
    buffer: BytesMut,

    /// Scratch space for encoding replies
    out: Vec<u8>,

    dispatcher: Arc<Dispatcher>,
    parser: RequestParser,
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a handler with the default request limits and counts the
    /// connection as open.
    pub fn new(
        stream: S,
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        Self::with_parser(stream, addr, dispatcher, stats, RequestParser::new())
    }

    /// Creates a handler whose read buffer is bounded by `parser`'s
    /// request limit.
    pub fn with_parser(
        stream: S,
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        stats: Arc<ConnectionStats>,
        parser: RequestParser,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            out: Vec::with_capacity(INITIAL_BUFFER_SIZE),
            dispatcher,
            parser,
            stats,
        }
    }

    /// Runs the connection until the client goes away or an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(ConnectionError::ClientDisconnected) => {
                debug!(client = %self.addr, "Client disconnected")
            }
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let mut answered = 0usize;
            loop {
                match self.try_parse_request() {
                    Ok(Some(request)) => {
                        let reply = self.dispatcher.dispatch(&request);
                        self.stats.command_processed();
                        self.queue_reply(&reply).await?;
                        answered += 1;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        self.reject(&e).await?;
                        return Err(ConnectionError::ParseError(e));
                    }
                }
            }

            if answered > 0 {
                self.stream.flush().await?;
                trace!(client = %self.addr, replies = answered, "Flushed replies");
            }

            self.read_more_data().await?;
        }
    }

    fn try_parse_request(&mut self) -> Result<Option<Request>, ParseError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match self.parser.parse(&self.buffer)? {
            Some((request, consumed)) => {
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    command = %request.command(),
                    remaining = self.buffer.len(),
                    "Parsed request"
                );
                Ok(Some(request))
            }
            None => {
                // Drop blank lines so a trailing CRLF is not taken for a
                // truncated request at end of stream.
                let blank = self.parser.skip_blank_lines(&self.buffer);
                let _ = self.buffer.split_to(blank);
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete request, need more data"
                );
                Ok(None)
            }
        }
    }

    /// Reads more bytes from the client.
    ///
    /// The parser rejects any request announcing more than its request
    /// limit, so a buffer holding only part of a request reaches that limit
    /// only when a header line never ends.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        let limit = self.parser.max_request_size();
        if self.buffer.len() >= limit {
            error!(
                client = %self.addr,
                size = self.buffer.len(),
                limit,
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return if self.buffer.is_empty() {
                Err(ConnectionError::ClientDisconnected)
            } else {
                Err(ConnectionError::UnexpectedEof)
            };
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");
        Ok(())
    }

    /// Encodes a reply into the write buffer without flushing.
    async fn queue_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        self.out.clear();
        reply.serialize_into(&mut self.out);
        self.stream.write_all(&self.out).await?;
        self.stats.bytes_written(self.out.len());
        Ok(())
    }

    /// Answers a malformed request with a protocol error reply.
    async fn reject(&mut self, err: &ParseError) -> Result<(), ConnectionError> {
        warn!(client = %self.addr, error = %err, "Protocol error");
        let detail = match err {
            ParseError::ProtocolError(detail) => detail.clone(),
            other => other.to_string(),
        };
        let reply = Reply::error(format!("rstore: protocol error: {}", detail));
        self.queue_reply(&reply).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

/// Errors that can end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// The stream ended in the middle of a request
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Buffer size limit exceeded")]
    BufferFull,
}

/// Runs a [`ConnectionHandler`] to completion.
///
/// Normal disconnects are swallowed; anything else is logged at debug level
/// since [`ConnectionHandler::run`] has already reported it.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, dispatcher, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}
