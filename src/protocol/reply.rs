//! Reply Values and RESP Encoding
//!
//! A [`Reply`] is the single protocol-level answer produced for one request.
//! Handlers build it with the constructor helpers below; the connection layer
//! turns it into bytes with [`Reply::serialize_into`].
//!
//! ## Wire Mapping
//!
//! ```text
//! Ok            +OK\r\n
//! Nil           $-1\r\n
//! Integer(n)    :<n>\r\n
//! Text(data)    $<len>\r\n<data>\r\n
//! Error(msg)    -<msg>\r\n
//! Bulk(items)   *<count>\r\n<item>... (None items encode as $-1\r\n)
//! ```

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// A reply to exactly one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success marker with no payload.
    Ok,

    /// Absence of a value.
    Nil,

    /// 64-bit signed integer.
    Integer(i64),

    /// A single string value.
    Text(Bytes),

    /// Error message shown to the client.
    Error(String),

    /// Ordered values where individual positions may be null.
    Bulk(Vec<Option<Bytes>>),
}

impl Reply {
    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    /// Creates a single-string reply.
    ///
    /// # Example
    /// ```
    /// use rstore::protocol::Reply;
    /// let reply = Reply::text("hello");
    /// assert_eq!(reply.serialize(), b"$5\r\nhello\r\n");
    /// ```
    pub fn text(data: impl Into<Bytes>) -> Self {
        Reply::Text(data.into())
    }

    /// Creates an error reply.
    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error(msg.into())
    }

    /// Text when a value is present, nil otherwise.
    pub fn optional(value: Option<Bytes>) -> Self {
        match value {
            Some(v) => Reply::Text(v),
            None => Reply::Nil,
        }
    }

    /// Bulk reply where every position holds a value.
    pub fn bulk<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        Reply::Bulk(values.into_iter().map(Some).collect())
    }

    /// Bulk reply with no elements.
    pub fn empty_bulk() -> Self {
        Reply::Bulk(Vec::new())
    }

    /// Serializes the reply to bytes for sending over the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Ok => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(b"OK");
                buf.extend_from_slice(CRLF);
            }
            Reply::Nil => write_null(buf),
            Reply::Integer(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Text(data) => write_bulk_string(buf, data),
            Reply::Error(msg) => {
                buf.push(prefix::ERROR);
                // Error lines cannot carry raw line breaks.
                for byte in msg.bytes() {
                    buf.push(if byte == b'\r' || byte == b'\n' { b' ' } else { byte });
                }
                buf.extend_from_slice(CRLF);
            }
            Reply::Bulk(items) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(items.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for item in items {
                    match item {
                        Some(data) => write_bulk_string(buf, data),
                        None => write_null(buf),
                    }
                }
            }
        }
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// The error message, if this is an error reply.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Reply::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

fn write_bulk_string(buf: &mut Vec<u8>, data: &[u8]) {
    buf.push(prefix::BULK_STRING);
    buf.extend_from_slice(data.len().to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(data);
    buf.extend_from_slice(CRLF);
}

fn write_null(buf: &mut Vec<u8>) {
    buf.push(prefix::BULK_STRING);
    buf.extend_from_slice(b"-1");
    buf.extend_from_slice(CRLF);
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Text(data) => write!(f, "\"{}\"", String::from_utf8_lossy(data)),
            Reply::Error(msg) => write!(f, "(error) {}", msg),
            Reply::Bulk(items) => {
                if items.is_empty() {
                    return write!(f, "(empty array)");
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    match item {
                        Some(data) => write!(f, "{}) \"{}\"", i + 1, String::from_utf8_lossy(data))?,
                        None => write!(f, "{}) (nil)", i + 1)?,
                    }
                }
                Ok(())
            }
        }
    }
}
