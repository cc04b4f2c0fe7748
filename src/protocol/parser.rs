//! Incremental RESP Request Parser
//!
//! Clients send commands either as RESP arrays of bulk strings
//! (`*2\r\n$3\r\nGET\r\n$4\r\nname\r\n`) or as inline text lines
//! (`GET name\r\n`). The parser turns either form into a [`Request`].
//!
//! ## How the Parser Works
//!
//! [`RequestParser::parse`] looks at the front of a buffer and returns:
//! - `Ok(Some((request, consumed)))` - a complete request used `consumed` bytes
//! - `Ok(None)` - the request is incomplete, read more data
//! - `Err(ParseError)` - the client violated the protocol
//!
//! The caller owns the buffer and advances it by `consumed` bytes.

use crate::protocol::reply::{prefix, CRLF};
use crate::protocol::request::Request;
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during request parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// A length or count header is not a valid integer
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// The command token is not valid UTF-8
    #[error("invalid UTF-8 in command name")]
    InvalidUtf8,

    /// Bulk string length is negative
    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(i64),

    /// Array length is negative or zero
    #[error("invalid array length: {0}")]
    InvalidArrayLength(i64),

    /// Protocol violation (missing CRLF, unexpected type, etc.)
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The message exceeds a configured limit
    #[error("message too large: {size} (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum encoded size of one whole request.
///
/// Leaves room for a single bulk string at [`MAX_BULK_SIZE`] plus the
/// array and length headers around it.
pub const MAX_REQUEST_SIZE: usize = MAX_BULK_SIZE + 64 * 1024;

/// Maximum number of elements in one request array
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Decodes client requests from a byte buffer.
///
/// A request is rejected with [`ParseError::MessageTooLarge`] as soon as a
/// header announces more than the configured limits, so a buffer holding an
/// incomplete request never grows past [`RequestParser::max_request_size`].
#[derive(Debug, Clone, Copy)]
pub struct RequestParser {
    max_bulk_size: usize,
    max_request_size: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// Creates a parser with the default limits.
    pub fn new() -> Self {
        Self::with_limits(MAX_BULK_SIZE, MAX_REQUEST_SIZE)
    }

    /// Creates a parser with custom limits.
    ///
    /// `max_request_size` is raised to at least `max_bulk_size` so that a
    /// bulk string accepted on its own always fits in a request.
    pub fn with_limits(max_bulk_size: usize, max_request_size: usize) -> Self {
        Self {
            max_bulk_size,
            max_request_size: max_request_size.max(max_bulk_size),
        }
    }

    pub fn max_bulk_size(&self) -> usize {
        self.max_bulk_size
    }

    /// Upper bound on the bytes a single request may occupy.
    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    /// Attempts to parse one request from the front of `buf`.
    ///
    /// Blank inline lines in front of the request are skipped and counted
    /// in the consumed length.
    pub fn parse(&self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        let skipped = self.skip_blank_lines(buf);
        let parsed = match buf.get(skipped) {
            None => None,
            Some(&prefix::ARRAY) => self.parse_array(&buf[skipped..])?,
            Some(_) => self.parse_inline(&buf[skipped..])?,
        };
        Ok(parsed.map(|(request, consumed)| (request, skipped + consumed)))
    }

    /// Returns the length of the blank `\r\n`-terminated lines at the front
    /// of `buf`. Clients may send them between requests; they carry nothing.
    pub fn skip_blank_lines(&self, buf: &[u8]) -> usize {
        let mut skipped = 0;
        while let Some(end) = find_crlf(&buf[skipped..]) {
            if !buf[skipped..skipped + end].iter().all(u8::is_ascii_whitespace) {
                break;
            }
            skipped += end + CRLF.len();
        }
        skipped
    }

    /// Parses `*<count>\r\n` followed by `count` bulk strings.
    fn parse_array(&self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        let Some((count, mut consumed)) = read_header(buf)? else {
            return Ok(None);
        };

        if count <= 0 {
            return Err(ParseError::InvalidArrayLength(count));
        }
        let count = count as usize;
        if count > MAX_ARRAY_LEN {
            return Err(ParseError::MessageTooLarge {
                size: count,
                max: MAX_ARRAY_LEN,
            });
        }

        let mut parts = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            match self.parse_bulk_string(&buf[consumed..], consumed)? {
                Some((data, used)) => {
                    parts.push(data);
                    consumed += used;
                }
                None => return Ok(None),
            }
        }

        let mut parts = parts.into_iter();
        let command = match parts.next() {
            Some(token) => std::str::from_utf8(&token)
                .map_err(|_| ParseError::InvalidUtf8)?
                .to_string(),
            None => return Err(ParseError::InvalidArrayLength(0)),
        };

        Ok(Some((Request::new(command, parts.collect()), consumed)))
    }

    /// Parses a whitespace separated command line terminated by CRLF.
    fn parse_inline(&self, buf: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        let Some(end) = find_crlf(buf) else {
            if buf.len() > self.max_request_size {
                return Err(ParseError::MessageTooLarge {
                    size: buf.len(),
                    max: self.max_request_size,
                });
            }
            return Ok(None);
        };

        let line = std::str::from_utf8(&buf[..end]).map_err(|_| ParseError::InvalidUtf8)?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ParseError::ProtocolError("empty inline command".to_string()));
        };

        let params = words.map(|w| Bytes::copy_from_slice(w.as_bytes())).collect();
        Ok(Some((Request::new(command, params), end + CRLF.len())))
    }

    /// Parses one `$<length>\r\n<data>\r\n` element.
    ///
    /// `offset` is how far into the request this element starts; it is used
    /// to enforce the whole-request limit.
    fn parse_bulk_string(&self, buf: &[u8], offset: usize) -> ParseResult<Option<(Bytes, usize)>> {
        match buf.first() {
            None => return Ok(None),
            Some(&prefix::BULK_STRING) => {}
            Some(other) => {
                return Err(ParseError::ProtocolError(format!(
                    "expected bulk string, got prefix {:#04x}",
                    other
                )))
            }
        }

        let Some((length, data_start)) = read_header(buf)? else {
            return Ok(None);
        };
        if length < 0 {
            return Err(ParseError::InvalidBulkLength(length));
        }
        let length = length as usize;
        if length > self.max_bulk_size {
            return Err(ParseError::MessageTooLarge {
                size: length,
                max: self.max_bulk_size,
            });
        }

        let total = data_start + length + CRLF.len();
        if offset + total > self.max_request_size {
            return Err(ParseError::MessageTooLarge {
                size: offset + total,
                max: self.max_request_size,
            });
        }
        if buf.len() < total {
            return Ok(None);
        }
        if &buf[data_start + length..total] != CRLF {
            return Err(ParseError::ProtocolError(
                "bulk string missing trailing CRLF".to_string(),
            ));
        }

        let data = Bytes::copy_from_slice(&buf[data_start..data_start + length]);
        Ok(Some((data, total)))
    }
}

/// Reads the integer following a one-byte prefix, e.g. `*3\r\n` or `$5\r\n`.
///
/// Returns the value and the number of bytes consumed including the CRLF.
fn read_header(buf: &[u8]) -> ParseResult<Option<(i64, usize)>> {
    let Some(end) = find_crlf(&buf[1..]) else {
        return Ok(None);
    };
    let digits = &buf[1..1 + end];
    let text = std::str::from_utf8(digits)
        .map_err(|_| ParseError::InvalidInteger(String::from_utf8_lossy(digits).into_owned()))?;
    let value = text
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidInteger(text.to_string()))?;
    Ok(Some((value, 1 + end + CRLF.len())))
}

/// Finds the position of the first CRLF in the buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> ParseResult<Option<(Request, usize)>> {
        RequestParser::new().parse(input)
    }

    #[test]
    fn test_parse_array_request() {
        let input = b"*3\r\n$3\r\nSET\r\n$4\r\nname\r\n$4\r\nAriz\r\n";
        let (req, consumed) = parse(input).unwrap().unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(req, Request::from_parts(&["SET", "name", "Ariz"]));
    }

    #[test]
    fn test_parse_incomplete() {
        assert_eq!(parse(b"").unwrap(), None);
        assert_eq!(parse(b"*2\r\n$3\r\nGET\r\n").unwrap(), None);
        assert_eq!(parse(b"*2\r\n$3\r\nGET\r\n$4\r\nna").unwrap(), None);
        assert_eq!(parse(b"GET name").unwrap(), None);
    }

    #[test]
    fn test_parse_binary_param() {
        let input = b"*2\r\n$3\r\nGET\r\n$4\r\na\r\nb\r\n";
        let (req, _) = parse(input).unwrap().unwrap();
        assert_eq!(req.params()[0], Bytes::from_static(b"a\r\nb"));
    }

    #[test]
    fn test_parse_pipelined_consumes_first_only() {
        let input = b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n";
        let (_, consumed) = parse(input).unwrap().unwrap();
        assert_eq!(consumed, input.len() / 2);
    }

    #[test]
    fn test_parse_inline() {
        let (req, consumed) = parse(b"hget  user:1 name\r\n").unwrap().unwrap();
        assert_eq!(consumed, 19);
        assert_eq!(req, Request::from_parts(&["hget", "user:1", "name"]));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse(b"*0\r\n"),
            Err(ParseError::InvalidArrayLength(0))
        ));
        assert!(matches!(
            parse(b"*1\r\n:5\r\n"),
            Err(ParseError::ProtocolError(_))
        ));
        assert!(matches!(
            parse(b"*1\r\n$-1\r\n"),
            Err(ParseError::InvalidBulkLength(-1))
        ));
        assert!(matches!(
            parse(b"*x\r\n"),
            Err(ParseError::InvalidInteger(_))
        ));
        assert!(matches!(
            parse(b"*1\r\n$3\r\nGETxx"),
            Err(ParseError::ProtocolError(_))
        ));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(parse(b"\r\n").unwrap(), None);
        assert_eq!(parse(b"   \r\n\r\n").unwrap(), None);
        assert_eq!(RequestParser::new().skip_blank_lines(b" \t\r\n\r\nGET"), 6);

        let (req, consumed) = parse(b"\r\n  \r\nGET k\r\n").unwrap().unwrap();
        assert_eq!(req, Request::from_parts(&["GET", "k"]));
        assert_eq!(consumed, 13);

        let input = b"\r\n*1\r\n$4\r\nPING\r\n";
        let (req, consumed) = parse(input).unwrap().unwrap();
        assert_eq!(req.command(), "PING");
        assert_eq!(consumed, input.len());
    }

    #[test]
    fn test_bulk_limit_boundary() {
        let parser = RequestParser::with_limits(8, 64);
        let (req, _) = parser
            .parse(b"*2\r\n$3\r\nGET\r\n$8\r\n12345678\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(req.params()[0].len(), 8);

        // Rejected from the header alone, before the payload arrives.
        assert_eq!(
            parser.parse(b"*2\r\n$3\r\nGET\r\n$9\r\n"),
            Err(ParseError::MessageTooLarge { size: 9, max: 8 })
        );
    }

    #[test]
    fn test_request_limit_covers_all_elements() {
        let parser = RequestParser::with_limits(8, 40);
        // 4 + 9 + 14 = 27 bytes: fits.
        assert!(parser
            .parse(b"*2\r\n$3\r\nSET\r\n$8\r\n12345678\r\n")
            .unwrap()
            .is_some());
        // A third element pushes the request to 41 bytes.
        assert!(matches!(
            parser.parse(b"*3\r\n$3\r\nSET\r\n$8\r\n12345678\r\n$8\r\n"),
            Err(ParseError::MessageTooLarge { size: 41, max: 40 })
        ));
        // Inline lines without a terminator are bounded too.
        assert!(matches!(
            parser.parse(&[b'a'; 41]),
            Err(ParseError::MessageTooLarge { size: 41, max: 40 })
        ));
    }

    #[test]
    fn test_default_limits_agree() {
        let parser = RequestParser::new();
        assert_eq!(parser.max_bulk_size(), MAX_BULK_SIZE);
        // A maximal bulk string plus its headers still fits in one request.
        let headers = b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$536870912\r\n".len() + CRLF.len();
        assert!(parser.max_request_size() >= MAX_BULK_SIZE + headers);

        let small = RequestParser::with_limits(100, 10);
        assert_eq!(small.max_request_size(), 100);
    }
}
