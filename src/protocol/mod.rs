//! Request and Reply Protocol
//!
//! The dispatch layer consumes a decoded [`Request`] and produces a [`Reply`].
//! This module holds both types plus the RESP codec used by the bundled server
//! to move them on and off a connection.
//!
//! ## Modules
//!
//! - `request`: The decoded command token and parameters
//! - `reply`: The reply variants and their RESP encoding
//! - `parser`: Incremental decoder turning bytes into requests
//!
//! ## Example
//!
//! ```
//! use rstore::protocol::{Reply, RequestParser};
//!
//! let data = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
//! let (request, consumed) = RequestParser::new().parse(data).unwrap().unwrap();
//! assert_eq!(request.command(), "GET");
//! assert_eq!(consumed, data.len());
//!
//! assert_eq!(Reply::Nil.serialize(), b"$-1\r\n");
//! ```

pub mod parser;
pub mod reply;
pub mod request;

// Re-export commonly used types for convenience
pub use parser::{ParseError, ParseResult, RequestParser};
pub use reply::Reply;
pub use request::Request;
