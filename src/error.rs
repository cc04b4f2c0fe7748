//! Error Taxonomy
//!
//! Every failure a client can observe is one of the variants of
//! [`CommandError`]. Each variant renders to a fixed message which the
//! dispatcher places verbatim into an error reply.
//!
//! Two collaborator error types feed into the taxonomy:
//!
//! - [`RouteError`]: the router could not find a partition for a key
//! - [`StoreError`]: a backend operation failed
//!
//! "Value absent" is deliberately *not* an error. Backends report it as
//! `Ok(None)` and handlers turn it into a nil reply.

use thiserror::Error;

/// Errors surfaced to clients by the dispatch layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// The parameter count does not satisfy the command's arity rule.
    #[error("rstore: wrong number of arguments for '{0}' command")]
    WrongArgumentCount(&'static str),

    /// A parameter that must be a signed 64-bit integer is malformed.
    #[error("rstore: value is not an integer or out of range")]
    InvalidInteger,

    /// A parameter that must be a 64-bit float is malformed.
    #[error("rstore: value is not a valid float")]
    InvalidFloat,

    /// An optional modifier is present but is not the expected literal.
    #[error("rstore: syntax error, expected WITHSCORES")]
    InvalidOptionalFlagSyntax,

    /// No handler is registered for the command token.
    #[error("rstore: unknown command '{0}'")]
    UnknownCommand(String),

    /// The router could not resolve the owning partition.
    #[error(transparent)]
    PartitionResolution(#[from] RouteError),

    /// The backend rejected or failed the operation.
    #[error(transparent)]
    Backend(#[from] StoreError),
}

/// Errors produced while resolving a key to its partition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The router has no partitions configured.
    #[error("rstore: no partition available for key")]
    NoPartitions,
}

/// Errors produced by a backend operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key holds a value of a different data type.
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// The stored value cannot be interpreted as an integer.
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    /// An increment would overflow a signed 64-bit integer.
    #[error("ERR increment or decrement would overflow")]
    Overflow,

    /// Any other backend failure; the message is passed through untouched.
    #[error("{0}")]
    Other(String),
}

/// Result type for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;
