//! Command Dispatch Module
//!
//! This module turns decoded requests into replies. It validates arity,
//! parses typed parameters, resolves the owning partition through the
//! router and performs exactly one backend operation per request.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ RequestParser   │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Dispatcher    │  (this module)
//! │                 │
//! │  - Lookup       │  CommandTable
//! │  - Validate     │  Arity, args
//! │  - Execute      │  strings / hashes / sorted_sets
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Router/Backend  │  (router + storage modules)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! ### String Commands
//! - `GET`, `SET`
//! - `INCR`, `INCRBY`, `DECR`, `DECRBY`
//!
//! ### Hash Commands
//! - `HSET`, `HMSET`, `HGET`, `HGETALL`, `HMGET`
//! - `HDEL`, `HLEN`, `HEXISTS`, `HKEYS`, `HVALS`, `HINCRBY`
//!
//! ### Sorted Set Commands
//! - `ZADD`, `ZSCORE`, `ZREM`, `ZCARD`, `ZCOUNT`, `ZRANK`
//! - `ZRANGE`, `ZRANGEBYSCORE`, `ZREMRANGEBYSCORE`
//!
//! ### Placeholders
//! - `SADD`, `SCARD`, `SISMEMBER`, `SMEMBERS`, `SREM`, `ZREVRANGEWITHSCORE`
//!   answer with an empty bulk reply.

pub mod args;
pub mod dispatcher;
pub mod hashes;
pub mod placeholders;
pub mod sorted_sets;
pub mod strings;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::Dispatcher;
pub use table::{Arity, CommandSpec, CommandTable};

use crate::error::CommandError;
use crate::protocol::Reply;

/// Result of running one command handler.
pub type CommandResult = Result<Reply, CommandError>;
