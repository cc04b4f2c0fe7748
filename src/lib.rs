//! # rstore - Command Dispatch for a Partitioned Key-Value Store
//!
//! rstore accepts Redis-style commands, validates and parses their
//! parameters, routes each one to the partition that owns its key, performs
//! a single backend operation and encodes the outcome as a reply.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               rstore                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│ Dispatcher  │                  │
//! │  │ (Listener)  │    │  Handler    │    │ + Table     │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │ first key               │
//! │                                               ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐    │
//! │  │  Request    │    │              PartitionRouter                 │    │
//! │  │  Parser     │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │    │
//! │  │             │    │  │Part 0  │ │Part 1  │ │Part 2  │ │...N    │ │    │
//! │  └─────────────┘    │  │Backend │ │Backend │ │Backend │ │        │ │    │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │    │
//! │                     └──────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use rstore::commands::Dispatcher;
//! use rstore::protocol::{Reply, Request};
//! use rstore::router::PartitionRouter;
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new(Arc::new(PartitionRouter::in_memory(16)));
//!
//! let reply = dispatcher.dispatch(&Request::from_parts(&["HMSET", "user:1", "name", "Ariz"]));
//! assert_eq!(reply, Reply::Ok);
//!
//! let reply = dispatcher.dispatch(&Request::from_parts(&["foo"]));
//! assert_eq!(reply.error_message(), Some("rstore: unknown command 'foo'"));
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: Requests, replies and the RESP codec
//! - [`commands`]: Command table, argument parsing and handlers
//! - [`router`]: Key to partition resolution
//! - [`storage`]: The backend contract and the in-memory partition
//! - [`connection`]: Client connection management
//! - [`config`]: Command-line configuration
//! - [`error`]: The error taxonomy surfaced to clients
//!
//! ## Design Highlights
//!
//! ### Validation Before Contact
//!
//! Arity and typed parameters are checked before the router is asked for a
//! partition, so malformed requests never reach storage.
//!
//! ### Stateless Dispatch
//!
//! The command table is built once and only read afterwards. A single
//! `Arc<Dispatcher>` serves every connection task without locks.

pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod router;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::Dispatcher;
pub use config::ServerConfig;
pub use connection::{handle_connection, ConnectionStats};
pub use error::{CommandError, RouteError, StoreError};
pub use protocol::{ParseError, Reply, Request, RequestParser};
pub use router::{PartitionRouter, Router};
pub use storage::{Backend, MemoryBackend};

/// The default port rstore listens on
pub const DEFAULT_PORT: u16 = 6380;

/// The default host rstore binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default number of in-memory partitions
pub const DEFAULT_PARTITIONS: u16 = 16;

/// Version of rstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
