//! Client Connection Module
//!
//! Each accepted client is served by its own async task. The task owns a
//! [`ConnectionHandler`] which moves bytes between the socket and the
//! shared [`Dispatcher`](crate::commands::Dispatcher).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                    (main.rs)                                │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept() + spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler<S>                        │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │ Read bytes  │───>│ Parse req   │───>│ Dispatch    │      │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘      │
//! │                                               ▼             │
//! │                                      ┌─────────────┐        │
//! │                                      │ Write reply │        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handler is generic over the stream type, so anything implementing
//! `AsyncRead + AsyncWrite + Unpin` can be served.
//!
//! ## Example
//!
//! ```ignore
//! use rstore::commands::Dispatcher;
//! use rstore::connection::{handle_connection, ConnectionStats};
//! use rstore::router::PartitionRouter;
//! use std::sync::Arc;
//!
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(PartitionRouter::in_memory(16))));
//! let stats = Arc::new(ConnectionStats::new());
//!
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, dispatcher, stats));
//! ```

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
