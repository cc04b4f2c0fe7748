//! Partition Storage
//!
//! Everything the router can hand a command to lives here: the [`Backend`]
//! contract and the in-memory implementation each partition runs on.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              dyn Backend (per key)            │
//! └───────────────────────┬───────────────────────┘
//!                         │
//!                         ▼
//! ┌───────────────────────────────────────────────┐
//! │                MemoryBackend                  │
//! │   strings │ hashes │ sorted sets (SortedSet)  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use rstore::storage::{Backend, MemoryBackend};
//! use bytes::Bytes;
//!
//! let backend = MemoryBackend::new();
//! backend.zadd(b"board", 10.0, Bytes::from("alice")).unwrap();
//! backend.zadd(b"board", 5.0, Bytes::from("bob")).unwrap();
//! assert_eq!(backend.zrank(b"board", b"bob").unwrap(), Some(0));
//! ```

pub mod backend;
pub mod engine;
pub mod zset;

pub use backend::Backend;
pub use engine::{BackendStats, MemoryBackend};
pub use zset::{ScoredMember, SortedSet};
