//! Partition Routing
//!
//! The keyspace is split across a fixed number of partitions. A [`Router`]
//! answers one question: which partition owns this key?
//!
//! ```text
//!   key ──hash──> h ──(h % n)──> partitions[i] : Arc<dyn Backend>
//! ```
//!
//! The dispatcher asks the router once per request, using the first
//! parameter of the command, and never holds on to the returned handle.

use crate::error::RouteError;
use crate::storage::{Backend, MemoryBackend};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Resolves a key to the backend of its owning partition.
pub trait Router: Send + Sync {
    fn resolve(&self, key: &[u8]) -> Result<Arc<dyn Backend>, RouteError>;
}

/// Hash-modulo router over a fixed set of partitions.
///
/// # Example
///
/// ```
/// use rstore::router::{PartitionRouter, Router};
///
/// let router = PartitionRouter::in_memory(4);
/// assert_eq!(router.len(), 4);
/// assert!(router.resolve(b"user:1").is_ok());
/// ```
#[derive(Clone)]
pub struct PartitionRouter {
    partitions: Vec<Arc<dyn Backend>>,
}

impl PartitionRouter {
    pub fn new(partitions: Vec<Arc<dyn Backend>>) -> Self {
        Self { partitions }
    }

    /// Builds a router with `count` fresh in-memory partitions.
    pub fn in_memory(count: usize) -> Self {
        Self::in_memory_with_handles(count).0
    }

    /// Like [`PartitionRouter::in_memory`], also returning the concrete
    /// partitions in index order so their counters can be inspected.
    pub fn in_memory_with_handles(count: usize) -> (Self, Vec<Arc<MemoryBackend>>) {
        let handles: Vec<_> = (0..count).map(|_| Arc::new(MemoryBackend::new())).collect();
        let partitions = handles
            .iter()
            .map(|backend| Arc::clone(backend) as Arc<dyn Backend>)
            .collect();
        (Self::new(partitions), handles)
    }

    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Index of the partition that owns `key`.
    pub fn partition_index(&self, key: &[u8]) -> Result<usize, RouteError> {
        if self.partitions.is_empty() {
            return Err(RouteError::NoPartitions);
        }
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Ok((hasher.finish() % self.partitions.len() as u64) as usize)
    }
}

impl std::fmt::Debug for PartitionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionRouter")
            .field("partitions", &self.partitions.len())
            .finish()
    }
}

impl Router for PartitionRouter {
    fn resolve(&self, key: &[u8]) -> Result<Arc<dyn Backend>, RouteError> {
        let index = self.partition_index(key)?;
        Ok(Arc::clone(&self.partitions[index]))
    }
}
