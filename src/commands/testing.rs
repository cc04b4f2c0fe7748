//! Test doubles for the dispatch layer.
//!
//! [`RecordingBackend`] wraps a [`MemoryBackend`] and counts every call so
//! tests can assert that validation failures never reach storage. It can
//! also be switched into a failing mode. [`CountingRouter`] does the same
//! for partition lookups.

use crate::commands::Dispatcher;
use crate::error::{RouteError, StoreError, StoreResult};
use crate::protocol::{Reply, Request};
use crate::router::{PartitionRouter, Router};
use crate::storage::{Backend, MemoryBackend, ScoredMember};
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct RecordingBackend {
    inner: MemoryBackend,
    calls: AtomicUsize,
    failure: Mutex<Option<StoreError>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every following call fail with `err`.
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    fn record(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Backend for RecordingBackend {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>> {
        self.record()?;
        self.inner.get(key)
    }

    fn set(&self, key: Bytes, value: Bytes) -> StoreResult<()> {
        self.record()?;
        self.inner.set(key, value)
    }

    fn incr_by(&self, key: &[u8], delta: i64) -> StoreResult<i64> {
        self.record()?;
        self.inner.incr_by(key, delta)
    }

    fn hset(&self, key: &[u8], field: Bytes, value: Bytes) -> StoreResult<i64> {
        self.record()?;
        self.inner.hset(key, field, value)
    }

    fn hmset(&self, key: &[u8], pairs: Vec<(Bytes, Bytes)>) -> StoreResult<i64> {
        self.record()?;
        self.inner.hmset(key, pairs)
    }

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Bytes>> {
        self.record()?;
        self.inner.hget(key, field)
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Bytes, Bytes)>> {
        self.record()?;
        self.inner.hgetall(key)
    }

    fn hmget(&self, key: &[u8], fields: &[Bytes]) -> StoreResult<Vec<Option<Bytes>>> {
        self.record()?;
        self.inner.hmget(key, fields)
    }

    fn hdel(&self, key: &[u8], field: &[u8]) -> StoreResult<i64> {
        self.record()?;
        self.inner.hdel(key, field)
    }

    fn hlen(&self, key: &[u8]) -> StoreResult<i64> {
        self.record()?;
        self.inner.hlen(key)
    }

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool> {
        self.record()?;
        self.inner.hexists(key, field)
    }

    fn hkeys(&self, key: &[u8]) -> StoreResult<Vec<Bytes>> {
        self.record()?;
        self.inner.hkeys(key)
    }

    fn hvals(&self, key: &[u8]) -> StoreResult<Vec<Bytes>> {
        self.record()?;
        self.inner.hvals(key)
    }

    fn hincr_by(&self, key: &[u8], field: Bytes, delta: i64) -> StoreResult<i64> {
        self.record()?;
        self.inner.hincr_by(key, field, delta)
    }

    fn zadd(&self, key: &[u8], score: f64, member: Bytes) -> StoreResult<i64> {
        self.record()?;
        self.inner.zadd(key, score, member)
    }

    fn zscore(&self, key: &[u8], member: &[u8]) -> StoreResult<Option<f64>> {
        self.record()?;
        self.inner.zscore(key, member)
    }

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<i64> {
        self.record()?;
        self.inner.zrem(key, member)
    }

    fn zcard(&self, key: &[u8]) -> StoreResult<i64> {
        self.record()?;
        self.inner.zcard(key)
    }

    fn zcount(&self, key: &[u8], min: f64, max: f64) -> StoreResult<i64> {
        self.record()?;
        self.inner.zcount(key, min, max)
    }

    fn zrank(&self, key: &[u8], member: &[u8]) -> StoreResult<Option<i64>> {
        self.record()?;
        self.inner.zrank(key, member)
    }

    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<ScoredMember>> {
        self.record()?;
        self.inner.zrange(key, start, stop)
    }

    fn zrange_by_score(&self, key: &[u8], min: f64, max: f64) -> StoreResult<Vec<ScoredMember>> {
        self.record()?;
        self.inner.zrange_by_score(key, min, max)
    }

    fn zrem_range_by_score(&self, key: &[u8], min: f64, max: f64) -> StoreResult<i64> {
        self.record()?;
        self.inner.zrem_range_by_score(key, min, max)
    }
}

/// Router that counts lookups before delegating.
pub struct CountingRouter {
    inner: PartitionRouter,
    resolves: AtomicUsize,
}

impl CountingRouter {
    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

impl Router for CountingRouter {
    fn resolve(&self, key: &[u8]) -> Result<Arc<dyn Backend>, RouteError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(key)
    }
}

/// A dispatcher over a single recording partition.
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub backend: Arc<RecordingBackend>,
    pub router: Arc<CountingRouter>,
}

impl Harness {
    pub fn new() -> Self {
        let backend = Arc::new(RecordingBackend::default());
        let partitions: Vec<Arc<dyn Backend>> = vec![backend.clone()];
        Self::with_router(backend, PartitionRouter::new(partitions))
    }

    /// A harness whose router has no partitions at all.
    pub fn without_partitions() -> Self {
        Self::with_router(
            Arc::new(RecordingBackend::default()),
            PartitionRouter::new(Vec::new()),
        )
    }

    fn with_router(backend: Arc<RecordingBackend>, inner: PartitionRouter) -> Self {
        let router = Arc::new(CountingRouter {
            inner,
            resolves: AtomicUsize::new(0),
        });
        Self {
            dispatcher: Dispatcher::new(router.clone()),
            backend,
            router,
        }
    }

    pub fn run(&self, parts: &[&str]) -> Reply {
        self.dispatcher.dispatch(&Request::from_parts(parts))
    }

    /// Total calls seen by the router and the backend.
    pub fn contacts(&self) -> (usize, usize) {
        (self.router.resolves(), self.backend.calls())
    }
}

pub fn text(s: &str) -> Reply {
    Reply::text(Bytes::copy_from_slice(s.as_bytes()))
}

pub fn bulk(items: &[Option<&str>]) -> Reply {
    Reply::Bulk(
        items
            .iter()
            .map(|i| i.map(|s| Bytes::copy_from_slice(s.as_bytes())))
            .collect(),
    )
}
