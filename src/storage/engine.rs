//! In-Memory Partition Backend
//!
//! [`MemoryBackend`] is the storage behind one partition. It holds strings,
//! hashes and sorted sets in a single keyspace so that type checks see a
//! consistent view of each key.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                MemoryBackend                 │
//! │  RwLock<HashMap<Bytes, Value>>               │
//! │     ├── Value::String(Bytes)                 │
//! │     ├── Value::Hash(HashMap<Bytes, Bytes>)   │
//! │     └── Value::SortedSet(SortedSet)          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Reads share the lock, writes take it exclusively. Each operation holds
//! the lock only for its own duration, so two INCRBY calls on the same key
//! are applied one after the other and never lose an update.
//!
//! Empty hashes and sorted sets are removed as soon as their last field or
//! member goes away.

use crate::error::{StoreError, StoreResult};
use crate::storage::backend::Backend;
use crate::storage::zset::{ScoredMember, SortedSet};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A value stored under one key.
#[derive(Debug, Clone)]
enum Value {
    String(Bytes),
    Hash(HashMap<Bytes, Bytes>),
    SortedSet(SortedSet),
}

/// Operation counters for one backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub keys: u64,
    pub reads: u64,
    pub writes: u64,
}

/// Thread-safe in-memory implementation of [`Backend`].
///
/// # Example
///
/// ```
/// use rstore::storage::{Backend, MemoryBackend};
/// use bytes::Bytes;
///
/// let backend = MemoryBackend::new();
/// backend.set(Bytes::from("name"), Bytes::from("Ariz")).unwrap();
/// assert_eq!(backend.get(b"name").unwrap(), Some(Bytes::from("Ariz")));
/// assert_eq!(backend.incr_by(b"hits", 5).unwrap(), 5);
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<Bytes, Value>>,
    read_count: AtomicU64,
    write_count: AtomicU64,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the operation counters. Taking it is not
    /// counted as a read.
    pub fn stats(&self) -> BackendStats {
        let keys = self.data.read().unwrap_or_else(PoisonError::into_inner).len();
        BackendStats {
            keys: keys as u64,
            reads: self.read_count.load(Ordering::Relaxed),
            writes: self.write_count.load(Ordering::Relaxed),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Bytes, Value>> {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        // A panic in another task must not take the whole partition down.
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Bytes, Value>> {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the hash at `key`, if there is one.
    fn with_hash<T>(
        &self,
        key: &[u8],
        f: impl FnOnce(&HashMap<Bytes, Bytes>) -> T,
    ) -> StoreResult<Option<T>> {
        match self.read().get(key) {
            Some(Value::Hash(hash)) => Ok(Some(f(hash))),
            Some(_) => Err(StoreError::WrongType),
            None => Ok(None),
        }
    }

    /// Runs `f` against the hash at `key`, creating it when missing.
    fn with_hash_mut<T>(
        &self,
        key: &[u8],
        f: impl FnOnce(&mut HashMap<Bytes, Bytes>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut data = self.write();
        let value = data
            .entry(Bytes::copy_from_slice(key))
            .or_insert_with(|| Value::Hash(HashMap::new()));
        let Value::Hash(hash) = value else {
            return Err(StoreError::WrongType);
        };
        let result = f(hash);
        if hash.is_empty() {
            data.remove(key);
        }
        result
    }

    /// Runs `f` against the sorted set at `key`, if there is one.
    fn with_zset<T>(&self, key: &[u8], f: impl FnOnce(&SortedSet) -> T) -> StoreResult<Option<T>> {
        match self.read().get(key) {
            Some(Value::SortedSet(set)) => Ok(Some(f(set))),
            Some(_) => Err(StoreError::WrongType),
            None => Ok(None),
        }
    }

    /// Runs `f` against the sorted set at `key`, creating it when missing.
    fn with_zset_mut<T>(&self, key: &[u8], f: impl FnOnce(&mut SortedSet) -> T) -> StoreResult<T> {
        let mut data = self.write();
        let value = data
            .entry(Bytes::copy_from_slice(key))
            .or_insert_with(|| Value::SortedSet(SortedSet::new()));
        let Value::SortedSet(set) = value else {
            return Err(StoreError::WrongType);
        };
        let result = f(set);
        if set.is_empty() {
            data.remove(key);
        }
        Ok(result)
    }
}

/// Parses a stored value as an integer and adds `delta` to it.
fn add_to_integer(current: Option<&Bytes>, delta: i64) -> StoreResult<i64> {
    let current = match current {
        Some(raw) => std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(StoreError::NotAnInteger)?,
        None => 0,
    };
    current.checked_add(delta).ok_or(StoreError::Overflow)
}

fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

impl Backend for MemoryBackend {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>> {
        match self.read().get(key) {
            Some(Value::String(v)) => Ok(Some(v.clone())),
            Some(_) => Err(StoreError::WrongType),
            None => Ok(None),
        }
    }

    fn set(&self, key: Bytes, value: Bytes) -> StoreResult<()> {
        self.write().insert(key, Value::String(value));
        Ok(())
    }

    fn incr_by(&self, key: &[u8], delta: i64) -> StoreResult<i64> {
        let mut data = self.write();
        let current = match data.get(key) {
            Some(Value::String(v)) => Some(v),
            Some(_) => return Err(StoreError::WrongType),
            None => None,
        };
        let next = add_to_integer(current, delta)?;
        data.insert(
            Bytes::copy_from_slice(key),
            Value::String(Bytes::from(next.to_string())),
        );
        Ok(next)
    }

    fn hset(&self, key: &[u8], field: Bytes, value: Bytes) -> StoreResult<i64> {
        self.with_hash_mut(key, |hash| Ok(i64::from(hash.insert(field, value).is_none())))
    }

    fn hmset(&self, key: &[u8], pairs: Vec<(Bytes, Bytes)>) -> StoreResult<i64> {
        self.with_hash_mut(key, |hash| {
            let mut added = 0;
            for (field, value) in pairs {
                if hash.insert(field, value).is_none() {
                    added += 1;
                }
            }
            Ok(added)
        })
    }

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Bytes>> {
        Ok(self.with_hash(key, |hash| hash.get(field).cloned())?.flatten())
    }

    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Bytes, Bytes)>> {
        let pairs = self.with_hash(key, |hash| {
            hash.iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect::<Vec<_>>()
        })?;
        Ok(pairs.unwrap_or_default())
    }

    fn hmget(&self, key: &[u8], fields: &[Bytes]) -> StoreResult<Vec<Option<Bytes>>> {
        let values = self.with_hash(key, |hash| {
            fields
                .iter()
                .map(|f| hash.get(f).cloned())
                .collect::<Vec<_>>()
        })?;
        Ok(values.unwrap_or_else(|| vec![None; fields.len()]))
    }

    fn hdel(&self, key: &[u8], field: &[u8]) -> StoreResult<i64> {
        if self.with_hash(key, |_| ())?.is_none() {
            return Ok(0);
        }
        self.with_hash_mut(key, |hash| Ok(i64::from(hash.remove(field).is_some())))
    }

    fn hlen(&self, key: &[u8]) -> StoreResult<i64> {
        Ok(self.with_hash(key, |hash| len_i64(hash.len()))?.unwrap_or(0))
    }

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool> {
        Ok(self
            .with_hash(key, |hash| hash.contains_key(field))?
            .unwrap_or(false))
    }

    fn hkeys(&self, key: &[u8]) -> StoreResult<Vec<Bytes>> {
        let keys = self.with_hash(key, |hash| hash.keys().cloned().collect::<Vec<_>>())?;
        Ok(keys.unwrap_or_default())
    }

    fn hvals(&self, key: &[u8]) -> StoreResult<Vec<Bytes>> {
        let vals = self.with_hash(key, |hash| hash.values().cloned().collect::<Vec<_>>())?;
        Ok(vals.unwrap_or_default())
    }

    fn hincr_by(&self, key: &[u8], field: Bytes, delta: i64) -> StoreResult<i64> {
        self.with_hash_mut(key, |hash| {
            let next = add_to_integer(hash.get(&field), delta)?;
            hash.insert(field, Bytes::from(next.to_string()));
            Ok(next)
        })
    }

    fn zadd(&self, key: &[u8], score: f64, member: Bytes) -> StoreResult<i64> {
        self.with_zset_mut(key, |set| i64::from(set.insert(member, score)))
    }

    fn zscore(&self, key: &[u8], member: &[u8]) -> StoreResult<Option<f64>> {
        Ok(self.with_zset(key, |set| set.score(member))?.flatten())
    }

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<i64> {
        if self.with_zset(key, |_| ())?.is_none() {
            return Ok(0);
        }
        self.with_zset_mut(key, |set| i64::from(set.remove(member)))
    }

    fn zcard(&self, key: &[u8]) -> StoreResult<i64> {
        Ok(self.with_zset(key, |set| len_i64(set.len()))?.unwrap_or(0))
    }

    fn zcount(&self, key: &[u8], min: f64, max: f64) -> StoreResult<i64> {
        Ok(self
            .with_zset(key, |set| len_i64(set.count(min, max)))?
            .unwrap_or(0))
    }

    fn zrank(&self, key: &[u8], member: &[u8]) -> StoreResult<Option<i64>> {
        let rank = self.with_zset(key, |set| set.rank(member))?.flatten();
        Ok(rank.map(len_i64))
    }

    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<ScoredMember>> {
        let members = self.with_zset(key, |set| set.range_by_rank(start, stop))?;
        Ok(members.unwrap_or_default())
    }

    fn zrange_by_score(&self, key: &[u8], min: f64, max: f64) -> StoreResult<Vec<ScoredMember>> {
        let members = self.with_zset(key, |set| set.range_by_score(min, max))?;
        Ok(members.unwrap_or_default())
    }

    fn zrem_range_by_score(&self, key: &[u8], min: f64, max: f64) -> StoreResult<i64> {
        if self.with_zset(key, |_| ())?.is_none() {
            return Ok(0);
        }
        self.with_zset_mut(key, |set| len_i64(set.remove_range_by_score(min, max)))
    }
}
