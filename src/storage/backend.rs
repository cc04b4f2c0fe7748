//! Backend Operation Contract
//!
//! Every partition the router hands out implements [`Backend`]. The trait is
//! grouped by data type the same way the command surface is:
//!
//! - strings: GET, SET, INCRBY
//! - hashes: HSET, HMSET, HGET, HGETALL, HMGET, HDEL, HLEN, HEXISTS, HKEYS,
//!   HVALS, HINCRBY
//! - sorted sets: ZADD, ZSCORE, ZREM, ZCARD, ZCOUNT, ZRANK, ZRANGE,
//!   ZRANGEBYSCORE, ZREMRANGEBYSCORE
//!
//! Read paths signal "value absent" with `Ok(None)`. An `Err` is always a
//! real failure and its message reaches the client unchanged.

use crate::error::StoreResult;
use crate::storage::zset::ScoredMember;
use bytes::Bytes;

/// Operations a partition must expose.
///
/// Implementations must be safe to call from many connection tasks at once.
pub trait Backend: Send + Sync {
    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    /// Returns the string stored at `key`.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>>;

    /// Stores `value` at `key`, replacing any previous string.
    fn set(&self, key: Bytes, value: Bytes) -> StoreResult<()>;

    /// Adds `delta` to the integer stored at `key` (missing keys count as 0).
    fn incr_by(&self, key: &[u8], delta: i64) -> StoreResult<i64>;

    // ------------------------------------------------------------------
    // Hashes
    // ------------------------------------------------------------------

    /// Sets one field. Returns 1 if the field is new, 0 if it was updated.
    fn hset(&self, key: &[u8], field: Bytes, value: Bytes) -> StoreResult<i64>;

    /// Sets several fields at once. Returns the number of new fields.
    fn hmset(&self, key: &[u8], pairs: Vec<(Bytes, Bytes)>) -> StoreResult<i64>;

    fn hget(&self, key: &[u8], field: &[u8]) -> StoreResult<Option<Bytes>>;

    /// All field/value pairs in the backend's iteration order.
    fn hgetall(&self, key: &[u8]) -> StoreResult<Vec<(Bytes, Bytes)>>;

    /// One entry per requested field, in request order.
    fn hmget(&self, key: &[u8], fields: &[Bytes]) -> StoreResult<Vec<Option<Bytes>>>;

    /// Returns the number of fields removed.
    fn hdel(&self, key: &[u8], field: &[u8]) -> StoreResult<i64>;

    fn hlen(&self, key: &[u8]) -> StoreResult<i64>;

    fn hexists(&self, key: &[u8], field: &[u8]) -> StoreResult<bool>;

    fn hkeys(&self, key: &[u8]) -> StoreResult<Vec<Bytes>>;

    fn hvals(&self, key: &[u8]) -> StoreResult<Vec<Bytes>>;

    /// Adds `delta` to the integer stored in `field`.
    fn hincr_by(&self, key: &[u8], field: Bytes, delta: i64) -> StoreResult<i64>;

    // ------------------------------------------------------------------
    // Sorted sets
    // ------------------------------------------------------------------

    /// Adds or updates a member. Returns 1 if the member is new.
    fn zadd(&self, key: &[u8], score: f64, member: Bytes) -> StoreResult<i64>;

    fn zscore(&self, key: &[u8], member: &[u8]) -> StoreResult<Option<f64>>;

    fn zrem(&self, key: &[u8], member: &[u8]) -> StoreResult<i64>;

    fn zcard(&self, key: &[u8]) -> StoreResult<i64>;

    /// Members with `min <= score <= max`.
    fn zcount(&self, key: &[u8], min: f64, max: f64) -> StoreResult<i64>;

    /// 0-based rank in ascending score order.
    fn zrank(&self, key: &[u8], member: &[u8]) -> StoreResult<Option<i64>>;

    /// Members between two inclusive ranks; negative ranks count from the end.
    fn zrange(&self, key: &[u8], start: i64, stop: i64) -> StoreResult<Vec<ScoredMember>>;

    fn zrange_by_score(&self, key: &[u8], min: f64, max: f64) -> StoreResult<Vec<ScoredMember>>;

    /// Returns the number of members removed.
    fn zrem_range_by_score(&self, key: &[u8], min: f64, max: f64) -> StoreResult<i64>;
}
