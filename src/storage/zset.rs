//! Sorted Set Storage
//!
//! A sorted set keeps unique members ordered by `(score, member)`. Two
//! indices are maintained side by side:
//!
//! ```text
//! scores: HashMap<member, score>        O(1) score lookup
//! order:  BTreeSet<(score, member)>     ordered iteration and ranges
//! ```
//!
//! Scores are ordered with `f64::total_cmp`. Negative zero is folded into
//! positive zero on the way in so that `-0` and `0` compare equal.

use bytes::Bytes;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;

/// A member together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: Bytes,
    pub score: f64,
}

/// Total ordering wrapper around an `f64` score.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl Score {
    fn new(score: f64) -> Self {
        // -0.0 + 0.0 == +0.0
        Score(score + 0.0)
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// An ordered set of unique members.
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    scores: HashMap<Bytes, f64>,
    order: BTreeSet<(Score, Bytes)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member or updates its score.
    ///
    /// Returns `true` if the member was not present before.
    pub fn insert(&mut self, member: Bytes, score: f64) -> bool {
        let score = Score::new(score);
        match self.scores.insert(member.clone(), score.0) {
            Some(old) => {
                self.order.remove(&(Score::new(old), member.clone()));
                self.order.insert((score, member));
                false
            }
            None => {
                self.order.insert((score, member));
                true
            }
        }
    }

    /// Removes a member. Returns `true` if it was present.
    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self.scores.remove_entry(member) {
            Some((member, score)) => {
                self.order.remove(&(Score::new(score), member));
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// 0-based position of the member in ascending order.
    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let score = self.score(member)?;
        let bound = (Score::new(score), Bytes::copy_from_slice(member));
        Some(self.order.range(..bound).count())
    }

    /// Members between two ranks, both inclusive.
    ///
    /// Negative ranks count from the end (`-1` is the last member).
    pub fn range_by_rank(&self, start: i64, stop: i64) -> Vec<ScoredMember> {
        let Some((start, stop)) = normalize_range(start, stop, self.len()) else {
            return Vec::new();
        };
        self.order
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .map(to_scored)
            .collect()
    }

    /// Members whose score lies in `[min, max]`.
    pub fn range_by_score(&self, min: f64, max: f64) -> Vec<ScoredMember> {
        self.iter_score_range(min, max).map(to_scored).collect()
    }

    /// Number of members whose score lies in `[min, max]`.
    pub fn count(&self, min: f64, max: f64) -> usize {
        self.iter_score_range(min, max).count()
    }

    /// Removes every member whose score lies in `[min, max]`.
    pub fn remove_range_by_score(&mut self, min: f64, max: f64) -> usize {
        let doomed: Vec<Bytes> = self
            .iter_score_range(min, max)
            .map(|(_, member)| member.clone())
            .collect();
        for member in &doomed {
            self.remove(member);
        }
        doomed.len()
    }

    fn iter_score_range(&self, min: f64, max: f64) -> impl Iterator<Item = &(Score, Bytes)> {
        // An empty member sorts before every other member with the same score.
        let lower = (Score::new(min), Bytes::new());
        let max = Score::new(max);
        self.order
            .range((Bound::Included(lower), Bound::Unbounded))
            .take_while(move |(score, _)| *score <= max)
    }
}

fn to_scored((score, member): &(Score, Bytes)) -> ScoredMember {
    ScoredMember {
        member: member.clone(),
        score: score.0,
    }
}

/// Clamps Redis-style inclusive rank bounds to `0..len`.
fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = (if start < 0 { len.saturating_add(start) } else { start }).max(0);
    let stop = (if stop < 0 { len.saturating_add(stop) } else { stop }).min(len - 1);

    if stop < 0 || start > stop {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(stop).ok()?))
}
