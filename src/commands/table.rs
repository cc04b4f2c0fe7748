//! The command table.
//!
//! Every supported command is registered once, by its canonical uppercase
//! name, together with its arity rule and handler. The table is built in
//! [`CommandTable::new`] and never changes afterwards, so connection tasks
//! can read it concurrently without locking.

use crate::commands::{hashes, placeholders, sorted_sets, strings, CommandResult};
use crate::router::Router;
use bytes::Bytes;
use std::collections::HashMap;

/// Signature shared by all command handlers.
///
/// `args` holds the parameters after the command token. Handlers may index
/// into it freely: the dispatcher only calls them once the arity rule holds.
pub type CommandHandler = fn(&dyn Router, &[Bytes]) -> CommandResult;

/// Allowed parameter counts for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many parameters.
    Exact(usize),
    /// At least this many parameters.
    AtLeast(usize),
    /// Between `min` and `max` parameters, both inclusive.
    Range(usize, usize),
    /// An odd number of parameters, at least this many.
    OddAtLeast(usize),
}

impl Arity {
    /// Returns true if `count` parameters satisfy this rule.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::OddAtLeast(n) => count >= n && count % 2 == 1,
        }
    }
}

/// Metadata and callback for one table entry.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Canonical uppercase command name.
    pub name: &'static str,
    pub arity: Arity,
    pub handler: CommandHandler,
}

/// Immutable registry of supported commands.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: HashMap<&'static str, CommandSpec>,
}

impl CommandTable {
    /// Builds the table with every supported command registered.
    pub fn new() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.register_string_commands();
        table.register_hash_commands();
        table.register_sorted_set_commands();
        table.register_placeholder_commands();
        table
    }

    /// Looks up a command by its canonical uppercase name.
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn register(&mut self, name: &'static str, arity: Arity, handler: CommandHandler) {
        let previous = self.entries.insert(
            name,
            CommandSpec {
                name,
                arity,
                handler,
            },
        );
        debug_assert!(previous.is_none(), "duplicate command {name}");
    }

    fn register_string_commands(&mut self) {
        self.register("GET", Arity::Exact(1), strings::handle_get);
        self.register("SET", Arity::Exact(2), strings::handle_set);
        self.register("INCR", Arity::Exact(1), strings::handle_incr);
        self.register("DECR", Arity::Exact(1), strings::handle_decr);
        self.register("INCRBY", Arity::Exact(2), strings::handle_incrby);
        self.register("DECRBY", Arity::Exact(2), strings::handle_decrby);
    }

    fn register_hash_commands(&mut self) {
        self.register("HSET", Arity::Exact(3), hashes::handle_hset);
        self.register("HMSET", Arity::OddAtLeast(3), hashes::handle_hmset);
        self.register("HGET", Arity::Exact(2), hashes::handle_hget);
        self.register("HGETALL", Arity::Exact(1), hashes::handle_hgetall);
        self.register("HMGET", Arity::AtLeast(2), hashes::handle_hmget);
        self.register("HDEL", Arity::Exact(2), hashes::handle_hdel);
        self.register("HLEN", Arity::Exact(1), hashes::handle_hlen);
        self.register("HEXISTS", Arity::Exact(2), hashes::handle_hexists);
        self.register("HKEYS", Arity::Exact(1), hashes::handle_hkeys);
        self.register("HVALS", Arity::Exact(1), hashes::handle_hvals);
        self.register("HINCRBY", Arity::Exact(3), hashes::handle_hincrby);
    }

    fn register_sorted_set_commands(&mut self) {
        self.register("ZADD", Arity::Exact(3), sorted_sets::handle_zadd);
        self.register("ZSCORE", Arity::Exact(2), sorted_sets::handle_zscore);
        self.register("ZREM", Arity::Exact(2), sorted_sets::handle_zrem);
        self.register("ZCARD", Arity::Exact(1), sorted_sets::handle_zcard);
        self.register("ZCOUNT", Arity::Exact(3), sorted_sets::handle_zcount);
        self.register("ZRANK", Arity::Exact(2), sorted_sets::handle_zrank);
        self.register("ZRANGE", Arity::Range(3, 4), sorted_sets::handle_zrange);
        self.register(
            "ZRANGEBYSCORE",
            Arity::Range(3, 4),
            sorted_sets::handle_zrangebyscore,
        );
        self.register(
            "ZREMRANGEBYSCORE",
            Arity::Exact(3),
            sorted_sets::handle_zremrangebyscore,
        );
    }

    fn register_placeholder_commands(&mut self) {
        for name in placeholders::PLACEHOLDER_COMMANDS {
            self.register(name, Arity::AtLeast(0), placeholders::handle_placeholder);
        }
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_rules() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(1));
        assert!(!Arity::Exact(2).accepts(3));

        assert!(Arity::AtLeast(2).accepts(5));
        assert!(!Arity::AtLeast(2).accepts(1));

        assert!(Arity::Range(3, 4).accepts(3));
        assert!(Arity::Range(3, 4).accepts(4));
        assert!(!Arity::Range(3, 4).accepts(5));

        assert!(Arity::OddAtLeast(3).accepts(3));
        assert!(Arity::OddAtLeast(3).accepts(7));
        assert!(!Arity::OddAtLeast(3).accepts(4));
        assert!(!Arity::OddAtLeast(3).accepts(1));
    }

    #[test]
    fn test_table_contents() {
        let table = CommandTable::new();
        assert_eq!(table.len(), 32);
        assert_eq!(table.get("HMSET").unwrap().arity, Arity::OddAtLeast(3));
        assert_eq!(table.get("ZRANGE").unwrap().arity, Arity::Range(3, 4));
        assert!(table.get("SMEMBERS").is_some());
        assert!(table.get("get").is_none());
        assert!(table.get("EXPIRE").is_none());
        assert!(table.get("TYPE").is_none());
    }

    #[test]
    fn test_names_are_canonical() {
        for name in CommandTable::new().names() {
            assert_eq!(name, name.to_ascii_uppercase());
        }
    }
}
