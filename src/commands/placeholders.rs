//! Commands that are accepted but not backed by storage yet.
//!
//! They always answer with an empty bulk reply and never touch the router
//! or a backend.

use crate::commands::CommandResult;
use crate::protocol::Reply;
use crate::router::Router;
use bytes::Bytes;

pub const PLACEHOLDER_COMMANDS: [&str; 6] = [
    "SADD",
    "SCARD",
    "SISMEMBER",
    "SMEMBERS",
    "SREM",
    "ZREVRANGEWITHSCORE",
];

pub fn handle_placeholder(_router: &dyn Router, _args: &[Bytes]) -> CommandResult {
    Ok(Reply::empty_bulk())
}

#[cfg(test)]
mod tests {
    use crate::commands::testing::Harness;
    use crate::protocol::Reply;

    #[test]
    fn test_placeholders_reply_empty() {
        let h = Harness::new();
        assert_eq!(h.run(&["SADD", "s", "a", "b"]), Reply::Bulk(vec![]));
        assert_eq!(h.run(&["smembers", "s"]), Reply::Bulk(vec![]));
        assert_eq!(h.run(&["SCARD"]), Reply::Bulk(vec![]));
        assert_eq!(
            h.run(&["ZREVRANGEWITHSCORE", "z", "0", "-1"]),
            Reply::Bulk(vec![])
        );
        assert_eq!(h.contacts(), (0, 0));
    }
}
