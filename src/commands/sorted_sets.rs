//! Sorted set commands.
//!
//! Scores travel back to clients as text in their shortest round-trip
//! decimal form (`1`, `2.5`, `inf`). Range commands with `WITHSCORES`
//! reply with `[member, score, member, score, ...]`.

use crate::commands::args::{parse_f64, parse_i64, parse_withscores};
use crate::commands::CommandResult;
use crate::protocol::Reply;
use crate::router::Router;
use crate::storage::ScoredMember;
use bytes::Bytes;

/// Renders a score as reply text.
pub fn format_score(score: f64) -> Bytes {
    Bytes::from(score.to_string())
}

fn range_reply(members: Vec<ScoredMember>, with_scores: bool) -> Reply {
    if with_scores {
        Reply::bulk(
            members
                .into_iter()
                .flat_map(|m| [m.member, format_score(m.score)]),
        )
    } else {
        Reply::bulk(members.into_iter().map(|m| m.member))
    }
}

/// `ZADD key score member`
pub fn handle_zadd(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let score = parse_f64(&args[1])?;
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.zadd(&args[0], score, args[2].clone())?))
}

/// `ZSCORE key member`
pub fn handle_zscore(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    let score = backend.zscore(&args[0], &args[1])?;
    Ok(Reply::optional(score.map(format_score)))
}

/// `ZREM key member`
pub fn handle_zrem(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.zrem(&args[0], &args[1])?))
}

/// `ZCARD key`
pub fn handle_zcard(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.zcard(&args[0])?))
}

/// `ZCOUNT key min max`
pub fn handle_zcount(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let min = parse_f64(&args[1])?;
    let max = parse_f64(&args[2])?;
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.zcount(&args[0], min, max)?))
}

/// `ZRANK key member`
///
/// Ranks are 0-based. Only a missing key or member yields nil.
pub fn handle_zrank(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(match backend.zrank(&args[0], &args[1])? {
        Some(rank) => Reply::integer(rank),
        None => Reply::Nil,
    })
}

/// `ZRANGE key start stop [WITHSCORES]`
pub fn handle_zrange(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let with_scores = parse_withscores(args.get(3))?;
    let start = parse_i64(&args[1])?;
    let stop = parse_i64(&args[2])?;
    let backend = router.resolve(&args[0])?;
    let members = backend.zrange(&args[0], start, stop)?;
    Ok(range_reply(members, with_scores))
}

/// `ZRANGEBYSCORE key min max [WITHSCORES]`
pub fn handle_zrangebyscore(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let with_scores = parse_withscores(args.get(3))?;
    let min = parse_f64(&args[1])?;
    let max = parse_f64(&args[2])?;
    let backend = router.resolve(&args[0])?;
    let members = backend.zrange_by_score(&args[0], min, max)?;
    Ok(range_reply(members, with_scores))
}

/// `ZREMRANGEBYSCORE key min max`
pub fn handle_zremrangebyscore(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let min = parse_f64(&args[1])?;
    let max = parse_f64(&args[2])?;
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.zrem_range_by_score(&args[0], min, max)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{bulk, text, Harness};
    use crate::error::CommandError;

    fn leaderboard() -> Harness {
        let h = Harness::new();
        h.run(&["ZADD", "board", "10", "alice"]);
        h.run(&["ZADD", "board", "5", "bob"]);
        h.run(&["ZADD", "board", "7.5", "carol"]);
        h
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(1.0), Bytes::from("1"));
        assert_eq!(format_score(2.5), Bytes::from("2.5"));
        assert_eq!(format_score(-0.125), Bytes::from("-0.125"));
        assert_eq!(format_score(f64::INFINITY), Bytes::from("inf"));
        assert_eq!(format_score(f64::NEG_INFINITY), Bytes::from("-inf"));
    }

    #[test]
    fn test_zadd_zscore() {
        let h = Harness::new();
        assert_eq!(h.run(&["ZADD", "z", "1.5", "m"]), Reply::Integer(1));
        assert_eq!(h.run(&["ZADD", "z", "2", "m"]), Reply::Integer(0));
        assert_eq!(h.run(&["ZSCORE", "z", "m"]), text("2"));
        assert_eq!(h.run(&["ZSCORE", "z", "nope"]), Reply::Nil);
        assert_eq!(h.run(&["ZCARD", "z"]), Reply::Integer(1));
    }

    #[test]
    fn test_zadd_rejects_bad_score() {
        let h = Harness::new();
        for score in ["abc", "nan"] {
            assert_eq!(
                h.run(&["ZADD", "z", score, "m"]),
                Reply::error(CommandError::InvalidFloat.to_string())
            );
        }
        assert_eq!(h.contacts(), (0, 0));
    }

    #[test]
    fn test_zrank_zero_is_a_rank() {
        let h = leaderboard();
        assert_eq!(h.run(&["ZRANK", "board", "bob"]), Reply::Integer(0));
        assert_eq!(h.run(&["ZRANK", "board", "alice"]), Reply::Integer(2));
        assert_eq!(h.run(&["ZRANK", "board", "dave"]), Reply::Nil);
        assert_eq!(h.run(&["ZRANK", "nothing", "bob"]), Reply::Nil);
    }

    #[test]
    fn test_zrange() {
        let h = leaderboard();
        assert_eq!(
            h.run(&["ZRANGE", "board", "0", "-1"]),
            bulk(&[Some("bob"), Some("carol"), Some("alice")])
        );
        assert_eq!(
            h.run(&["ZRANGE", "board", "0", "-1", "WITHSCORES"]),
            bulk(&[
                Some("bob"),
                Some("5"),
                Some("carol"),
                Some("7.5"),
                Some("alice"),
                Some("10"),
            ])
        );
        assert_eq!(
            h.run(&["ZRANGE", "board", "-1", "-1"]),
            bulk(&[Some("alice")])
        );
        assert_eq!(h.run(&["ZRANGE", "board", "5", "9"]), Reply::Bulk(vec![]));
    }

    #[test]
    fn test_zrange_bogus_flag() {
        let h = leaderboard();
        let before = h.contacts();
        assert_eq!(
            h.run(&["ZRANGE", "board", "0", "-1", "BOGUS"]),
            Reply::error(CommandError::InvalidOptionalFlagSyntax.to_string())
        );
        // The flag is checked before the indices.
        assert_eq!(
            h.run(&["ZRANGE", "board", "x", "y", "BOGUS"]),
            Reply::error(CommandError::InvalidOptionalFlagSyntax.to_string())
        );
        assert_eq!(
            h.run(&["ZRANGE", "board", "x", "-1"]),
            Reply::error(CommandError::InvalidInteger.to_string())
        );
        assert_eq!(h.contacts(), before);
    }

    #[test]
    fn test_zrangebyscore_bogus_flag() {
        let h = Harness::new();
        for args in [
            ["ZRANGEBYSCORE", "board", "0", "10", "BOGUS"],
            ["ZRANGEBYSCORE", "board", "abc", "nan", "WITHSCORE"],
        ] {
            assert_eq!(
                h.run(&args),
                Reply::error(CommandError::InvalidOptionalFlagSyntax.to_string()),
                "{:?}",
                args
            );
        }
        assert_eq!(h.contacts(), (0, 0));
    }

    #[test]
    fn test_score_ranges_reject_bad_bounds() {
        let h = Harness::new();
        for bad in ["abc", "nan"] {
            for args in [
                ["ZCOUNT", "z", bad, "1"],
                ["ZCOUNT", "z", "0", bad],
                ["ZRANGEBYSCORE", "z", bad, "1"],
                ["ZRANGEBYSCORE", "z", "0", bad],
                ["ZREMRANGEBYSCORE", "z", bad, "1"],
                ["ZREMRANGEBYSCORE", "z", "0", bad],
            ] {
                assert_eq!(
                    h.run(&args),
                    Reply::error(CommandError::InvalidFloat.to_string()),
                    "{:?}",
                    args
                );
            }
        }
        assert_eq!(h.contacts(), (0, 0));
    }

    #[test]
    fn test_zrangebyscore() {
        let h = leaderboard();
        assert_eq!(
            h.run(&["ZRANGEBYSCORE", "board", "5", "7.5"]),
            bulk(&[Some("bob"), Some("carol")])
        );
        assert_eq!(
            h.run(&["ZRANGEBYSCORE", "board", "-inf", "+inf", "withscores"]),
            bulk(&[
                Some("bob"),
                Some("5"),
                Some("carol"),
                Some("7.5"),
                Some("alice"),
                Some("10"),
            ])
        );
    }

    #[test]
    fn test_zcount_and_removal() {
        let h = leaderboard();
        assert_eq!(h.run(&["ZCOUNT", "board", "5", "10"]), Reply::Integer(3));
        assert_eq!(h.run(&["ZCOUNT", "board", "6", "8"]), Reply::Integer(1));
        assert_eq!(
            h.run(&["ZREMRANGEBYSCORE", "board", "-inf", "7.5"]),
            Reply::Integer(2)
        );
        assert_eq!(h.run(&["ZREM", "board", "alice"]), Reply::Integer(1));
        assert_eq!(h.run(&["ZREM", "board", "alice"]), Reply::Integer(0));
        assert_eq!(h.run(&["ZCARD", "board"]), Reply::Integer(0));
    }
}
