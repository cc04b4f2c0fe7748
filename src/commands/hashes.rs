//! Hash commands.
//!
//! Collection replies are flattened into a single bulk sequence:
//!
//! ```text
//! HGETALL user      -> [f1, v1, f2, v2, ...]         backend order
//! HMGET user a b    -> [a, value-or-nil, b, value-or-nil]   request order
//! ```

use crate::commands::args::parse_i64;
use crate::commands::CommandResult;
use crate::protocol::Reply;
use crate::router::Router;
use bytes::Bytes;

/// `HSET key field value`
pub fn handle_hset(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    let added = backend.hset(&args[0], args[1].clone(), args[2].clone())?;
    Ok(Reply::integer(added))
}

/// `HMSET key field value [field value ...]`
pub fn handle_hmset(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let pairs = args[1..]
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    let backend = router.resolve(&args[0])?;
    backend.hmset(&args[0], pairs)?;
    Ok(Reply::Ok)
}

/// `HGET key field`
pub fn handle_hget(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::optional(backend.hget(&args[0], &args[1])?))
}

/// `HGETALL key`
pub fn handle_hgetall(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    let pairs = backend.hgetall(&args[0])?;
    Ok(Reply::bulk(
        pairs.into_iter().flat_map(|(field, value)| [field, value]),
    ))
}

/// `HMGET key field [field ...]`
pub fn handle_hmget(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let fields = &args[1..];
    let backend = router.resolve(&args[0])?;
    let values = backend.hmget(&args[0], fields)?;

    let mut items = Vec::with_capacity(fields.len() * 2);
    for (field, value) in fields.iter().zip(values) {
        items.push(Some(field.clone()));
        items.push(value);
    }
    Ok(Reply::Bulk(items))
}

/// `HDEL key field`
pub fn handle_hdel(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.hdel(&args[0], &args[1])?))
}

/// `HLEN key`
pub fn handle_hlen(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::integer(backend.hlen(&args[0])?))
}

/// `HEXISTS key field`
pub fn handle_hexists(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    let exists = backend.hexists(&args[0], &args[1])?;
    Ok(Reply::integer(i64::from(exists)))
}

/// `HKEYS key`
pub fn handle_hkeys(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::bulk(backend.hkeys(&args[0])?))
}

/// `HVALS key`
pub fn handle_hvals(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::bulk(backend.hvals(&args[0])?))
}

/// `HINCRBY key field increment`
pub fn handle_hincrby(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let delta = parse_i64(&args[2])?;
    let backend = router.resolve(&args[0])?;
    let value = backend.hincr_by(&args[0], args[1].clone(), delta)?;
    Ok(Reply::integer(value))
}

#[cfg(test)]
mod tests {
    use crate::commands::testing::{bulk, text, Harness};
    use crate::error::CommandError;
    use crate::protocol::Reply;

    #[test]
    fn test_hset_hget() {
        let h = Harness::new();
        assert_eq!(h.run(&["HSET", "user", "name", "Ariz"]), Reply::Integer(1));
        assert_eq!(h.run(&["HSET", "user", "name", "Bob"]), Reply::Integer(0));
        assert_eq!(h.run(&["HGET", "user", "name"]), text("Bob"));
        assert_eq!(h.run(&["HGET", "user", "age"]), Reply::Nil);
        assert_eq!(h.run(&["HGET", "nobody", "name"]), Reply::Nil);
    }

    #[test]
    fn test_hmset_hmget_interleaves() {
        let h = Harness::new();
        assert_eq!(h.run(&["HMSET", "k", "f1", "v1", "f2", "v2"]), Reply::Ok);
        assert_eq!(h.contacts(), (1, 1));
        assert_eq!(
            h.run(&["HMGET", "k", "f1", "f3"]),
            bulk(&[Some("f1"), Some("v1"), Some("f3"), None])
        );
    }

    #[test]
    fn test_hmset_rejects_dangling_field() {
        let h = Harness::new();
        assert_eq!(
            h.run(&["HMSET", "k", "f1", "v1", "f2"]),
            Reply::error(CommandError::WrongArgumentCount("HMSET").to_string())
        );
        assert_eq!(h.contacts(), (0, 0));
    }

    #[test]
    fn test_hgetall_pairs() {
        let h = Harness::new();
        h.run(&["HMSET", "k", "a", "1", "b", "2"]);
        let Reply::Bulk(items) = h.run(&["HGETALL", "k"]) else {
            panic!("expected bulk reply");
        };
        assert_eq!(items.len(), 4);

        let mut pairs: Vec<_> = items
            .chunks(2)
            .map(|p| (p[0].clone().unwrap(), p[1].clone().unwrap()))
            .collect();
        pairs.sort();
        assert_eq!(pairs[0].0.as_ref(), b"a");
        assert_eq!(pairs[1].1.as_ref(), b"2");

        assert_eq!(h.run(&["HGETALL", "missing"]), Reply::Bulk(vec![]));
    }

    #[test]
    fn test_hdel_hlen_hexists() {
        let h = Harness::new();
        h.run(&["HMSET", "k", "a", "1", "b", "2"]);
        assert_eq!(h.run(&["HLEN", "k"]), Reply::Integer(2));
        assert_eq!(h.run(&["HEXISTS", "k", "a"]), Reply::Integer(1));
        assert_eq!(h.run(&["HDEL", "k", "a"]), Reply::Integer(1));
        assert_eq!(h.run(&["HDEL", "k", "a"]), Reply::Integer(0));
        assert_eq!(h.run(&["HEXISTS", "k", "a"]), Reply::Integer(0));
        assert_eq!(h.run(&["HLEN", "k"]), Reply::Integer(1));
    }

    #[test]
    fn test_hkeys_hvals() {
        let h = Harness::new();
        h.run(&["HSET", "k", "only", "value"]);
        assert_eq!(h.run(&["HKEYS", "k"]), bulk(&[Some("only")]));
        assert_eq!(h.run(&["HVALS", "k"]), bulk(&[Some("value")]));
    }

    #[test]
    fn test_hincrby() {
        let h = Harness::new();
        assert_eq!(h.run(&["HINCRBY", "k", "n", "5"]), Reply::Integer(5));
        assert_eq!(h.run(&["HINCRBY", "k", "n", "-2"]), Reply::Integer(3));

        let before = h.contacts();
        assert_eq!(
            h.run(&["HINCRBY", "k", "n", "x"]),
            Reply::error(CommandError::InvalidInteger.to_string())
        );
        assert_eq!(h.contacts(), before);
    }

    #[test]
    fn test_wrong_type_passes_through() {
        let h = Harness::new();
        h.run(&["SET", "plain", "v"]);
        assert_eq!(
            h.run(&["HGET", "plain", "f"]),
            Reply::error("WRONGTYPE Operation against a key holding the wrong kind of value")
        );
    }
}
