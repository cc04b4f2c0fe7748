//! String commands: GET, SET and the integer counters.

use crate::commands::args::{parse_i64, parse_negated_i64};
use crate::commands::CommandResult;
use crate::protocol::Reply;
use crate::router::Router;
use bytes::Bytes;

/// `GET key`
pub fn handle_get(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    Ok(Reply::optional(backend.get(&args[0])?))
}

/// `SET key value`
pub fn handle_set(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let backend = router.resolve(&args[0])?;
    backend.set(args[0].clone(), args[1].clone())?;
    Ok(Reply::Ok)
}

/// `INCR key`
pub fn handle_incr(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    incr_by(router, &args[0], 1)
}

/// `DECR key`
pub fn handle_decr(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    incr_by(router, &args[0], -1)
}

/// `INCRBY key increment`
pub fn handle_incrby(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let delta = parse_i64(&args[1])?;
    incr_by(router, &args[0], delta)
}

/// `DECRBY key decrement`
pub fn handle_decrby(router: &dyn Router, args: &[Bytes]) -> CommandResult {
    let delta = parse_negated_i64(&args[1])?;
    incr_by(router, &args[0], delta)
}

fn incr_by(router: &dyn Router, key: &[u8], delta: i64) -> CommandResult {
    let backend = router.resolve(key)?;
    Ok(Reply::integer(backend.incr_by(key, delta)?))
}
