//! Typed parameter parsing.
//!
//! Parameters arrive as opaque bytes. These helpers turn the few that carry
//! numbers or flags into typed values, failing with the matching
//! [`CommandError`] before any partition is contacted.

use crate::error::CommandError;
use bytes::Bytes;

/// Parses a signed 64-bit integer parameter.
pub fn parse_i64(arg: &[u8]) -> Result<i64, CommandError> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(CommandError::InvalidInteger)
}

/// Parses a 64-bit float parameter.
///
/// `inf`, `+inf` and `-inf` are accepted in any case. NaN is rejected.
pub fn parse_f64(arg: &[u8]) -> Result<f64, CommandError> {
    let text = std::str::from_utf8(arg).map_err(|_| CommandError::InvalidFloat)?;
    let value = if text.eq_ignore_ascii_case("inf") || text.eq_ignore_ascii_case("+inf") {
        f64::INFINITY
    } else if text.eq_ignore_ascii_case("-inf") {
        f64::NEG_INFINITY
    } else {
        text.parse::<f64>().map_err(|_| CommandError::InvalidFloat)?
    };

    if value.is_nan() {
        return Err(CommandError::InvalidFloat);
    }
    Ok(value)
}

/// Parses a decrement and negates it.
///
/// `i64::MIN` has no positive counterpart and is reported as out of range.
pub fn parse_negated_i64(arg: &[u8]) -> Result<i64, CommandError> {
    parse_i64(arg)?
        .checked_neg()
        .ok_or(CommandError::InvalidInteger)
}

/// Checks the optional trailing `WITHSCORES` modifier.
pub fn parse_withscores(flag: Option<&Bytes>) -> Result<bool, CommandError> {
    match flag {
        None => Ok(false),
        Some(flag) if flag.eq_ignore_ascii_case(b"WITHSCORES") => Ok(true),
        Some(_) => Err(CommandError::InvalidOptionalFlagSyntax),
    }
}
