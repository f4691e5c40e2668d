//! Request body handling for track writes
//!
//! Two steps run before anything reaches the persistence layer:
//! 1. Presence: every required key must hold a truthy value. `null`, `false`,
//!    `0` and `""` count as missing, so `duration: 0` stops here rather than
//!    at the duration rule.
//! 2. Coercion: `duration` and `releaseYear` are read as leading integers;
//!    anything unreadable is passed on as "not an integer" for validation to
//!    reject.

use mlib_common::NewTrack;
use serde_json::Value;

pub const REQUIRED_FIELDS: [&str; 6] = [
    "songTitle",
    "artistName",
    "albumName",
    "genre",
    "duration",
    "releaseYear",
];

/// Build a [`NewTrack`] from a JSON body, or list the fields that are missing
pub fn parse_track_body(body: &Value) -> Result<NewTrack, Vec<&'static str>> {
    let missing = missing_fields(body);
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(NewTrack {
        song_title: body.get("songTitle").and_then(coerce_text),
        artist_name: body.get("artistName").and_then(coerce_text),
        album_name: body.get("albumName").and_then(coerce_text),
        genre: body.get("genre").and_then(coerce_text),
        duration: body.get("duration").and_then(coerce_integer),
        release_year: body.get("releaseYear").and_then(coerce_integer),
    })
}

/// Required fields that are absent or falsy. A non-object body misses all of them.
pub fn missing_fields(body: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| body.get(field).map_or(true, is_falsy))
        .collect()
}

pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// 2^63: floats at or beyond this magnitude have no `i64` counterpart
const I64_FLOAT_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Read a value as an integer the lenient way: numbers truncate toward
/// zero, strings parse their leading `[+-]digits` after leading whitespace.
///
/// Values outside the `i64` range are not integers, whether given as a
/// number (`1e300`) or as digits too long to fit.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .map(f64::trunc)
                .filter(|f| (-I64_FLOAT_BOUND..I64_FLOAT_BOUND).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => parse_leading_integer(s),
        _ => None,
    }
}

fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;

    Some(if negative { -magnitude } else { magnitude })
}

/// Strings pass through; numbers and booleans keep their JSON text
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
