//! Purpose: Turn a raw textual token into the most specific scalar `Value`.
//! Exports: `coerce_scalar`, `is_decimal_number`.
//! Role: Leaf helper used by the query-string mapper when number coercion is on.
//! Invariants: Only strict decimal grammar becomes a Number; everything else stays a String.
//! Invariants: Tokens that would lose precision as `f64` (leading zeros, >2^53 integers) stay Strings.
use crate::core::value::{MAX_SAFE_INTEGER, Value};

pub fn coerce_scalar(token: &str) -> Value {
    if !is_decimal_number(token) {
        return Value::String(token.to_string());
    }
    match token.parse::<f64>() {
        Ok(n) if n.is_finite() && !loses_integer_precision(token, n) => Value::Number(n),
        _ => Value::String(token.to_string()),
    }
}

/// Matches `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
pub fn is_decimal_number(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'-') {
        pos += 1;
    }
    match bytes.get(pos) {
        Some(b'0') => pos += 1,
        Some(b'1'..=b'9') => pos += count_digits(&bytes[pos..]),
        _ => return false,
    }
    if bytes.get(pos) == Some(&b'.') {
        let digits = count_digits(&bytes[pos + 1..]);
        if digits == 0 {
            return false;
        }
        pos += 1 + digits;
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let digits = count_digits(&bytes[pos..]);
        if digits == 0 {
            return false;
        }
        pos += digits;
    }
    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn loses_integer_precision(token: &str, n: f64) -> bool {
    let integral_text = !token.contains(['.', 'e', 'E']);
    integral_text && n.abs() > MAX_SAFE_INTEGER
}
