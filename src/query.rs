//! Purpose: Parse URL-encoded query strings into a `Mapping`.
//! Exports: `QueryOptions`, `parse_query_string`, `parse_query_string_with`.
//! Role: Best-effort leaf parser; there is no error path.
//! Invariants: Empty segments, segments without `=`, and empty keys are skipped.
//! Invariants: Repeated keys collapse into an `Array` in encounter order; nothing is dropped.
//! Invariants: Values stay Strings unless `coerce_numbers` is enabled.
use std::collections::btree_map::Entry;

use url::form_urlencoded;

use crate::core::scalar::coerce_scalar;
use crate::core::value::{Mapping, Value};

#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    pub coerce_numbers: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coerce_numbers(mut self, coerce_numbers: bool) -> Self {
        self.coerce_numbers = coerce_numbers;
        self
    }
}

pub fn parse_query_string(query: &str) -> Mapping {
    parse_query_string_with(query, &QueryOptions::default())
}

pub fn parse_query_string_with(query: &str, options: &QueryOptions) -> Mapping {
    let mut out = Mapping::new();
    for segment in query.split('&') {
        if !segment.contains('=') {
            if !segment.is_empty() {
                tracing::trace!(segment, "skipping query segment without '='");
            }
            continue;
        }
        // A single `k=v` segment decodes to exactly one pair.
        let Some((key, raw)) = form_urlencoded::parse(segment.as_bytes()).next() else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let value = if options.coerce_numbers {
            coerce_scalar(&raw)
        } else {
            Value::String(raw.into_owned())
        };
        insert_collapsing(&mut out, key.into_owned(), value);
    }
    out
}

fn insert_collapsing(map: &mut Mapping, key: String, value: Value) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(items) => items.push(value),
            existing => {
                let first = std::mem::take(existing);
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}
