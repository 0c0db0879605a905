//! Purpose: Define the swappable JSON engine contract and the two bundled engines.
//! Exports: `JsonEngine`, `SerdeJsonEngine`, `SimdJsonEngine`.
//! Role: The only place that touches a concrete JSON grammar implementation.
//! Invariants: Engines are stateless, zero-sized, and safe to share across threads.
//! Invariants: Decode failures map to `ErrorKind::Decode` with a parse-category hint.
//! Invariants: Encode failures map to `ErrorKind::Encode`.
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::core::error::{Error, ErrorKind};
use crate::json::parse;

/// Marshal/unmarshal primitives the bridge is built on.
///
/// Stream decoding, stream encoding, and indentation are layered on top of
/// these two operations, so an engine only supplies the grammar.
pub trait JsonEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error>;

    fn unmarshal<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, Error>;

    /// Grammar check only; nothing is materialized.
    fn valid(&self, input: &[u8]) -> bool {
        self.unmarshal::<IgnoredAny>(input).is_ok()
    }
}

impl<E: JsonEngine + ?Sized> JsonEngine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        (**self).marshal(value)
    }

    fn unmarshal<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, Error> {
        (**self).unmarshal(input)
    }

    fn valid(&self, input: &[u8]) -> bool {
        (**self).valid(input)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeJsonEngine;

impl JsonEngine for SerdeJsonEngine {
    fn name(&self) -> &'static str {
        "serde_json"
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(value).map_err(|err| encode_error(self.name(), err))
    }

    fn unmarshal<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(input).map_err(|err| {
            let offset = byte_offset(input, err.line(), err.column());
            decode_error(self.name(), err).with_offset(offset)
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SimdJsonEngine;

impl JsonEngine for SimdJsonEngine {
    fn name(&self) -> &'static str {
        "simd-json"
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        simd_json::serde::to_vec(value).map_err(|err| encode_error(self.name(), err))
    }

    fn unmarshal<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, Error> {
        parse::from_slice(input).map_err(|err| decode_error(self.name(), err))
    }
}

fn decode_error<E>(engine: &str, err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::trace!(engine, error = %err, "json decode failed");
    let hint = parse::hint_for_error(&err, engine);
    Error::new(ErrorKind::Decode)
        .with_message("invalid json")
        .with_hint(hint)
        .with_source(err)
}

fn encode_error<E>(engine: &str, err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::trace!(engine, error = %err, "json encode failed");
    Error::new(ErrorKind::Encode)
        .with_message(format!("value is not representable as json: {err}"))
        .with_source(err)
}

/// Converts serde_json's 1-based line/column into a byte offset.
fn byte_offset(input: &[u8], line: usize, column: usize) -> u64 {
    if line == 0 {
        return 0;
    }
    let line_start = input
        .split_inclusive(|b| *b == b'\n')
        .take(line - 1)
        .map(<[u8]>::len)
        .sum::<usize>();
    (line_start + column.saturating_sub(1)) as u64
}
