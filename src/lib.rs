//! Purpose: Schema-less bridge between JSON, XML, query strings and one dynamic `Value` model.
//! Exports: `core` (value model, coercion, errors), `json`, `xml`, `query`, `facade`, and
//! crate-root convenience functions over a default `serde_json` engine.
//! Role: Library crate; every function is synchronous, stateless and reentrant.
//! Invariants: Fallible functions return `Result<_, Error>`; `*_no_error` functions never fail.
//! Invariants: The no-error tier adapts the fallible tier through `facade::or_default`.
//! Notes: Use `json::JsonBridge::new` to run the same operations over another engine.
use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod core;
pub mod facade;
pub mod json;
pub mod query;
pub mod xml;

pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::scalar::coerce_scalar;
pub use crate::core::value::{Mapping, Value};
pub use crate::json::{Decoder, Encoder, JsonBridge, JsonEngine, SerdeJsonEngine, SimdJsonEngine};
pub use crate::query::{QueryOptions, parse_query_string, parse_query_string_with};
pub use crate::xml::XmlOptions;

use crate::facade::or_default;

fn bridge() -> JsonBridge {
    JsonBridge::new(SerdeJsonEngine)
}

pub fn marshal<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    bridge().marshal(value)
}

pub fn unmarshal<T: DeserializeOwned>(input: &[u8]) -> Result<T, Error> {
    bridge().unmarshal(input)
}

pub fn marshal_indent<T: Serialize + ?Sized>(
    value: &T,
    prefix: &str,
    indent: &str,
) -> Result<Vec<u8>, Error> {
    bridge().marshal_indent(value, prefix, indent)
}

pub fn new_decoder<R: Read>(reader: R) -> Decoder<R> {
    Decoder::new(reader)
}

pub fn new_encoder<W: Write>(writer: W) -> Encoder<W> {
    Encoder::new(writer)
}

/// Encodes any serializable value; structs keep their declared field order.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    bridge().encode(value)
}

pub fn marshal_to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    bridge().encode(value)
}

/// Decodes a JSON object; every number becomes `Value::Number(f64)`.
pub fn json_decode(text: &str) -> Result<Mapping, Error> {
    bridge().decode(text)
}

pub fn json_decode_no_error(text: &str) -> Mapping {
    or_default("json_decode", json_decode(text))
}

/// Encodes a mapping with keys in lexicographic order.
pub fn json_encode(map: &Mapping) -> Result<String, Error> {
    bridge().encode_mapping(map)
}

pub fn json_encode_no_error(map: &Mapping) -> String {
    or_default("json_encode", json_encode(map))
}

/// Decodes a JSON array of strings, or returns an empty `Vec`.
pub fn json_decodes_no_error(text: &str) -> Vec<String> {
    or_default("json_decodes", bridge().decode_strings(text))
}

pub fn is_valid_json(text: &str) -> bool {
    bridge().is_valid(text)
}

/// Decodes XML into a `Value`, or `Value::Null` when the document is unusable.
pub fn xml_decode_no_error(input: &[u8]) -> Value {
    or_default("xml_decode", xml::decode(input, &XmlOptions::default()))
}

/// Encodes a `Value` as XML, or returns empty bytes when it cannot be written.
pub fn xml_encode_no_error(value: &Value) -> Vec<u8> {
    or_default("xml_encode", xml::encode(value, &XmlOptions::default()))
}
