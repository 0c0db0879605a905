//! Purpose: Bridge JSON text and the generic `Value` model over an injected engine.
//! Exports: `JsonBridge`.
//! Role: Fallible tier of the JSON API; the crate-root functions wrap a default bridge.
//! Invariants: `decode` only accepts a top-level object; anything else is a decode error.
//! Invariants: Mapping encodes in key order; structs encode in declared field order.
//! Invariants: Numbers come back as `Value::Number(f64)` regardless of the engine.
use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};
use crate::json::engine::{JsonEngine, SerdeJsonEngine};
use crate::json::indent::indent;
use crate::json::stream::{Decoder, Encoder};

#[derive(Clone, Debug, Default)]
pub struct JsonBridge<E = SerdeJsonEngine> {
    engine: E,
}

impl<E: JsonEngine> JsonBridge<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        self.engine.marshal(value)
    }

    pub fn unmarshal<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, Error> {
        self.engine.unmarshal(input)
    }

    pub fn marshal_indent<T: Serialize + ?Sized>(
        &self,
        value: &T,
        prefix: &str,
        unit: &str,
    ) -> Result<Vec<u8>, Error> {
        let compact = self.engine.marshal(value)?;
        Ok(indent(&compact, prefix, unit))
    }

    pub fn new_decoder<R: Read>(&self, reader: R) -> Decoder<R, &E> {
        Decoder::with_engine(reader, &self.engine)
    }

    pub fn new_encoder<W: Write>(&self, writer: W) -> Encoder<W, &E> {
        Encoder::with_engine(writer, &self.engine)
    }

    /// Serializes any value to a JSON string.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, Error> {
        let bytes = self.engine.marshal(value)?;
        String::from_utf8(bytes).map_err(|err| {
            Error::new(ErrorKind::Encode)
                .with_message("engine produced invalid utf-8")
                .with_source(err)
        })
    }

    pub fn encode_mapping(&self, map: &Mapping) -> Result<String, Error> {
        self.encode(map)
    }

    /// Decodes a JSON object into a `Mapping`.
    pub fn decode(&self, text: &str) -> Result<Mapping, Error> {
        match self.engine.unmarshal::<Value>(text.as_bytes())? {
            Value::Object(map) => Ok(map),
            other => Err(Error::new(ErrorKind::Decode)
                .with_message(format!(
                    "expected a json object at top level, found {}",
                    other.kind_name()
                ))
                .with_hint(format!("parse category: shape; context: {}", self.engine.name()))),
        }
    }

    /// Decodes a JSON array of strings.
    pub fn decode_strings(&self, text: &str) -> Result<Vec<String>, Error> {
        self.engine.unmarshal(text.as_bytes())
    }

    pub fn is_valid(&self, text: &str) -> bool {
        self.engine.valid(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::JsonBridge;
    use crate::core::error::{Error, ErrorKind};
    use crate::core::value::{Mapping, Value};
    use crate::json::engine::JsonEngine;
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Refuses to encode and counts decode attempts.
    #[derive(Default)]
    struct FakeEngine {
        unmarshal_calls: AtomicUsize,
    }

    impl JsonEngine for FakeEngine {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn marshal<T: Serialize + ?Sized>(&self, _value: &T) -> Result<Vec<u8>, Error> {
            Err(Error::new(ErrorKind::Encode).with_message("fake engine cannot encode"))
        }

        fn unmarshal<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, Error> {
            self.unmarshal_calls.fetch_add(1, Ordering::Relaxed);
            serde_json::from_slice(input)
                .map_err(|err| Error::new(ErrorKind::Decode).with_source(err))
        }
    }

    #[test]
    fn injected_engine_is_used_for_every_operation() {
        let bridge = JsonBridge::new(FakeEngine::default());
        let map = bridge.decode(r#"{"a":1}"#).expect("decode");
        assert_eq!(map.get("a"), Some(&Value::Number(1.0)));
        assert!(bridge.is_valid("[]"));
        assert_eq!(bridge.engine().unmarshal_calls.load(Ordering::Relaxed), 2);

        let err = bridge.encode_mapping(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(err.message(), Some("fake engine cannot encode"));
    }

    #[test]
    fn non_object_top_level_is_shape_error() {
        let bridge: JsonBridge = JsonBridge::default();
        for text in ["[1,2]", "null", "\"s\"", "3"] {
            let err = bridge.decode(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode, "{text}");
            assert!(err.hint().unwrap_or_default().contains("shape"), "{text}");
        }
    }

    #[test]
    fn marshal_indent_uses_prefix_and_unit() {
        let bridge: JsonBridge = JsonBridge::default();
        let mut map = Mapping::new();
        map.insert("b".to_string(), Value::from(2));
        map.insert("a".to_string(), Value::from("x"));
        let bytes = bridge.marshal_indent(&map, "", "    ").expect("indent");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            "{\n    \"a\": \"x\",\n    \"b\": 2\n}"
        );
    }

    #[test]
    fn stream_helpers_share_the_bridge_engine() {
        let bridge = JsonBridge::new(FakeEngine::default());
        let mut decoder = bridge.new_decoder(&b"{} {}"[..]);
        decoder.decode::<Value>().expect("first");
        decoder.decode::<Value>().expect("second");
        assert_eq!(bridge.engine().unmarshal_calls.load(Ordering::Relaxed), 2);

        let mut encoder = bridge.new_encoder(Vec::new());
        assert!(encoder.encode(&1).is_err());
    }
}
