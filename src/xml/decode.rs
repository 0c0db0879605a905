//! Purpose: Walk an XML document and build the generic `Value` tree.
//! Exports: `decode`.
//! Role: Event-driven converter over `quick-xml` with an explicit frame stack (no recursion).
//! Invariants: A leaf's text run is trimmed once at its outer ends; CDATA content is kept verbatim.
//! Invariants: Repeated sibling tags collapse into an `Array` in encounter order.
//! Invariants: The root element's value is returned; its tag name is not a key.
use std::collections::btree_map::Entry;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};
use crate::xml::{XmlOptions, depth_error};

struct Frame {
    name: String,
    children: Mapping,
    has_children: bool,
    text: String,
    /// Byte range of `text` from the first CDATA start to the last CDATA end.
    verbatim: Option<(usize, usize)>,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Mapping::new(),
            has_children: false,
            text: String::new(),
            verbatim: None,
        }
    }

    fn push_cdata(&mut self, content: &str) {
        let at = self.text.len();
        self.text.push_str(content);
        let lo = self.verbatim.map_or(at, |(lo, _)| lo);
        self.verbatim = Some((lo, self.text.len()));
    }

    fn leaf_text(&self) -> String {
        match self.verbatim {
            None => self.text.trim().to_string(),
            Some((lo, hi)) => {
                let mut out = self.text[..lo].trim_start().to_string();
                out.push_str(&self.text[lo..hi]);
                out.push_str(self.text[hi..].trim_end());
                out
            }
        }
    }

    fn into_value(self) -> Value {
        if self.has_children {
            return Value::Object(self.children);
        }
        let text = self.leaf_text();
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text)
        }
    }
}

pub fn decode(input: &[u8], options: &XmlOptions) -> Result<Value, Error> {
    let mut reader = Reader::from_reader(input);
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message(format!("malformed xml: {err}"))
                .with_offset(reader.buffer_position() as u64)
                .with_source(err)
        })?;

        match event {
            Event::Start(start) => {
                if stack.len() >= options.max_depth {
                    return Err(depth_error(ErrorKind::Decode, options.max_depth));
                }
                stack.push(Frame::new(element_name(start.name().as_ref())?));
            }
            Event::Empty(start) => {
                if stack.len() >= options.max_depth {
                    return Err(depth_error(ErrorKind::Decode, options.max_depth));
                }
                let frame = Frame::new(element_name(start.name().as_ref())?);
                if let Some(root) = close(&mut stack, frame) {
                    return Ok(root);
                }
            }
            Event::End(end) => {
                let name = element_name(end.name().as_ref())?;
                let frame = match stack.pop() {
                    Some(frame) if frame.name == name => frame,
                    _ => {
                        return Err(Error::new(ErrorKind::Decode)
                            .with_message(format!("unexpected closing tag </{name}>"))
                            .with_offset(reader.buffer_position() as u64));
                    }
                };
                if let Some(root) = close(&mut stack, frame) {
                    return Ok(root);
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|err| {
                        Error::new(ErrorKind::Decode)
                            .with_message(format!("invalid xml text: {err}"))
                            .with_offset(reader.buffer_position() as u64)
                            .with_source(err)
                    })?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some(frame) = stack.last_mut() {
                    let content = std::str::from_utf8(&cdata).map_err(|err| {
                        Error::new(ErrorKind::Decode)
                            .with_message("cdata is not valid utf-8")
                            .with_source(err)
                    })?;
                    frame.push_cdata(content);
                }
            }
            Event::Eof => {
                let message = if stack.is_empty() {
                    "xml document has no root element"
                } else {
                    "xml document ended inside an element"
                };
                return Err(Error::new(ErrorKind::Decode)
                    .with_message(message)
                    .with_hint("parse category: eof; context: xml"));
            }
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }
}

/// Folds a finished element into its parent, or returns it when it was the root.
fn close(stack: &mut Vec<Frame>, frame: Frame) -> Option<Value> {
    let Some(parent) = stack.last_mut() else {
        return Some(frame.into_value());
    };
    parent.has_children = true;
    let name = frame.name.clone();
    let value = frame.into_value();
    match parent.children.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        // Element values are never arrays themselves, so an array here is a prior collapse.
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(items) => items.push(value),
            existing => {
                let first = std::mem::take(existing);
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
    None
}

fn element_name(raw: &[u8]) -> Result<String, Error> {
    std::str::from_utf8(raw).map(str::to_string).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("xml element name is not valid utf-8")
            .with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;
    use crate::xml::XmlOptions;

    fn decode_str(input: &str) -> Value {
        decode(input.as_bytes(), &XmlOptions::default()).expect("decode")
    }

    #[test]
    fn cdata_is_unwrapped_and_whitespace_dropped() {
        let value = decode_str(
            "<xml>    <AppId><![CDATA[wxe2c]]></AppId>    <Encrypt><![CDATA[yqBRLWH/QXHA==]]></Encrypt></xml>",
        );
        assert_eq!(
            value,
            Value::from_iter([("AppId", "wxe2c"), ("Encrypt", "yqBRLWH/QXHA==")])
        );
    }

    #[test]
    fn repeated_tags_collapse_in_order() {
        let value = decode_str("<root><item>a</item><other>x</other><item>b</item><item>c</item></root>");
        assert_eq!(
            value.get("item"),
            Some(&Value::Array(vec![
                Value::from("a"),
                Value::from("b"),
                Value::from("c"),
            ]))
        );
        assert_eq!(value.get("other"), Some(&Value::from("x")));
    }

    #[test]
    fn nested_elements_become_objects() {
        let value = decode_str(
            r#"<?xml version="1.0"?><root id="1"><!-- c --><user><name>Ann &amp; Bo</name><tags/></user></root>"#,
        );
        let user = value.get("user").expect("user");
        assert_eq!(user.get("name"), Some(&Value::from("Ann & Bo")));
        assert_eq!(user.get("tags"), Some(&Value::Null));
    }

    #[test]
    fn leaf_root_returns_its_text() {
        assert_eq!(decode_str("<xml> hi </xml>"), Value::from("hi"));
        assert_eq!(decode_str("<xml></xml>"), Value::Null);
        assert_eq!(decode_str("<xml/>"), Value::Null);
    }

    #[test]
    fn adjacent_cdata_sections_concatenate() {
        let value = decode_str("<xml><k><![CDATA[a]]]]><![CDATA[>b]]></k></xml>");
        assert_eq!(value.get("k"), Some(&Value::from("a]]>b")));
    }

    #[test]
    fn text_split_by_comment_keeps_inner_whitespace() {
        let value = decode_str("<xml><k>Hello <!-- c --> world</k></xml>");
        assert_eq!(value.get("k"), Some(&Value::from("Hello  world")));
        let value = decode_str("<xml><k>  a<?pi x?>b  </k></xml>");
        assert_eq!(value.get("k"), Some(&Value::from("ab")));
    }

    #[test]
    fn cdata_edges_survive_outer_trim() {
        let value = decode_str("<xml><k>\n  <![CDATA[ padded ]]>\n</k></xml>");
        assert_eq!(value.get("k"), Some(&Value::from(" padded ")));
        let value = decode_str("<xml><k> x <![CDATA[y]]> z </k></xml>");
        assert_eq!(value.get("k"), Some(&Value::from("x y z")));
    }

    #[test]
    fn text_mixed_with_children_is_dropped() {
        let value = decode_str("<xml><k>a<x/>b</k></xml>");
        assert_eq!(
            value,
            Value::from_iter([("k", Value::from_iter([("x", Value::Null)]))])
        );
    }

    #[test]
    fn malformed_documents_fail() {
        for input in ["", "just text", "<a><b></a>", "<a><b>x</b>"] {
            let err = decode(input.as_bytes(), &XmlOptions::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode, "{input:?}");
        }
    }

    #[test]
    fn depth_limit_fails_closed() {
        let options = XmlOptions::default().with_max_depth(3);
        assert!(decode(b"<a><b><c>x</c></b></a>", &options).is_ok());
        let err = decode(b"<a><b><c><d>x</d></c></b></a>", &options).unwrap_err();
        assert!(err.to_string().contains("max depth 3"));
    }
}
