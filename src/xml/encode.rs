//! Purpose: Serialize the generic `Value` model back into XML.
//! Exports: `encode`.
//! Role: Inverse of `xml::decode`; output re-decodes to the same shape.
//! Invariants: Scalar text is always emitted as CDATA; a literal `]]>` is split across sections.
//! Invariants: Arrays repeat their key as sibling elements; mapping keys emit in sorted order.
//! Invariants: Keys that are not XML names are skipped rather than producing broken markup.
//! Invariants: An invalid configured root or item name fails the whole encode.
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, Event};

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Value, number_text};
use crate::xml::{XmlOptions, depth_error};

pub fn encode(value: &Value, options: &XmlOptions) -> Result<Vec<u8>, Error> {
    check_option_name("root_name", &options.root_name)?;
    check_option_name("item_name", &options.item_name)?;
    let mut out = XmlOut {
        writer: Writer::new(Vec::new()),
        options,
    };
    match value {
        Value::Array(_) => {
            out.start(&options.root_name)?;
            out.member(&options.item_name, value, 2)?;
            out.end(&options.root_name)?;
        }
        _ => out.element(&options.root_name, value, 1)?,
    }
    Ok(out.writer.into_inner())
}

struct XmlOut<'a> {
    writer: Writer<Vec<u8>>,
    options: &'a XmlOptions,
}

impl XmlOut<'_> {
    /// Writes `<name>value</name>` where `depth` is the element's nesting level.
    fn element(&mut self, name: &str, value: &Value, depth: usize) -> Result<(), Error> {
        if depth > self.options.max_depth {
            return Err(depth_error(ErrorKind::Encode, self.options.max_depth));
        }
        self.start(name)?;
        match value {
            Value::Null => {}
            Value::Bool(b) => self.cdata(if *b { "true" } else { "false" })?,
            Value::Number(n) => {
                if !n.is_finite() {
                    return Err(Error::new(ErrorKind::Encode)
                        .with_message(format!("non-finite number {n} under <{name}>")));
                }
                self.cdata(&number_text(*n))?;
            }
            Value::String(text) => self.cdata(text)?,
            Value::Array(items) => {
                let options = self.options;
                for item in items {
                    self.element(&options.item_name, item, depth + 1)?;
                }
            }
            Value::Object(map) => {
                for (key, child) in map {
                    self.member(key, child, depth + 1)?;
                }
            }
        }
        self.end(name)
    }

    /// Writes a mapping entry; arrays become repeated sibling elements.
    fn member(&mut self, key: &str, value: &Value, depth: usize) -> Result<(), Error> {
        if !is_xml_name(key) {
            tracing::debug!(key, "skipping key that is not a valid xml element name");
            return Ok(());
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    self.element(key, item, depth)?;
                }
                Ok(())
            }
            _ => self.element(key, value, depth),
        }
    }

    fn start(&mut self, name: &str) -> Result<(), Error> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(write_error)
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(write_error)
    }

    fn cdata(&mut self, text: &str) -> Result<(), Error> {
        let mut rest = text;
        while let Some(idx) = rest.find("]]>") {
            let (head, tail) = rest.split_at(idx + 2);
            self.write_cdata(head)?;
            rest = tail;
        }
        self.write_cdata(rest)
    }

    fn write_cdata(&mut self, text: &str) -> Result<(), Error> {
        self.writer
            .write_event(Event::CData(BytesCData::new(text)))
            .map_err(write_error)
    }
}

fn write_error<E>(err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::new(ErrorKind::Encode)
        .with_message(format!("failed to write xml: {err}"))
        .with_source(err)
}

fn check_option_name(field: &str, name: &str) -> Result<(), Error> {
    if is_xml_name(name) {
        return Ok(());
    }
    Err(Error::new(ErrorKind::Encode)
        .with_message(format!("xml option {field} {name:?} is not a valid element name")))
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
