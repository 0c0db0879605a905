//! Purpose: Read and write sequences of JSON values over byte streams.
//! Exports: `Decoder`, `Encoder`.
//! Role: Engine-agnostic stream wrappers; values are framed here and parsed by the engine.
//! Invariants: The framer is string/escape aware, so brackets inside strings never split values.
//! Invariants: Framing resumes where the previous read stopped; each byte is scanned once.
//! Invariants: Encoded values are newline-terminated (JSON Lines).
//! Invariants: End of stream surfaces as `ErrorKind::Eof`; truncated values as `ErrorKind::Decode`.
use std::io::{ErrorKind as IoErrorKind, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::{Error, ErrorKind};
use crate::json::engine::{JsonEngine, SerdeJsonEngine};
use crate::json::indent::indent;

const READ_CHUNK: usize = 8 * 1024;

pub struct Decoder<R, E = SerdeJsonEngine> {
    reader: R,
    engine: E,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    framer: Framer,
}

#[derive(Debug, Eq, PartialEq)]
enum Scan {
    Empty,
    Partial,
    Complete { start: usize, end: usize },
}

/// Scanner state for the value being framed, kept across reads.
///
/// Offsets are relative to the decoder's unconsumed input, which only moves
/// once a value completes (and the framer resets).
#[derive(Debug, Default)]
struct Framer {
    start: Option<usize>,
    cursor: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl<R: Read> Decoder<R, SerdeJsonEngine> {
    pub fn new(reader: R) -> Self {
        Self::with_engine(reader, SerdeJsonEngine)
    }
}

impl<R: Read, E: JsonEngine> Decoder<R, E> {
    pub fn with_engine(reader: R, engine: E) -> Self {
        Self {
            reader,
            engine,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            framer: Framer::default(),
        }
    }

    /// Decodes the next value in the stream.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let (start, end) = self.next_span()?.ok_or_else(|| {
            Error::new(ErrorKind::Eof).with_message("no more json values in stream")
        })?;
        let result = self.engine.unmarshal(&self.buf[start..end]);
        self.pos = end;
        self.compact();
        result
    }

    /// Reports whether another value follows, reading ahead if needed.
    pub fn more(&mut self) -> Result<bool, Error> {
        loop {
            let pending = &self.buf[self.pos..];
            if pending.iter().any(|b| !b.is_ascii_whitespace()) {
                return Ok(true);
            }
            if self.eof {
                return Ok(false);
            }
            self.fill()?;
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_span(&mut self) -> Result<Option<(usize, usize)>, Error> {
        loop {
            match self.framer.scan(&self.buf[self.pos..], self.eof) {
                Scan::Complete { start, end } => {
                    return Ok(Some((self.pos + start, self.pos + end)));
                }
                Scan::Empty if self.eof => return Ok(None),
                Scan::Empty | Scan::Partial => self.fill()?,
            }
        }
    }

    fn fill(&mut self) -> Result<(), Error> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::from(err)),
            }
        }
    }

    fn compact(&mut self) {
        if self.pos > READ_CHUNK && self.pos * 2 > self.buf.len() {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }
}

impl Framer {
    /// Locates the next complete top-level value in `buf`.
    ///
    /// A value cut off by end of stream is reported as complete so the engine
    /// produces the truncation error.
    fn scan(&mut self, buf: &[u8], at_eof: bool) -> Scan {
        let start = match self.start {
            Some(start) => start,
            None => {
                let Some(offset) = buf[self.cursor..]
                    .iter()
                    .position(|b| !b.is_ascii_whitespace())
                else {
                    self.cursor = buf.len();
                    return Scan::Empty;
                };
                self.cursor += offset;
                self.start = Some(self.cursor);
                self.cursor
            }
        };

        let end = match buf[start] {
            b'{' | b'[' | b'"' => self.advance(buf),
            _ => self.scalar_end(buf, start),
        };
        match end {
            Some(end) => {
                *self = Self::default();
                Scan::Complete { start, end }
            }
            None if at_eof => {
                *self = Self::default();
                Scan::Complete {
                    start,
                    end: buf.len(),
                }
            }
            None => Scan::Partial,
        }
    }

    /// Walks containers and strings from `cursor`; returns the end once depth closes.
    fn advance(&mut self, buf: &[u8]) -> Option<usize> {
        while let Some(&b) = buf.get(self.cursor) {
            self.cursor += 1;
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Some(self.cursor);
                    }
                }
                continue;
            }
            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(self.cursor);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn scalar_end(&mut self, buf: &[u8], start: usize) -> Option<usize> {
        let offset = buf[self.cursor..]
            .iter()
            .position(|b| b.is_ascii_whitespace() || b"{}[]\",".contains(b));
        match offset {
            // A lone delimiter is framed as itself so the engine rejects it.
            Some(offset) => Some((self.cursor + offset).max(start + 1)),
            None => {
                self.cursor = buf.len();
                None
            }
        }
    }
}

pub struct Encoder<W, E = SerdeJsonEngine> {
    writer: W,
    engine: E,
    indent: Option<(String, String)>,
}

impl<W: Write> Encoder<W, SerdeJsonEngine> {
    pub fn new(writer: W) -> Self {
        Self::with_engine(writer, SerdeJsonEngine)
    }
}

impl<W: Write, E: JsonEngine> Encoder<W, E> {
    pub fn with_engine(writer: W, engine: E) -> Self {
        Self {
            writer,
            engine,
            indent: None,
        }
    }

    /// Switches subsequent values to indented output.
    pub fn set_indent(&mut self, prefix: impl Into<String>, indent: impl Into<String>) {
        self.indent = Some((prefix.into(), indent.into()));
    }

    /// Writes `value` followed by a newline.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let mut bytes = self.engine.marshal(value)?;
        if let Some((prefix, unit)) = &self.indent {
            bytes = indent(&bytes, prefix, unit);
        }
        bytes.push(b'\n');
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, Encoder, Framer, Scan};
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;
    use std::io::{self, Cursor, Read};

    fn scan_value(buf: &[u8], at_eof: bool) -> Scan {
        Framer::default().scan(buf, at_eof)
    }

    /// Hands out one byte per read to exercise partial framing.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.split_first() {
                Some((first, rest)) if !buf.is_empty() => {
                    buf[0] = *first;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn scan_frames_containers_and_scalars() {
        assert_eq!(
            scan_value(br#"  {"a":"}"} 1"#, false),
            Scan::Complete { start: 2, end: 11 }
        );
        assert_eq!(scan_value(b"12 ", false), Scan::Complete { start: 0, end: 2 });
        assert_eq!(scan_value(b"12", false), Scan::Partial);
        assert_eq!(scan_value(b"12", true), Scan::Complete { start: 0, end: 2 });
        assert_eq!(scan_value(b" \n ", true), Scan::Empty);
        assert_eq!(scan_value(br#""a\"b"x"#, false), Scan::Complete { start: 0, end: 6 });
    }

    /// Yields its bytes, then fails every later read.
    struct Broken<'a>(&'a [u8]);

    impl Read for Broken<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reader failed"));
            }
            let n = self.0.len().min(buf.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn framer_resumes_without_rescanning() {
        let mut framer = Framer::default();
        let head = br#"  {"a":"}"#;
        assert_eq!(framer.scan(head, false), Scan::Partial);
        assert_eq!(framer.cursor, head.len());
        assert!(framer.in_string);

        let full = br#"  {"a":"}"} 1"#;
        assert_eq!(framer.scan(full, false), Scan::Complete { start: 2, end: 11 });
        assert_eq!(framer.cursor, 0);

        let mut framer = Framer::default();
        assert_eq!(framer.scan(b" 12", false), Scan::Partial);
        assert_eq!(framer.scan(b" 123 ", false), Scan::Complete { start: 1, end: 4 });
    }

    #[test]
    fn reader_failures_surface_as_io_errors() {
        let mut decoder = Decoder::new(Broken(b""));
        assert_eq!(decoder.decode::<Value>().unwrap_err().kind(), ErrorKind::Io);

        let mut decoder = Decoder::new(Broken(b" "));
        assert_eq!(decoder.more().unwrap_err().kind(), ErrorKind::Io);

        let mut decoder = Decoder::new(Broken(br#"{"a":"#));
        let err = decoder.decode::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("reader failed"));
    }

    #[test]
    fn decoder_reads_concatenated_values_then_eof() {
        let input = br#"{"Name":"Charlie","Age":40} [1,2] "s" null 7"#;
        let mut decoder = Decoder::new(Cursor::new(&input[..]));

        let first: Value = decoder.decode().expect("first");
        assert_eq!(first.get("Age"), Some(&Value::Number(40.0)));
        let second: Vec<u8> = decoder.decode().expect("second");
        assert_eq!(second, vec![1, 2]);
        let third: String = decoder.decode().expect("third");
        assert_eq!(third, "s");
        let fourth: Value = decoder.decode().expect("fourth");
        assert!(fourth.is_null());
        assert!(decoder.more().expect("more"));
        let fifth: f64 = decoder.decode().expect("fifth");
        assert_eq!(fifth, 7.0);

        assert!(!decoder.more().expect("more"));
        let err = decoder.decode::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eof);
    }

    #[test]
    fn decoder_handles_one_byte_reads() {
        let input = br#"{"k":["]",{"x":1}]}"#;
        let mut decoder = Decoder::new(Trickle(input));
        let value: Value = decoder.decode().expect("value");
        assert_eq!(value.to_string(), r#"{"k":["]",{"x":1}]}"#);
    }

    #[test]
    fn truncated_value_is_decode_error() {
        let mut decoder = Decoder::new(Cursor::new(&br#"{"a":[1,2"#[..]));
        let err = decoder.decode::<Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn encoder_writes_newline_terminated_values() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode(&Value::from(1)).expect("encode");
        encoder.encode("two").expect("encode");
        assert_eq!(encoder.into_inner(), b"1\n\"two\"\n".to_vec());
    }

    #[test]
    fn encoder_indents_when_configured() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.set_indent("", "  ");
        encoder.encode(&vec![1, 2]).expect("encode");
        let text = String::from_utf8(encoder.into_inner()).expect("utf8");
        assert_eq!(text, "[\n  1,\n  2\n]\n");
    }
}
