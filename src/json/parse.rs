//! Purpose: Provide the simd-json decode entrypoint and parse-failure categorization.
//! Exports: `from_slice`, `ParseFailureCategory`, `categorize_error`, `categorize_message`, `hint_for_error`.
//! Role: Shared diagnostics seam so every engine reports failures with the same category labels.
//! Invariants: Input buffers are copied once to satisfy simd-json's mutable-slice API.
//! Invariants: Categorization looks at error text only; it never echoes the payload back.
//! Notes: Error mapping is done by callsites so domain context stays explicit.
#![allow(dead_code)]

use std::fmt;

use serde::de::DeserializeOwned;

pub(crate) fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, simd_json::Error> {
    let mut bytes = input.to_vec();
    simd_json::serde::from_slice(&mut bytes)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Eof,
    Shape,
    NumericRange,
    Utf8,
    DepthLimit,
    Unknown,
}

impl ParseFailureCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Eof => "eof",
            Self::Shape => "shape",
            Self::NumericRange => "numeric-range",
            Self::Utf8 => "utf8",
            Self::DepthLimit => "depth-limit",
            Self::Unknown => "unknown",
        }
    }
}

pub(crate) fn categorize_error<E: fmt::Display>(err: &E) -> ParseFailureCategory {
    categorize_message(&err.to_string())
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let message = message.to_ascii_lowercase();
    let has = |needle: &str| message.contains(needle);

    if has("recursion limit") || has("depth limit") || has("too deep") {
        ParseFailureCategory::DepthLimit
    } else if has("utf-8") || has("utf8") || has("unicode") {
        ParseFailureCategory::Utf8
    } else if has("invalid type") || has("expected a map") || has("expectedmap") {
        ParseFailureCategory::Shape
    } else if has("out of range") || has("number") {
        ParseFailureCategory::NumericRange
    } else if has("eof") || has("end of") {
        ParseFailureCategory::Eof
    } else if has("expected") || has("syntax") || has("trailing") || has("invalid") {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub(crate) fn hint_for_error<E: fmt::Display>(err: &E, context: &str) -> String {
    format!(
        "parse category: {}; context: {context}",
        categorize_error(err).label()
    )
}
