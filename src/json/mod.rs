//! Purpose: JSON boundary: engine contract, bridge, streams, indentation, diagnostics.
//! Exports: `JsonEngine`, `SerdeJsonEngine`, `SimdJsonEngine`, `JsonBridge`, `Decoder`, `Encoder`, `indent`.
//! Role: Single seam for JSON grammar so callsites never reach for an engine directly.
//! Invariants: All JSON decoding in the crate goes through a `JsonEngine`.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

mod bridge;
mod engine;
mod indent;
pub(crate) mod parse;
mod stream;

pub use bridge::JsonBridge;
pub use engine::{JsonEngine, SerdeJsonEngine, SimdJsonEngine};
pub use indent::indent;
pub use stream::{Decoder, Encoder};
