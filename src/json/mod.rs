//! Translation between JSON text and CBOR.
//!
//! The scanner writes CBOR straight from the text, without building a [`Value`](crate::Value) first.
//! The emitter accepts the same shape of CBOR the scanner writes.

mod emit;
mod scan;

pub use emit::{to_json, to_json_string};
pub use scan::{parse_json, parse_json_to_vec};
