//! JSON pointers over encoded documents.
//!
//! Pointers are first converted to their CBOR form with [`from_json_pointer`],
//! then used to read and rewrite documents in place with [`get`], [`set`], [`del`] and [`prepend`].
//!
//! Array reference tokens accept `-` and `-1` as the last element, in addition to non-negative indices.

mod engine;
mod transcode;

pub use engine::{del, get, items_end, prepend, set};
pub use transcode::{from_json_pointer, from_json_pointer_to_vec, to_json_pointer, MAX_SEGMENT_LEN};
