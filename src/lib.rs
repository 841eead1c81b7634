//! A CBOR (RFC 7049) codec with a JSON bridge and JSON pointers over encoded documents.
//!
//! - [`encode`] and [`decode`] convert between [`Value`]s and bytes.
//! - [`parse_json`] writes CBOR straight from JSON text, and [`to_json`] goes back.
//! - [`from_json_pointer`] turns a JSON pointer into a CBOR pointer, which [`get`], [`set`], [`del`]
//!   and [`prepend`] use to work on encoded documents without decoding them.
//!
//! Scanner and encoder behaviour is controlled by a [`Config`].

mod config;
mod decode;
mod encode;
mod errors;
mod json;
mod pointer;
mod read_ints;
mod sink;
mod tags;
mod text;
mod value;
mod wire;

pub use config::{new_config, Config, ContainerKind, NumberKind, SpaceKind};
pub use decode::{decode, MAX_DEPTH};
pub use encode::{encode, encode_simple_type, encode_small_int, encode_to_vec, encode_undefined};
pub use errors::{DecodeError, EncodeError, JsonError, PointerError};
pub use json::{parse_json, parse_json_to_vec, to_json, to_json_string};
pub use pointer::{
	del, from_json_pointer, from_json_pointer_to_vec, get, items_end, prepend, set, to_json_pointer,
	MAX_SEGMENT_LEN,
};
pub use tags::{
	TAG_BIG_FLOAT, TAG_CBOR_ENC, TAG_CBOR_PREFIX, TAG_DATE_TIME, TAG_DECIMAL_FRACTION, TAG_EPOCH,
	TAG_JSON_STRING, TAG_NEG_BIGNUM, TAG_POS_BIGNUM, TAG_REGEXP,
};
pub use text::{bytes_as_str, str_as_bytes};
pub use value::{Fraction, Value};
pub use wire::{is_indefinite_array, is_indefinite_bytes, is_indefinite_map, is_indefinite_text};
