//! Header byte layout and integer arguments.
//!
//! Every CBOR data item starts with a header byte holding the major type in its three high bits
//! and the additional info in its five low bits.
//! Major type constants here are pre-shifted, so `header(MAJOR_TEXT, 3)` is `0x63`.

use crate::{
	errors::{DecodeError, EncodeError},
	read_ints::{read_be_u16, read_be_u32, read_be_u64},
	sink::Sink,
};

pub const MAJOR_UNSIGNED: u8 = 0 << 5;
pub const MAJOR_NEGATIVE: u8 = 1 << 5;
pub const MAJOR_BYTES: u8 = 2 << 5;
pub const MAJOR_TEXT: u8 = 3 << 5;
pub const MAJOR_ARRAY: u8 = 4 << 5;
pub const MAJOR_MAP: u8 = 5 << 5;
pub const MAJOR_TAG: u8 = 6 << 5;
pub const MAJOR_SIMPLE: u8 = 7 << 5;

pub const INFO_U8: u8 = 24;
pub const INFO_U16: u8 = 25;
pub const INFO_U32: u8 = 26;
pub const INFO_U64: u8 = 27;
pub const INFO_INDEFINITE: u8 = 31;

pub const SIMPLE_FALSE: u8 = 0xF4;
pub const SIMPLE_TRUE: u8 = 0xF5;
pub const SIMPLE_NULL: u8 = 0xF6;
pub const SIMPLE_UNDEFINED: u8 = 0xF7;
pub const SIMPLE_U8: u8 = 0xF8;
pub const FLOAT32: u8 = 0xFA;
pub const FLOAT64: u8 = 0xFB;

pub const INDEFINITE_BYTES: u8 = 0x5F;
pub const INDEFINITE_TEXT: u8 = 0x7F;
pub const INDEFINITE_ARRAY: u8 = 0x9F;
pub const INDEFINITE_MAP: u8 = 0xBF;
/// Closes an indefinite-length item.
pub const BREAK: u8 = 0xFF;

/// Assemble a header byte from a pre-shifted major type and an additional info value.
pub const fn header(major: u8, info: u8) -> u8 {
	major | info
}

/// The pre-shifted major type of a header byte.
pub const fn major(byte: u8) -> u8 {
	byte & 0xE0
}

/// The additional info of a header byte.
pub const fn info(byte: u8) -> u8 {
	byte & 0x1F
}

pub fn is_indefinite_bytes(byte: u8) -> bool {
	byte == INDEFINITE_BYTES
}

pub fn is_indefinite_text(byte: u8) -> bool {
	byte == INDEFINITE_TEXT
}

pub fn is_indefinite_array(byte: u8) -> bool {
	byte == INDEFINITE_ARRAY
}

pub fn is_indefinite_map(byte: u8) -> bool {
	byte == INDEFINITE_MAP
}

/// Write a header byte with the shortest argument form holding `n`.
pub(crate) fn put_head(sink: &mut Sink, major: u8, n: u64) -> Result<(), EncodeError> {
	match n {
		n if n <= 0x17 => sink.put_byte(major | n as u8),
		n if n <= u8::MAX as _ => sink.put(&[major | INFO_U8, n as u8]),
		n if n <= u16::MAX as _ => {
			sink.put_byte(major | INFO_U16)?;
			sink.put(&(n as u16).to_be_bytes())
		}
		n if n <= u32::MAX as _ => {
			sink.put_byte(major | INFO_U32)?;
			sink.put(&(n as u32).to_be_bytes())
		}
		n => {
			sink.put_byte(major | INFO_U64)?;
			sink.put(&n.to_be_bytes())
		}
	}
}

/// Read the argument of the item starting at `input[0]`.
///
/// Returns the argument, or [`None`] for the indefinite form, along with the size of the head in bytes.
pub(crate) fn read_argument(input: &[u8]) -> Result<(Option<u64>, usize), DecodeError> {
	let initial = *input.first().ok_or(DecodeError::Insufficient)?;
	let excess = &input[1..];
	Ok(match info(initial) {
		n if n < 24 => (Some(n as u64), 1),
		INFO_U8 => (Some(*excess.first().ok_or(DecodeError::Insufficient)? as _), 2),
		INFO_U16 => (Some(read_be_u16(excess).ok_or(DecodeError::Insufficient)? as _), 3),
		INFO_U32 => (Some(read_be_u32(excess).ok_or(DecodeError::Insufficient)? as _), 5),
		INFO_U64 => (Some(read_be_u64(excess).ok_or(DecodeError::Insufficient)?), 9),
		INFO_INDEFINITE => (None, 1),
		_ => return Err(DecodeError::Reserved(initial)),
	})
}

/// Read a definite argument, rejecting the indefinite form.
pub(crate) fn read_definite(input: &[u8]) -> Result<(u64, usize), DecodeError> {
	match read_argument(input)? {
		(Some(n), size) => Ok((n, size)),
		(None, _) => Err(DecodeError::IndefiniteNotAllowed(input[0])),
	}
}

/// Split a definite byte or text string into its payload and total encoded size.
pub(crate) fn read_string(input: &[u8]) -> Result<(&[u8], usize), DecodeError> {
	let (len, head) = read_definite(input)?;
	let len = usize::try_from(len).map_err(|_| DecodeError::Insufficient)?;
	let end = head.checked_add(len).ok_or(DecodeError::Insufficient)?;
	let payload = input.get(head..end).ok_or(DecodeError::Insufficient)?;
	Ok((payload, end))
}
