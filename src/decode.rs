//! Decoding [`Value`]s from byte buffers.
//!
//! Decoding dispatches on the header byte through a 256-entry table of decoder functions,
//! built at compile time.

use crate::{
	errors::DecodeError,
	read_ints::{read_be_u16, read_be_u32, read_be_u64},
	tags::decode_tagged,
	text::bytes_as_str,
	value::Value,
	wire::{
		info, major, read_argument, read_definite, read_string, BREAK, INFO_INDEFINITE, INFO_U64,
		MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_TAG, MAJOR_TEXT,
		MAJOR_UNSIGNED,
	},
};

/// Reads the item starting at `input[0]`, returning it and the number of bytes it occupies.
/// The second argument is the nesting depth of that item.
type DecodeFn = fn(&[u8], usize) -> Result<(Value, usize), DecodeError>;

/// How deep arrays, maps and tags may nest before decoding gives up.
pub const MAX_DEPTH: usize = 256;

static DECODERS: [DecodeFn; 256] = decoder_table();

const fn decoder_table() -> [DecodeFn; 256] {
	let mut table = [decode_reserved as DecodeFn; 256];
	let mut i = 0;
	while i < 256 {
		let byte = i as u8;
		let info = info(byte);
		table[i] = if info > INFO_U64 && info < INFO_INDEFINITE {
			decode_reserved
		} else {
			match major(byte) {
				MAJOR_UNSIGNED if info == INFO_INDEFINITE => decode_indefinite_not_allowed,
				MAJOR_UNSIGNED => decode_unsigned,
				MAJOR_NEGATIVE if info == INFO_INDEFINITE => decode_indefinite_not_allowed,
				MAJOR_NEGATIVE => decode_negative,
				MAJOR_BYTES | MAJOR_TEXT if info == INFO_INDEFINITE => decode_indefinite_marker,
				MAJOR_BYTES => decode_bytes,
				MAJOR_TEXT => decode_text,
				MAJOR_ARRAY => decode_array,
				MAJOR_MAP => decode_map,
				MAJOR_TAG if info == INFO_INDEFINITE => decode_indefinite_not_allowed,
				MAJOR_TAG => decode_tagged,
				_ => match info {
					0..=19 => decode_simple,
					20 | 21 => decode_bool,
					22 => decode_null,
					23 => decode_undefined,
					24 => decode_simple_u8,
					25 => decode_float16,
					26 => decode_float32,
					27 => decode_float64,
					_ => decode_break,
				},
			}
		};
		i += 1;
	}
	table
}

/// Decode one data item from the start of `input`.
///
/// Returns the value and the number of bytes consumed.
/// Indefinite-length byte and text strings decode to [`Value::Indefinite`] holding the opener byte;
/// their chunks follow as separate items.
/// Indefinite-length arrays and maps are decoded whole.
/// Items nested deeper than [`MAX_DEPTH`] fail with [`DecodeError::DepthExceeded`].
pub fn decode(input: &[u8]) -> Result<(Value, usize), DecodeError> {
	decode_at(input, 0)
}

pub(crate) fn decode_at(input: &[u8], depth: usize) -> Result<(Value, usize), DecodeError> {
	let initial = *input.first().ok_or(DecodeError::Insufficient)?;
	DECODERS[initial as usize](input, depth)
}

/// The depth of the items inside a container or tag opened at `depth`.
pub(crate) fn nested(depth: usize) -> Result<usize, DecodeError> {
	if depth >= MAX_DEPTH {
		return Err(DecodeError::DepthExceeded(MAX_DEPTH));
	}
	Ok(depth + 1)
}

fn decode_reserved(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Err(DecodeError::Reserved(input[0]))
}

fn decode_indefinite_not_allowed(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Err(DecodeError::IndefiniteNotAllowed(input[0]))
}

fn decode_unsigned(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let (n, size) = read_definite(input)?;
	Ok((Value::Unsigned(n), size))
}

fn decode_negative(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let (n, size) = read_definite(input)?;
	let n = Value::interpret_signed_checked(n).ok_or(DecodeError::IntegerOverflow(n))?;
	Ok((Value::Signed(n), size))
}

fn decode_indefinite_marker(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Ok((Value::Indefinite(input[0]), 1))
}

fn decode_bytes(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let (payload, size) = read_string(input)?;
	Ok((Value::Bytes(payload.to_vec()), size))
}

fn decode_text(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let (payload, size) = read_string(input)?;
	Ok((Value::Text(bytes_as_str(payload)?.to_owned()), size))
}

fn decode_array(input: &[u8], depth: usize) -> Result<(Value, usize), DecodeError> {
	let depth = nested(depth)?;
	let (len, mut pos) = read_argument(input)?;
	let mut items = Vec::new();
	match len {
		Some(len) => {
			// Every item takes at least a byte, which bounds the preallocation.
			items.reserve(len.min(input.len() as u64) as usize);
			for _ in 0..len {
				pos += decode_item(&input[pos..], depth, &mut items)?;
			}
		}
		None => loop {
			match input.get(pos) {
				Some(&BREAK) => {
					pos += 1;
					break;
				}
				Some(_) => pos += decode_item(&input[pos..], depth, &mut items)?,
				None => return Err(DecodeError::Insufficient),
			}
		},
	}
	Ok((Value::Array(items), pos))
}

fn decode_map(input: &[u8], depth: usize) -> Result<(Value, usize), DecodeError> {
	let depth = nested(depth)?;
	let (len, mut pos) = read_argument(input)?;
	let mut entries = Vec::new();
	match len {
		Some(len) => {
			entries.reserve(len.min(input.len() as u64) as usize);
			for _ in 0..len {
				pos += decode_entry(&input[pos..], depth, &mut entries)?;
			}
		}
		None => loop {
			match input.get(pos) {
				Some(&BREAK) => {
					pos += 1;
					break;
				}
				Some(_) => pos += decode_entry(&input[pos..], depth, &mut entries)?,
				None => return Err(DecodeError::Insufficient),
			}
		},
	}
	Ok((Value::Map(entries), pos))
}

/// Decode one container item, refusing a break in its place.
fn decode_item(
	input: &[u8],
	depth: usize,
	items: &mut Vec<Value>,
) -> Result<usize, DecodeError> {
	match decode_at(input, depth)? {
		(Value::Break, _) => Err(DecodeError::UnexpectedBreak),
		(item, size) => {
			items.push(item);
			Ok(size)
		}
	}
}

fn decode_entry(
	input: &[u8],
	depth: usize,
	entries: &mut Vec<(Value, Value)>,
) -> Result<usize, DecodeError> {
	let mut pair = Vec::with_capacity(2);
	let mut size = decode_item(input, depth, &mut pair)?;
	size += decode_item(&input[size..], depth, &mut pair)?;
	let value = pair.pop().ok_or(DecodeError::Insufficient)?;
	let key = pair.pop().ok_or(DecodeError::Insufficient)?;
	entries.push((key, value));
	Ok(size)
}

fn decode_simple(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Ok((Value::Simple(info(input[0])), 1))
}

fn decode_bool(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Ok((Value::Bool(info(input[0]) == 21), 1))
}

fn decode_null(_: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Ok((Value::Null, 1))
}

fn decode_undefined(_: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Ok((Value::Undefined, 1))
}

fn decode_simple_u8(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	match input.get(1) {
		// Values below 32 must use the one-byte form.
		Some(&n) if n < 32 => Err(DecodeError::Reserved(input[0])),
		Some(&n) => Ok((Value::Simple(n), 2)),
		None => Err(DecodeError::Insufficient),
	}
}

fn decode_float16(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let bits = read_be_u16(&input[1..]).ok_or(DecodeError::Insufficient)?;
	Err(DecodeError::Float16Unsupported(half::f16::from_bits(bits)))
}

fn decode_float32(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let bits = read_be_u32(&input[1..]).ok_or(DecodeError::Insufficient)?;
	Ok((Value::Float32(f32::from_bits(bits)), 5))
}

fn decode_float64(input: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	let bits = read_be_u64(&input[1..]).ok_or(DecodeError::Insufficient)?;
	Ok((Value::Float64(f64::from_bits(bits)), 9))
}

fn decode_break(_: &[u8], _: usize) -> Result<(Value, usize), DecodeError> {
	Ok((Value::Break, 1))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{config::Config, encode::encode};

	macro_rules! decode_test {
		($in:expr => $out:pat if $cond:expr) => {
			let input: &[u8] = &$in;
			match decode(input) {
				$out if $cond => (),
				other => panic!("{:X?} -> {:?}", input, other),
			}
		};
		($in:expr => $out:pat) => {
			decode_test!($in => $out if true);
		};
	}

	#[test]
	fn decode_uint_tiny() {
		for i1 in 0..=0x17u8 {
			decode_test!([i1] => Ok((Value::Unsigned(i2), 1)) if i2 == i1 as u64);
		}
	}

	#[test]
	fn decode_uint_widths() {
		decode_test!([0x18, 0x18] => Ok((Value::Unsigned(24), 2)));
		decode_test!([0x19u8, 0x01, 0x02] => Ok((Value::Unsigned(0x0102), 3)));
		decode_test!([0x1Au8, 0x01, 0x02, 0x03, 0x04] => Ok((Value::Unsigned(0x01020304), 5)));
		decode_test!(
			[0x1Bu8, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
			=> Ok((Value::Unsigned(0x0102030405060708), 9))
		);
	}

	#[test]
	fn decode_uint_bounds() {
		decode_test!(*b"\x18" => Err(DecodeError::Insufficient));
		decode_test!(*b"\x19\x00" => Err(DecodeError::Insufficient));
		decode_test!(*b"\x1A\x00\x00\x00" => Err(DecodeError::Insufficient));
		decode_test!(*b"\x1B\x00\x00\x00\x00\x00\x00\x00" => Err(DecodeError::Insufficient));
		decode_test!([] => Err(DecodeError::Insufficient));
	}

	#[test]
	fn decode_negint() {
		decode_test!([0x20u8] => Ok((Value::Signed(-1), 1)));
		decode_test!([0x37u8] => Ok((Value::Signed(-24), 1)));
		decode_test!([0x38, 0x18] => Ok((Value::Signed(-25), 2)));
		decode_test!([0x39, 0x01, 0x00] => Ok((Value::Signed(-257), 3)));
		decode_test!(
			[0x3B, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
			=> Ok((Value::Signed(i64::MIN), 9))
		);
	}

	#[test]
	fn decode_negint_overflow() {
		decode_test!(
			[0x3B, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
			=> Err(DecodeError::IntegerOverflow(n)) if n == 1 << 63
		);
	}

	#[test]
	fn decode_reserved_info() {
		decode_test!([0x1C] => Err(DecodeError::Reserved(0x1C)));
		for major in [0x00u8, 0x20, 0x40, 0x60, 0x80, 0xA0, 0xC0, 0xE0] {
			for info in 28..=30u8 {
				decode_test!([major | info, 0, 0, 0, 0, 0, 0, 0, 0] => Err(DecodeError::Reserved(_)));
			}
		}
	}

	#[test]
	fn decode_indefinite_misuse() {
		decode_test!([0x1F] => Err(DecodeError::IndefiniteNotAllowed(0x1F)));
		decode_test!([0x3F] => Err(DecodeError::IndefiniteNotAllowed(0x3F)));
		decode_test!([0xDF, 0x00] => Err(DecodeError::IndefiniteNotAllowed(0xDF)));
	}

	#[test]
	fn decode_bytes() {
		decode_test!([0x40] => Ok((Value::Bytes(x), 1)) if x.is_empty());
		decode_test!(*b"\x45Hello" => Ok((Value::Bytes(x), 6)) if x == b"Hello");
		decode_test!(*b"\x58\x04Halo" => Ok((Value::Bytes(x), 6)) if x == b"Halo");
		decode_test!(*b"\x59\x00\x07Goodbye" => Ok((Value::Bytes(x), 10)) if x == b"Goodbye");
		decode_test!(*b"\x45Hell" => Err(DecodeError::Insufficient));
	}

	#[test]
	fn decode_text() {
		decode_test!([0x60] => Ok((Value::Text(x), 1)) if x.is_empty());
		decode_test!(*b"\x65Hello" => Ok((Value::Text(x), 6)) if x == "Hello");
		decode_test!(
			*b"\x7A\x00\x00\x00\x0DLong message!"
			=> Ok((Value::Text(x), 18)) if x == "Long message!"
		);
		decode_test!(*b"\x62\xFF\xFF" => Err(DecodeError::InvalidUtf8(_)));
	}

	#[test]
	fn decode_indefinite_strings_as_markers() {
		decode_test!(*b"\x5F\x42ab\xFF" => Ok((Value::Indefinite(0x5F), 1)));
		decode_test!(*b"\x7F\x62ab\xFF" => Ok((Value::Indefinite(0x7F), 1)));
		decode_test!([0xFF] => Ok((Value::Break, 1)));
	}

	#[test]
	fn decode_arrays() {
		decode_test!(
			*b"\x84\x00\x01\x02\x03"
			=> Ok((Value::Array(items), 5)) if items == [0u8, 1, 2, 3].map(Value::from)
		);
		decode_test!([0x80] => Ok((Value::Array(items), 1)) if items.is_empty());
		decode_test!(
			*b"\x9F\x00\x9F\xFF\xFF"
			=> Ok((Value::Array(items), 5))
				if items == [Value::Unsigned(0), Value::Array(vec![])]
		);
		decode_test!(*b"\x9F\x00" => Err(DecodeError::Insufficient));
		decode_test!(*b"\x82\x00" => Err(DecodeError::Insufficient));
		decode_test!(*b"\x82\x00\xFF" => Err(DecodeError::UnexpectedBreak));
	}

	#[test]
	fn decode_maps() {
		decode_test!(
			*b"\xA2\x01\x02\x03\x04"
			=> Ok((Value::Map(entries), 5)) if entries == [
				(Value::Unsigned(1), Value::Unsigned(2)),
				(Value::Unsigned(3), Value::Unsigned(4)),
			]
		);
		decode_test!(
			*b"\xBF\x61a\x01\x61a\x02\xFF"
			=> Ok((Value::Map(entries), 8)) if entries == [
				(Value::from("a"), Value::Unsigned(1)),
				(Value::from("a"), Value::Unsigned(2)),
			]
		);
		decode_test!(*b"\xBF\x00\xFF" => Err(DecodeError::UnexpectedBreak));
	}

	#[test]
	fn decode_simple_values() {
		decode_test!([0xF4] => Ok((Value::Bool(false), 1)));
		decode_test!([0xF5] => Ok((Value::Bool(true), 1)));
		decode_test!([0xF6] => Ok((Value::Null, 1)));
		decode_test!([0xF7] => Ok((Value::Undefined, 1)));
		for n in 0..=19u8 {
			decode_test!([0xE0 | n] => Ok((Value::Simple(x), 1)) if x == n);
		}
		for n in 32..=255u8 {
			decode_test!([0xF8, n] => Ok((Value::Simple(x), 2)) if x == n);
		}
		decode_test!([0xF8, 0x10] => Err(DecodeError::Reserved(0xF8)));
	}

	#[test]
	fn decode_floats() {
		decode_test!(*b"\xFA\x41\x21\xC2\x8F" => Ok((Value::Float32(f), 5)) if f == 10.11);
		decode_test!(
			*b"\xFB\x7F\xF0\x00\x00\x00\x00\x00\x00"
			=> Ok((Value::Float64(f), 9)) if f == f64::INFINITY
		);
		decode_test!(*b"\xF9\x3C\x00" => Err(DecodeError::Float16Unsupported(h)) if h == half::f16::ONE);
		decode_test!(*b"\xFB\x00" => Err(DecodeError::Insufficient));
	}

	#[test]
	fn stream_array_round_trip() {
		let value = Value::Array(vec![Value::Float64(10.2), Value::from("hello world")]);
		let mut buf = [0u8; 32];
		let n = encode(&value, &mut buf).unwrap();
		assert_eq!(n, 23);
		assert_eq!(buf[0], 0x9F);
		assert_eq!(buf[n - 1], 0xFF);
		decode_test!(buf[..n] => Ok((v, 23)) if v == value);
	}

	#[test]
	fn length_prefixed_round_trip() {
		let value = Value::Map(vec![
			(Value::from("a"), Value::Array(vec![Value::Signed(-3), Value::Null])),
			(Value::Unsigned(7), Value::Bytes(vec![1, 2, 3])),
		]);
		let mut config = Config::default();
		config.set_container_kind(crate::config::ContainerKind::LengthPrefix);
		let bytes = config.encode_to_vec(&value).unwrap();
		assert_eq!(bytes[0], 0xA2);
		decode_test!(bytes[..] => Ok((v, n)) if v == value && n == bytes.len());
	}

	#[test]
	fn nesting_limit() {
		let nest = |opener: u8, depth: usize| {
			let mut bytes = vec![opener; depth];
			bytes.extend(std::iter::repeat(BREAK).take(depth));
			bytes
		};
		let deepest = nest(0x9F, MAX_DEPTH);
		decode_test!(deepest[..] => Ok((_, n)) if n == deepest.len());
		decode_test!(nest(0x9F, MAX_DEPTH + 1)[..] => Err(DecodeError::DepthExceeded(MAX_DEPTH)));
		decode_test!(nest(0x9F, 200_000)[..] => Err(DecodeError::DepthExceeded(MAX_DEPTH)));

		let mut maps = vec![0xBF, 0x61, b'k'].repeat(MAX_DEPTH + 1);
		maps.push(0xF6);
		maps.extend(std::iter::repeat(BREAK).take(MAX_DEPTH + 1));
		decode_test!(maps[..] => Err(DecodeError::DepthExceeded(MAX_DEPTH)));

		let mut tags = vec![0xC6; 100_000];
		tags.push(0x01);
		decode_test!(tags[..] => Err(DecodeError::DepthExceeded(MAX_DEPTH)));
	}
}
