//! CBOR to JSON text.
//!
//! Only the subset of CBOR the scanner produces has a JSON form:
//! integers, floats, text, booleans, null, and arrays and maps in the stream form.

use crate::{
	decode::nested,
	errors::{DecodeError, JsonError},
	read_ints::{read_be_u16, read_be_u32, read_be_u64},
	sink::{fill_vec, Sink},
	text::bytes_as_str,
	value::Value,
	wire::{
		info, major, read_definite, read_string, BREAK, INDEFINITE_TEXT, INFO_INDEFINITE, INFO_U64,
		MAJOR_ARRAY, MAJOR_BYTES, MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT,
		MAJOR_UNSIGNED,
	},
};

/// Writes the item at the emitter's position as JSON and steps past it.
type EmitFn = for<'e, 'i, 'o> fn(&'e mut Emitter<'i, 'o>) -> Result<(), JsonError>;

static EMITTERS: [EmitFn; 256] = emitter_table();

const fn emitter_table() -> [EmitFn; 256] {
	let mut table = [emit_reserved as EmitFn; 256];
	let mut i = 0;
	while i < 256 {
		let byte = i as u8;
		let info = info(byte);
		table[i] = if info > INFO_U64 && info < INFO_INDEFINITE {
			match major(byte) {
				MAJOR_BYTES => emit_bytes,
				MAJOR_TAG => emit_tag,
				MAJOR_SIMPLE => emit_unassigned,
				_ => emit_reserved,
			}
		} else {
			match major(byte) {
				MAJOR_UNSIGNED | MAJOR_NEGATIVE if info == INFO_INDEFINITE => {
					emit_indefinite_not_allowed
				}
				MAJOR_UNSIGNED => emit_unsigned,
				MAJOR_NEGATIVE => emit_negative,
				MAJOR_BYTES => emit_bytes,
				MAJOR_TEXT if info == INFO_INDEFINITE => emit_indefinite_text,
				MAJOR_TEXT => emit_text,
				MAJOR_ARRAY | MAJOR_MAP if info != INFO_INDEFINITE => emit_definite_container,
				MAJOR_ARRAY => emit_array,
				MAJOR_MAP => emit_map,
				MAJOR_TAG => emit_tag,
				_ => match info {
					20 | 21 => emit_bool,
					22 => emit_null,
					23 => emit_undefined,
					25 => emit_float16,
					26 => emit_float32,
					27 => emit_float64,
					INFO_INDEFINITE => emit_break,
					_ => emit_simple,
				},
			}
		};
		i += 1;
	}
	table
}

/// Write the JSON text of the CBOR item at the start of `cbor` to `out`.
///
/// Returns the number of bytes consumed from `cbor` and written to `out`.
/// Floats are written with six fractional digits; infinities and NaN become `null`.
/// Arrays and maps nested deeper than [`MAX_DEPTH`](crate::MAX_DEPTH) fail.
pub fn to_json(cbor: &[u8], out: &mut [u8]) -> Result<(usize, usize), JsonError> {
	let mut emitter = Emitter {
		input: cbor,
		pos: 0,
		depth: 0,
		sink: Sink::new(out),
	};
	emitter.item()?;
	Ok((emitter.pos, emitter.sink.position()))
}

/// Write the JSON text of the CBOR item at the start of `cbor` to a new string.
pub fn to_json_string(cbor: &[u8]) -> Result<String, JsonError> {
	let json = fill_vec(cbor.len() * 2, |out| to_json(cbor, out).map(|(_, n)| n))?;
	String::from_utf8(json).map_err(|e| DecodeError::InvalidUtf8(e.utf8_error()).into())
}

struct Emitter<'i, 'o> {
	input: &'i [u8],
	pos: usize,
	depth: usize,
	sink: Sink<'o>,
}

impl<'i, 'o> Emitter<'i, 'o> {
	fn current(&self) -> &'i [u8] {
		&self.input[self.pos..]
	}

	fn peek(&self) -> Result<u8, JsonError> {
		Ok(*self.input.get(self.pos).ok_or(DecodeError::Insufficient)?)
	}

	fn item(&mut self) -> Result<(), JsonError> {
		let initial = self.peek()?;
		EMITTERS[initial as usize](self)
	}

	fn put(&mut self, text: &str) -> Result<(), JsonError> {
		Ok(self.sink.put(text.as_bytes())?)
	}

	/// Write `payload` as the body of a JSON string, escaping as needed.
	fn put_escaped(&mut self, payload: &[u8]) -> Result<(), JsonError> {
		let text = bytes_as_str(payload).map_err(DecodeError::from)?;
		let mut plain = 0;
		for (i, b) in text.bytes().enumerate() {
			let escape = match b {
				b'"' => "\\\"",
				b'\\' => "\\\\",
				b'\n' => "\\n",
				b'\r' => "\\r",
				b'\t' => "\\t",
				0x08 => "\\b",
				0x0C => "\\f",
				0x00..=0x1F => "",
				_ => continue,
			};
			self.sink.put(&payload[plain..i])?;
			plain = i + 1;
			if escape.is_empty() {
				self.put(&format!("\\u{:04x}", b))?;
			} else {
				self.put(escape)?;
			}
		}
		Ok(self.sink.put(&payload[plain..])?)
	}
}

fn emit_reserved(e: &mut Emitter) -> Result<(), JsonError> {
	Err(DecodeError::Reserved(e.peek()?).into())
}

fn emit_indefinite_not_allowed(e: &mut Emitter) -> Result<(), JsonError> {
	Err(DecodeError::IndefiniteNotAllowed(e.peek()?).into())
}

fn emit_unassigned(e: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::UnassignedType7(e.peek()?))
}

fn emit_bytes(_: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::ByteStringUnrepresentable)
}

fn emit_tag(_: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::TagNotSupported)
}

fn emit_definite_container(e: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::ExpectedIndefinite(e.peek()?))
}

fn emit_unsigned(e: &mut Emitter) -> Result<(), JsonError> {
	let (n, size) = read_definite(e.current())?;
	e.pos += size;
	e.put(&n.to_string())
}

fn emit_negative(e: &mut Emitter) -> Result<(), JsonError> {
	let (n, size) = read_definite(e.current())?;
	let n = Value::interpret_signed_checked(n).ok_or(DecodeError::IntegerOverflow(n))?;
	e.pos += size;
	e.put(&n.to_string())
}

fn emit_text(e: &mut Emitter) -> Result<(), JsonError> {
	let (payload, size) = read_string(e.current())?;
	e.pos += size;
	e.put("\"")?;
	e.put_escaped(payload)?;
	e.put("\"")
}

/// Concatenate the chunks of an indefinite text string into one JSON string.
fn emit_indefinite_text(e: &mut Emitter) -> Result<(), JsonError> {
	e.pos += 1;
	e.put("\"")?;
	loop {
		match e.peek()? {
			BREAK => break,
			b if major(b) == MAJOR_TEXT && b != INDEFINITE_TEXT => {
				let (payload, size) = read_string(e.current())?;
				e.pos += size;
				e.put_escaped(payload)?;
			}
			_ => return Err(JsonError::ExpectedString(e.pos)),
		}
	}
	e.pos += 1;
	e.put("\"")
}

fn emit_array(e: &mut Emitter) -> Result<(), JsonError> {
	let outer = e.depth;
	e.depth = nested(outer)?;
	e.pos += 1;
	e.put("[")?;
	let mut first = true;
	while e.peek()? != BREAK {
		if !first {
			e.put(",")?;
		}
		first = false;
		e.item()?;
	}
	e.depth = outer;
	e.pos += 1;
	e.put("]")
}

fn emit_map(e: &mut Emitter) -> Result<(), JsonError> {
	let outer = e.depth;
	e.depth = nested(outer)?;
	e.pos += 1;
	e.put("{")?;
	let mut first = true;
	loop {
		let key = e.peek()?;
		if key == BREAK {
			break;
		}
		if major(key) != MAJOR_TEXT {
			return Err(JsonError::ExpectedKey(e.pos));
		}
		if !first {
			e.put(",")?;
		}
		first = false;
		e.item()?;
		e.put(":")?;
		if e.peek()? == BREAK {
			return Err(JsonError::BreakCodeUnexpected);
		}
		e.item()?;
	}
	e.depth = outer;
	e.pos += 1;
	e.put("}")
}

fn emit_bool(e: &mut Emitter) -> Result<(), JsonError> {
	let text = if info(e.peek()?) == 21 { "true" } else { "false" };
	e.pos += 1;
	e.put(text)
}

fn emit_null(e: &mut Emitter) -> Result<(), JsonError> {
	e.pos += 1;
	e.put("null")
}

fn emit_undefined(_: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::UndefinedUnrepresentable)
}

fn emit_simple(_: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::SimpleTypeUnrepresentable)
}

fn emit_float16(e: &mut Emitter) -> Result<(), JsonError> {
	let bits = read_be_u16(&e.current()[1..]).ok_or(DecodeError::Insufficient)?;
	Err(DecodeError::Float16Unsupported(half::f16::from_bits(bits)).into())
}

fn emit_float32(e: &mut Emitter) -> Result<(), JsonError> {
	let bits = read_be_u32(&e.current()[1..]).ok_or(DecodeError::Insufficient)?;
	e.pos += 5;
	put_float(e, f32::from_bits(bits) as f64)
}

fn emit_float64(e: &mut Emitter) -> Result<(), JsonError> {
	let bits = read_be_u64(&e.current()[1..]).ok_or(DecodeError::Insufficient)?;
	e.pos += 9;
	put_float(e, f64::from_bits(bits))
}

fn put_float(e: &mut Emitter, f: f64) -> Result<(), JsonError> {
	if f.is_finite() {
		e.put(&format!("{:.6}", f))
	} else {
		e.put("null")
	}
}

fn emit_break(_: &mut Emitter) -> Result<(), JsonError> {
	Err(JsonError::BreakCodeUnexpected)
}
