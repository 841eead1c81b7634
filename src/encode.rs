//! Encoding [`Value`]s into caller-supplied buffers.

use crate::{
	config::{Config, ContainerKind},
	decode::MAX_DEPTH,
	errors::EncodeError,
	sink::{fill_vec, Sink},
	tags,
	value::Value,
	wire::{
		is_indefinite_array, is_indefinite_bytes, is_indefinite_map, is_indefinite_text, put_head,
		BREAK, FLOAT32, FLOAT64, INDEFINITE_ARRAY, INDEFINITE_MAP, MAJOR_ARRAY, MAJOR_BYTES,
		MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TEXT, MAJOR_UNSIGNED, SIMPLE_FALSE,
		SIMPLE_NULL, SIMPLE_TRUE, SIMPLE_U8, SIMPLE_UNDEFINED,
	},
};

impl Config {
	/// Encode `value` into `out`, returning the number of bytes written.
	///
	/// Integers always take their shortest form.
	/// Arrays and maps take the form selected by [`Config::container_kind`].
	/// [`Value::Break`] and [`Value::Indefinite`] are written only as the whole value, never inside a
	/// container, and nesting is held to what [`decode`](crate::decode) accepts.
	pub fn encode(&self, value: &Value, out: &mut [u8]) -> Result<usize, EncodeError> {
		let mut sink = Sink::new(out);
		encode_value(value, self.container_kind(), 0, &mut sink)?;
		Ok(sink.position())
	}

	/// Encode `value` into a freshly allocated buffer.
	pub fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
		fill_vec(64, |out| self.encode(value, out))
	}
}

/// Encode `value` with the default configuration.
pub fn encode(value: &Value, out: &mut [u8]) -> Result<usize, EncodeError> {
	Config::default().encode(value, out)
}

/// Encode `value` with the default configuration into a freshly allocated buffer.
pub fn encode_to_vec(value: &Value) -> Result<Vec<u8>, EncodeError> {
	Config::default().encode_to_vec(value)
}

/// Encode an integer in -24..=23 as a single byte.
pub fn encode_small_int(n: i8, out: &mut [u8]) -> Result<usize, EncodeError> {
	let byte = match n {
		0..=23 => MAJOR_UNSIGNED | n as u8,
		-24..=-1 => MAJOR_NEGATIVE | (-1 - n) as u8,
		_ => return Err(EncodeError::SmallIntOutOfRange(n)),
	};
	let mut sink = Sink::new(out);
	sink.put_byte(byte)?;
	Ok(1)
}

/// Encode a simple value.
///
/// Codes 0..=19 take one byte and 32..=255 take two.
/// Codes 20..=31 are assigned to booleans, null, undefined, floats and break, so they are refused.
pub fn encode_simple_type(code: u8, out: &mut [u8]) -> Result<usize, EncodeError> {
	let mut sink = Sink::new(out);
	put_simple(&mut sink, code)?;
	Ok(sink.position())
}

pub fn encode_undefined(out: &mut [u8]) -> Result<usize, EncodeError> {
	let mut sink = Sink::new(out);
	sink.put_byte(SIMPLE_UNDEFINED)?;
	Ok(1)
}

/// The container and tag levels `value` itself opens when encoded.
fn levels(value: &Value) -> usize {
	match value {
		Value::DecimalFraction(_) | Value::BigFloat(_) => 2,
		Value::Array(_)
		| Value::Map(_)
		| Value::DateTime(_)
		| Value::Epoch(_)
		| Value::EpochMicro(_)
		| Value::BigInt(_)
		| Value::EmbeddedCbor(_)
		| Value::RegExp(_)
		| Value::CborPrefix(_) => 1,
		_ => 0,
	}
}

/// Encode `value` found `depth` containers deep.
fn encode_value(
	value: &Value,
	containers: ContainerKind,
	depth: usize,
	sink: &mut Sink,
) -> Result<(), EncodeError> {
	if depth + levels(value) > MAX_DEPTH {
		return Err(EncodeError::DepthExceeded(MAX_DEPTH));
	}
	match value {
		Value::Null => sink.put_byte(SIMPLE_NULL),
		Value::Bool(false) => sink.put_byte(SIMPLE_FALSE),
		Value::Bool(true) => sink.put_byte(SIMPLE_TRUE),
		Value::Undefined => sink.put_byte(SIMPLE_UNDEFINED),
		Value::Unsigned(n) => put_head(sink, MAJOR_UNSIGNED, *n),
		Value::Signed(n) => put_int(sink, *n),
		Value::Float32(f) => {
			sink.put_byte(FLOAT32)?;
			sink.put(&f.to_be_bytes())
		}
		Value::Float64(f) => put_f64(sink, *f),
		Value::Bytes(bytes) => put_string(sink, MAJOR_BYTES, bytes),
		Value::Text(text) => put_string(sink, MAJOR_TEXT, text.as_bytes()),
		Value::Array(items) => {
			match containers {
				ContainerKind::LengthPrefix => put_head(sink, MAJOR_ARRAY, items.len() as _)?,
				ContainerKind::Stream => sink.put_byte(INDEFINITE_ARRAY)?,
			}
			for item in items {
				encode_value(item, containers, depth + 1, sink)?;
			}
			if containers == ContainerKind::Stream {
				sink.put_byte(BREAK)?;
			}
			Ok(())
		}
		Value::Map(entries) => {
			match containers {
				ContainerKind::LengthPrefix => put_head(sink, MAJOR_MAP, entries.len() as _)?,
				ContainerKind::Stream => sink.put_byte(INDEFINITE_MAP)?,
			}
			for (key, value) in entries {
				encode_value(key, containers, depth + 1, sink)?;
				encode_value(value, containers, depth + 1, sink)?;
			}
			if containers == ContainerKind::Stream {
				sink.put_byte(BREAK)?;
			}
			Ok(())
		}
		Value::Simple(code) => put_simple(sink, *code),
		// Markers have no place among a container's items.
		Value::Indefinite(_) | Value::Break if depth > 0 => Err(EncodeError::UnknownType),
		Value::Indefinite(opener) => {
			let opener = *opener;
			if is_indefinite_bytes(opener)
				|| is_indefinite_text(opener)
				|| is_indefinite_array(opener)
				|| is_indefinite_map(opener)
			{
				sink.put_byte(opener)
			} else {
				Err(EncodeError::UnknownType)
			}
		}
		Value::Break => sink.put_byte(BREAK),
		Value::DateTime(dt) => tags::put_date_time(sink, dt),
		Value::Epoch(secs) => tags::put_epoch(sink, *secs),
		Value::EpochMicro(secs) => tags::put_epoch_micro(sink, *secs),
		Value::BigInt(n) => tags::put_bignum(sink, n),
		Value::DecimalFraction(fraction) => tags::put_decimal_fraction(sink, fraction),
		Value::BigFloat(fraction) => tags::put_big_float(sink, fraction),
		Value::EmbeddedCbor(bytes) => tags::put_embedded_cbor(sink, bytes),
		Value::RegExp(re) => tags::put_regexp(sink, re),
		Value::CborPrefix(bytes) => tags::put_cbor_prefix(sink, bytes),
	}
}

/// Write a signed integer, using major type 0 when it is non-negative.
pub(crate) fn put_int(sink: &mut Sink, n: i64) -> Result<(), EncodeError> {
	if n.is_negative() {
		put_head(sink, MAJOR_NEGATIVE, n.abs_diff(-1))
	} else {
		put_head(sink, MAJOR_UNSIGNED, n as _)
	}
}

pub(crate) fn put_f64(sink: &mut Sink, f: f64) -> Result<(), EncodeError> {
	sink.put_byte(FLOAT64)?;
	sink.put(&f.to_be_bytes())
}

/// Write a definite byte or text string.
pub(crate) fn put_string(sink: &mut Sink, major: u8, payload: &[u8]) -> Result<(), EncodeError> {
	put_head(sink, major, payload.len() as _)?;
	sink.put(payload)
}

fn put_simple(sink: &mut Sink, code: u8) -> Result<(), EncodeError> {
	match code {
		0..=19 => sink.put_byte(MAJOR_SIMPLE | code),
		20..=31 => Err(EncodeError::InvalidSimpleType(code)),
		_ => sink.put(&[SIMPLE_U8, code]),
	}
}
