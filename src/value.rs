//! The decoded value model.
//!
//! A [`Value`] is one CBOR data item, with the semantic tags this crate understands lifted into their own variants.
//! It is comparable to a DOM in the XML world: easy to explore, at the cost of materializing the whole item.

use chrono::{DateTime, FixedOffset};
use num_bigint::BigInt;
use regex::Regex;

/// The `(exponent, mantissa)` pair of a decimal fraction or bigfloat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
	pub exponent: i64,
	pub mantissa: i64,
}

impl Fraction {
	pub fn new(exponent: i64, mantissa: i64) -> Self {
		Fraction { exponent, mantissa }
	}
}

/// An item in the CBOR data model.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Value {
	Null,
	Bool(bool),
	/// Distinct from [`Value::Null`].
	Undefined,
	/// An unsigned integer.
	///
	/// Decoding always produces this variant for major type 0, however small the value.
	Unsigned(u64),
	/// A signed integer.
	///
	/// Decoding produces this variant for major type 1 only.
	/// Encoding a non-negative one produces major type 0.
	Signed(i64),
	Float32(f32),
	Float64(f64),
	/// A byte string.
	Bytes(Vec<u8>),
	/// A text string.
	Text(String),
	/// An array.
	Array(Vec<Value>),
	/// A map.
	///
	/// This uses a [`Vec`] because keys need not be unique on the wire, and their order is kept.
	Map(Vec<(Value, Value)>),
	/// A CBOR simple value outside the assigned range 20..=31.
	Simple(u8),
	/// The opener byte of an indefinite-length item.
	///
	/// The decoder does not collect the chunks of indefinite strings;
	/// it reports the opener and leaves the rest to the caller.
	Indefinite(u8),
	/// The end of an indefinite-length item.
	Break,
	/// Tag 0: an RFC 3339 datetime.
	DateTime(DateTime<FixedOffset>),
	/// Tag 1 with an integer: seconds since the UNIX epoch.
	Epoch(i64),
	/// Tag 1 with a float: seconds since the UNIX epoch, with sub-second precision.
	EpochMicro(f64),
	/// Tags 2 and 3: a bignum.
	BigInt(BigInt),
	/// Tag 4.
	DecimalFraction(Fraction),
	/// Tag 5.
	BigFloat(Fraction),
	/// Tag 24: an embedded CBOR data item, kept undecoded.
	EmbeddedCbor(Vec<u8>),
	/// Tag 35.
	RegExp(Regex),
	/// Tag 55799 followed by a byte string.
	CborPrefix(Vec<u8>),
}

impl Value {
	/// Interpret the argument of a negative integer, whose value is -1 minus the argument.
	///
	/// # Overflow behavior
	///
	/// On overflow, this function will panic if overflow checks are enabled (default in debug mode)
	/// and wrap if overflow checks are disabled (default in release mode).
	pub fn interpret_signed(val: u64) -> i64 {
		-1 - (val as i64)
	}

	/// Interpret the argument of a negative integer.
	///
	/// # Overflow behavior
	///
	/// On overflow, this function will return [`None`].
	pub fn interpret_signed_checked(val: u64) -> Option<i64> {
		match val {
			n if n <= i64::MAX as u64 => Some(-1 - (n as i64)),
			_ => None,
		}
	}

	/// Interpret the argument of a negative integer.
	///
	/// # Overflow behavior
	///
	/// This function does not overflow, because it returns an [`i128`].
	pub fn interpret_signed_wide(val: u64) -> i128 {
		-1 - (val as i128)
	}

	/// Create a [`Value::Signed`] or [`Value::Unsigned`] value, the way decoding would produce it.
	pub fn create_signed(val: i64) -> Value {
		if val.is_negative() {
			Value::Signed(val)
		} else {
			Value::Unsigned(val as _)
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_u64(&self) -> Option<u64> {
		match *self {
			Value::Unsigned(n) => Some(n),
			Value::Signed(n) => u64::try_from(n).ok(),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match *self {
			Value::Unsigned(n) => i64::try_from(n).ok(),
			Value::Signed(n) => Some(n),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match *self {
			Value::Float32(f) => Some(f as f64),
			Value::Float64(f) => Some(f),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Value::Bytes(b) => Some(b),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&[(Value, Value)]> {
		match self {
			Value::Map(entries) => Some(entries),
			_ => None,
		}
	}

	/// Resolve a JSON pointer (RFC 6901) against this value.
	///
	/// Array indices `-` and `-1` both name the last element.
	/// Map lookups compare against text keys and take the first match.
	pub fn pointer(&self, pointer: &str) -> Option<&Value> {
		if pointer.is_empty() {
			return Some(self);
		}
		let rest = pointer.strip_prefix('/')?;
		let mut target = self;
		for segment in rest.split('/') {
			let segment = segment.replace("~1", "/").replace("~0", "~");
			target = match target {
				Value::Array(items) => match segment.as_str() {
					"-" | "-1" => items.last()?,
					index if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
						items.get(index.parse::<usize>().ok()?)?
					}
					_ => return None,
				},
				Value::Map(entries) => entries
					.iter()
					.find(|(key, _)| key.as_str() == Some(segment.as_str()))
					.map(|(_, value)| value)?,
				_ => return None,
			};
		}
		Some(target)
	}
}

impl PartialEq for Value {
	/// Integers compare by value across [`Value::Unsigned`] and [`Value::Signed`].
	/// Floats compare by bit pattern, so a NaN equals itself.
	/// Regular expressions compare by pattern text.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null)
			| (Value::Undefined, Value::Undefined)
			| (Value::Break, Value::Break) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Unsigned(a), Value::Unsigned(b)) => a == b,
			(Value::Signed(a), Value::Signed(b)) => a == b,
			(Value::Unsigned(a), Value::Signed(b)) | (Value::Signed(b), Value::Unsigned(a)) => {
				u64::try_from(*b).ok() == Some(*a)
			}
			(Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
			(Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
			(Value::Bytes(a), Value::Bytes(b)) => a == b,
			(Value::Text(a), Value::Text(b)) => a == b,
			(Value::Array(a), Value::Array(b)) => a == b,
			(Value::Map(a), Value::Map(b)) => a == b,
			(Value::Simple(a), Value::Simple(b)) => a == b,
			(Value::Indefinite(a), Value::Indefinite(b)) => a == b,
			(Value::DateTime(a), Value::DateTime(b)) => a == b,
			(Value::Epoch(a), Value::Epoch(b)) => a == b,
			(Value::EpochMicro(a), Value::EpochMicro(b)) => a.to_bits() == b.to_bits(),
			(Value::BigInt(a), Value::BigInt(b)) => a == b,
			(Value::DecimalFraction(a), Value::DecimalFraction(b)) => a == b,
			(Value::BigFloat(a), Value::BigFloat(b)) => a == b,
			(Value::EmbeddedCbor(a), Value::EmbeddedCbor(b)) => a == b,
			(Value::RegExp(a), Value::RegExp(b)) => a.as_str() == b.as_str(),
			(Value::CborPrefix(a), Value::CborPrefix(b)) => a == b,
			_ => false,
		}
	}
}

macro_rules! from_unsigned {
	($($t:ty),*) => {
		$(impl From<$t> for Value {
			fn from(n: $t) -> Self {
				Value::Unsigned(n as u64)
			}
		})*
	};
}

macro_rules! from_signed {
	($($t:ty),*) => {
		$(impl From<$t> for Value {
			fn from(n: $t) -> Self {
				Value::Signed(n as i64)
			}
		})*
	};
}

from_unsigned!(u8, u16, u32, u64);
from_signed!(i8, i16, i32, i64);

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<f32> for Value {
	fn from(f: f32) -> Self {
		Value::Float32(f)
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float64(f)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Text(s.to_owned())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Text(s)
	}
}

impl From<Vec<u8>> for Value {
	fn from(b: Vec<u8>) -> Self {
		Value::Bytes(b)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Value::Array(items)
	}
}

impl From<BigInt> for Value {
	fn from(n: BigInt) -> Self {
		Value::BigInt(n)
	}
}

impl From<Regex> for Value {
	fn from(re: Regex) -> Self {
		Value::RegExp(re)
	}
}

impl From<DateTime<FixedOffset>> for Value {
	fn from(dt: DateTime<FixedOffset>) -> Self {
		Value::DateTime(dt)
	}
}
