//! Semantic tags (major type 6).
//!
//! Tags this crate understands are lifted into dedicated [`Value`] variants when decoding.
//! Any other tag is transparent: the decoder drops it and returns its content item.

use chrono::{DateTime, FixedOffset};
use num_bigint::{BigInt, Sign};
use regex::Regex;

use crate::{
	decode::{decode_at, nested},
	encode::{put_f64, put_int, put_string},
	errors::{DecodeError, EncodeError},
	sink::Sink,
	value::{Fraction, Value},
	wire::{header, put_head, read_definite, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_TAG, MAJOR_TEXT},
};

/// An RFC 3339 datetime as a text string.
pub const TAG_DATE_TIME: u64 = 0;
/// Seconds since the UNIX epoch, as an integer or a float.
pub const TAG_EPOCH: u64 = 1;
pub const TAG_POS_BIGNUM: u64 = 2;
pub const TAG_NEG_BIGNUM: u64 = 3;
pub const TAG_DECIMAL_FRACTION: u64 = 4;
pub const TAG_BIG_FLOAT: u64 = 5;
/// An encoded CBOR data item inside a byte string.
pub const TAG_CBOR_ENC: u64 = 24;
pub const TAG_REGEXP: u64 = 35;
/// The self-describing CBOR marker.
pub const TAG_CBOR_PREFIX: u64 = 55799;
/// Marks the segments of a CBOR pointer.
pub const TAG_JSON_STRING: u64 = 55800;

/// Decode a tagged item, `input[0]` being the tag's header byte.
pub(crate) fn decode_tagged(input: &[u8], depth: usize) -> Result<(Value, usize), DecodeError> {
	let (tag, head) = read_definite(input)?;
	let (content, size) = decode_at(&input[head..], nested(depth)?)?;
	if let Value::Break = content {
		return Err(DecodeError::UnexpectedBreak);
	}
	Ok((from_content(tag, content)?, head + size))
}

fn from_content(tag: u64, content: Value) -> Result<Value, DecodeError> {
	Ok(match (tag, content) {
		(TAG_DATE_TIME, Value::Text(text)) => Value::DateTime(
			DateTime::parse_from_rfc3339(&text)
				.map_err(|e| DecodeError::MalformedDateTime(e.to_string()))?,
		),
		(TAG_DATE_TIME, _) => {
			return Err(DecodeError::MalformedDateTime(
				"content is not a text string".to_owned(),
			))
		}
		(TAG_EPOCH, Value::Unsigned(n)) => {
			Value::Epoch(i64::try_from(n).map_err(|_| DecodeError::MalformedEpoch)?)
		}
		(TAG_EPOCH, Value::Signed(n)) => Value::Epoch(n),
		(TAG_EPOCH, Value::Float64(f)) => Value::EpochMicro(f),
		(TAG_EPOCH, Value::Float32(f)) => Value::EpochMicro(f as f64),
		(TAG_EPOCH, _) => return Err(DecodeError::MalformedEpoch),
		(TAG_POS_BIGNUM, Value::Bytes(magnitude)) => {
			Value::BigInt(BigInt::from_bytes_be(Sign::Plus, &magnitude))
		}
		// The magnitude is negated as-is rather than taken as -1 minus the magnitude.
		(TAG_NEG_BIGNUM, Value::Bytes(magnitude)) => {
			Value::BigInt(-BigInt::from_bytes_be(Sign::Plus, &magnitude))
		}
		(TAG_DECIMAL_FRACTION, Value::Array(items)) => {
			Value::DecimalFraction(fraction(tag, &items)?)
		}
		(TAG_BIG_FLOAT, Value::Array(items)) => Value::BigFloat(fraction(tag, &items)?),
		(TAG_CBOR_ENC, Value::Bytes(bytes)) => Value::EmbeddedCbor(bytes),
		(TAG_REGEXP, Value::Text(pattern)) => Value::RegExp(Regex::new(&pattern)?),
		(TAG_CBOR_PREFIX, Value::Bytes(bytes)) => Value::CborPrefix(bytes),
		(
			TAG_POS_BIGNUM | TAG_NEG_BIGNUM | TAG_DECIMAL_FRACTION | TAG_BIG_FLOAT | TAG_CBOR_ENC
			| TAG_REGEXP | TAG_CBOR_PREFIX,
			_,
		) => return Err(DecodeError::MalformedTag(tag)),
		(_, content) => content,
	})
}

fn fraction(tag: u64, items: &[Value]) -> Result<Fraction, DecodeError> {
	match items {
		[exponent, mantissa] => match (exponent.as_i64(), mantissa.as_i64()) {
			(Some(exponent), Some(mantissa)) => Ok(Fraction::new(exponent, mantissa)),
			_ => Err(DecodeError::MalformedTag(tag)),
		},
		_ => Err(DecodeError::MalformedTag(tag)),
	}
}

fn put_tag(sink: &mut Sink, tag: u64) -> Result<(), EncodeError> {
	put_head(sink, MAJOR_TAG, tag)
}

pub(crate) fn put_date_time(
	sink: &mut Sink,
	dt: &DateTime<FixedOffset>,
) -> Result<(), EncodeError> {
	put_tag(sink, TAG_DATE_TIME)?;
	put_string(sink, MAJOR_TEXT, dt.to_rfc3339().as_bytes())
}

pub(crate) fn put_epoch(sink: &mut Sink, secs: i64) -> Result<(), EncodeError> {
	put_tag(sink, TAG_EPOCH)?;
	put_int(sink, secs)
}

pub(crate) fn put_epoch_micro(sink: &mut Sink, secs: f64) -> Result<(), EncodeError> {
	put_tag(sink, TAG_EPOCH)?;
	put_f64(sink, secs)
}

pub(crate) fn put_bignum(sink: &mut Sink, n: &BigInt) -> Result<(), EncodeError> {
	let (sign, magnitude) = n.to_bytes_be();
	match sign {
		Sign::Minus => put_tag(sink, TAG_NEG_BIGNUM)?,
		Sign::NoSign | Sign::Plus => put_tag(sink, TAG_POS_BIGNUM)?,
	}
	put_string(sink, MAJOR_BYTES, &magnitude)
}

pub(crate) fn put_decimal_fraction(sink: &mut Sink, f: &Fraction) -> Result<(), EncodeError> {
	put_tag(sink, TAG_DECIMAL_FRACTION)?;
	put_fraction(sink, f)
}

pub(crate) fn put_big_float(sink: &mut Sink, f: &Fraction) -> Result<(), EncodeError> {
	put_tag(sink, TAG_BIG_FLOAT)?;
	put_fraction(sink, f)
}

fn put_fraction(sink: &mut Sink, f: &Fraction) -> Result<(), EncodeError> {
	sink.put_byte(header(MAJOR_ARRAY, 2))?;
	put_int(sink, f.exponent)?;
	put_int(sink, f.mantissa)
}

pub(crate) fn put_embedded_cbor(sink: &mut Sink, bytes: &[u8]) -> Result<(), EncodeError> {
	put_tag(sink, TAG_CBOR_ENC)?;
	put_string(sink, MAJOR_BYTES, bytes)
}

pub(crate) fn put_regexp(sink: &mut Sink, re: &Regex) -> Result<(), EncodeError> {
	put_tag(sink, TAG_REGEXP)?;
	put_string(sink, MAJOR_TEXT, re.as_str().as_bytes())
}

pub(crate) fn put_cbor_prefix(sink: &mut Sink, bytes: &[u8]) -> Result<(), EncodeError> {
	put_tag(sink, TAG_CBOR_PREFIX)?;
	put_string(sink, MAJOR_BYTES, bytes)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{decode::decode, encode::encode};

	fn round_trip(value: Value) -> Vec<u8> {
		let mut buf = [0u8; 128];
		let n = encode(&value, &mut buf).unwrap();
		let (decoded, size) = decode(&buf[..n]).unwrap();
		assert_eq!(decoded, value);
		assert_eq!(size, n);
		buf[..n].to_vec()
	}

	#[test]
	fn date_time() {
		let dt = DateTime::parse_from_rfc3339("2013-03-21T20:04:00+01:00").unwrap();
		let bytes = round_trip(Value::DateTime(dt));
		assert_eq!(bytes[0], 0xC0);
		assert_eq!(bytes[1], 0x78);
		assert_eq!(&bytes[3..], b"2013-03-21T20:04:00+01:00");
	}

	#[test]
	fn date_time_malformed() {
		assert!(matches!(
			decode(b"\xC0\x63abc"),
			Err(DecodeError::MalformedDateTime(_))
		));
		assert!(matches!(
			decode(b"\xC0\x01"),
			Err(DecodeError::MalformedDateTime(_))
		));
	}

	#[test]
	fn epoch() {
		assert_eq!(round_trip(Value::Epoch(1363896240)), b"\xC1\x1A\x51\x4B\x67\xB0");
		assert_eq!(round_trip(Value::Epoch(-1)), b"\xC1\x20");
		let bytes = round_trip(Value::EpochMicro(1363896240.5));
		assert_eq!(&bytes[..2], &[0xC1, 0xFB]);
		assert!(matches!(
			decode(b"\xC1\xFA\x3F\x80\x00\x00"),
			Ok((Value::EpochMicro(f), 6)) if f == 1.0
		));
	}

	#[test]
	fn epoch_with_wrong_content() {
		assert!(matches!(
			decode(b"\xC1\x42ab"),
			Err(DecodeError::MalformedEpoch)
		));
		assert!(matches!(
			decode(b"\xC1\x1B\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF"),
			Err(DecodeError::MalformedEpoch)
		));
	}

	#[test]
	fn bignums() {
		let big = BigInt::from(i64::MAX) * BigInt::from(1000);
		let bytes = round_trip(Value::BigInt(big.clone()));
		assert_eq!(bytes[0], 0xC2);
		assert_eq!(bytes[1], 0x4A);
		assert_eq!(bytes.len(), 12);
		assert_eq!(BigInt::from_bytes_be(Sign::Plus, &bytes[2..]), big);

		let bytes = round_trip(Value::BigInt(-big.clone()));
		assert_eq!(bytes[0], 0xC3);
		assert_eq!(BigInt::from_bytes_be(Sign::Plus, &bytes[2..]), big);
	}

	#[test]
	fn negative_bignum_negates_magnitude() {
		assert!(matches!(
			decode(b"\xC3\x41\x05"),
			Ok((Value::BigInt(n), 3)) if n == BigInt::from(-5)
		));
	}

	#[test]
	fn fractions() {
		let bytes = round_trip(Value::DecimalFraction(Fraction::new(-2, 27315)));
		assert_eq!(bytes, b"\xC4\x82\x21\x19\x6A\xB3");
		let bytes = round_trip(Value::BigFloat(Fraction::new(-1, 3)));
		assert_eq!(bytes, b"\xC5\x82\x20\x03");
		assert!(matches!(
			decode(b"\xC4\x9F\x21\x19\x6A\xB3\xFF"),
			Ok((Value::DecimalFraction(Fraction { exponent: -2, mantissa: 27315 }), 7))
		));
		assert!(matches!(
			decode(b"\xC4\x83\x01\x02\x03"),
			Err(DecodeError::MalformedTag(4))
		));
		assert!(matches!(
			decode(b"\xC5\x82\x01\x61a"),
			Err(DecodeError::MalformedTag(5))
		));
	}

	#[test]
	fn embedded_and_prefix() {
		assert_eq!(
			round_trip(Value::EmbeddedCbor(vec![0x64, b'I', b'E', b'T', b'F'])),
			b"\xD8\x18\x45\x64IETF"
		);
		assert_eq!(
			round_trip(Value::CborPrefix(vec![0x01])),
			b"\xD9\xD9\xF7\x41\x01"
		);
		assert!(matches!(
			decode(b"\xD8\x18\x01"),
			Err(DecodeError::MalformedTag(24))
		));
	}

	#[test]
	fn regexp() {
		let bytes = round_trip(Value::RegExp(Regex::new("a+[0-9]").unwrap()));
		assert_eq!(bytes, b"\xD8\x23\x67a+[0-9]");
		assert!(matches!(
			decode(b"\xD8\x23\x61("),
			Err(DecodeError::InvalidRegExp(_))
		));
	}

	#[test]
	fn unknown_tag_is_transparent() {
		assert!(matches!(decode(b"\xD8\x20\x61x"), Ok((Value::Text(t), 4)) if t == "x"));
		assert!(matches!(
			decode(b"\xD9\xD9\xF8\x62ab"),
			Ok((Value::Text(t), 6)) if t == "ab"
		));
	}
}
