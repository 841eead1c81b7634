use std::str::Utf8Error;

use thiserror::Error;

/// Errors that can occur when decoding CBOR into a [`Value`](crate::Value).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
	/// Additional info 28, 29 or 30 was used.
	#[error("reserved additional info in header byte {0:#04x}")]
	Reserved(u8),
	/// Indefinite length was used where the major type has no such form.
	#[error("indefinite length not allowed in header byte {0:#04x}")]
	IndefiniteNotAllowed(u8),
	/// A negative integer's magnitude does not fit in an [`i64`].
	#[error("negative integer -1-{0} overflows i64")]
	IntegerOverflow(u64),
	/// Half-width floats are decoded only far enough to report them.
	#[error("half-width float {0} is not supported")]
	Float16Unsupported(half::f16),
	#[error("malformed datetime: {0}")]
	MalformedDateTime(String),
	#[error("malformed epoch")]
	MalformedEpoch,
	/// The content item of a known tag has the wrong shape.
	#[error("malformed content for tag {0}")]
	MalformedTag(u64),
	#[error("invalid regular expression: {0}")]
	InvalidRegExp(#[from] regex::Error),
	/// A break code stood where a definite container expected an item, or in place of a map value.
	#[error("unexpected break code")]
	UnexpectedBreak,
	/// Containers and tags nest deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
	#[error("nesting deeper than {0} levels")]
	DepthExceeded(usize),
	#[error("insufficient data")]
	Insufficient,
	#[error("invalid UTF-8: {0}")]
	InvalidUtf8(#[from] Utf8Error),
}

/// Errors that can occur when encoding CBOR.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
	/// The value has no CBOR encoding, e.g. a stray break or indefinite marker inside a container.
	#[error("value of unknown type")]
	UnknownType,
	#[error("output buffer too small: needed {needed} bytes, {available} available")]
	BufferTooSmall { needed: usize, available: usize },
	#[error("small integer {0} outside -24..=23")]
	SmallIntOutOfRange(i8),
	#[error("simple type {0} is not encodable")]
	InvalidSimpleType(u8),
	/// The value nests deeper than [`MAX_DEPTH`](crate::MAX_DEPTH) containers and tags.
	#[error("nesting deeper than {0} levels")]
	DepthExceeded(usize),
}

/// Errors from translating between JSON text and CBOR.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonError {
	#[error("empty text")]
	EmptyText,
	#[error("expected null")]
	ExpectedNil,
	#[error("expected true")]
	ExpectedTrue,
	#[error("expected false")]
	ExpectedFalse,
	#[error("expected token at offset {0}")]
	ExpectedToken(usize),
	#[error("expected string at offset {0}")]
	ExpectedString(usize),
	#[error("expected key at offset {0}")]
	ExpectedKey(usize),
	#[error("expected colon at offset {0}")]
	ExpectedColon(usize),
	#[error("expected ']' at offset {0}")]
	ExpectedCloseArray(usize),
	#[error("expected '}}' at offset {0}")]
	ExpectedCloseObject(usize),
	#[error("expected integer at offset {0}")]
	ExpectedInteger(usize),

	#[error("byte strings have no JSON form")]
	ByteStringUnrepresentable,
	#[error("tags have no JSON form")]
	TagNotSupported,
	/// Arrays and maps must use the indefinite form.
	#[error("expected indefinite container, found header byte {0:#04x}")]
	ExpectedIndefinite(u8),
	#[error("undefined has no JSON form")]
	UndefinedUnrepresentable,
	#[error("simple types have no JSON form")]
	SimpleTypeUnrepresentable,
	#[error("unexpected break code")]
	BreakCodeUnexpected,
	#[error("unassigned major 7 header byte {0:#04x}")]
	UnassignedType7(u8),

	#[error("{0}")]
	Decode(#[from] DecodeError),
	#[error("{0}")]
	Encode(#[from] EncodeError),
}

/// Errors from JSON pointer transcoding and in-place pointer operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PointerError {
	#[error("expected CBOR pointer")]
	ExpectedCborPointer,
	#[error("expected JSON pointer")]
	ExpectedJsonPointer,
	/// A pointer segment does not fit the unescaping scratch space.
	#[error("pointer segment longer than {0} bytes")]
	SegmentTooLong(usize),
	#[error("invalid array offset {0:?}")]
	InvalidArrayOffset(String),
	#[error("invalid pointer")]
	InvalidPointer,
	#[error("no key {0:?}")]
	NoKey(String),
	/// The document uses a container form the pointer engine does not walk.
	#[error("malformed document at offset {0}")]
	MalformedDocument(usize),
	#[error("invalid document at offset {0}")]
	InvalidDocument(usize),
	#[error("{0}")]
	Encode(#[from] EncodeError),
}
