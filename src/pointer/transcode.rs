//! Conversion between JSON pointers (RFC 6901) and CBOR pointers.
//!
//! A CBOR pointer is an indefinite-length text string whose chunks are each tagged [`TAG_JSON_STRING`]
//! and hold one unescaped reference token:
//!
//! ```text
//! 0x7F (0xD9 0xD9 0xF8 <text string>)* 0xFF
//! ```

use crate::{
	encode::put_string,
	errors::PointerError,
	sink::{fill_vec, Sink},
	tags::TAG_JSON_STRING,
	wire::{major, put_head, read_definite, read_string, BREAK, INDEFINITE_TEXT, MAJOR_TAG, MAJOR_TEXT},
};

/// Longest reference token, after unescaping, that [`from_json_pointer`] accepts.
pub const MAX_SEGMENT_LEN: usize = 1024;

/// Convert a JSON pointer to a CBOR pointer, returning the number of bytes written to `out`.
///
/// The empty pointer refers to the whole document and converts to `0x7F 0xFF`.
/// A `~` must be followed by `0` or `1`.
pub fn from_json_pointer(path: &str, out: &mut [u8]) -> Result<usize, PointerError> {
	let mut sink = Sink::new(out);
	sink.put_byte(INDEFINITE_TEXT)?;
	if !path.is_empty() {
		let tokens = path
			.strip_prefix('/')
			.ok_or(PointerError::ExpectedJsonPointer)?;
		let mut scratch = [0u8; MAX_SEGMENT_LEN];
		for token in tokens.split('/') {
			let len = unescape(token.as_bytes(), &mut scratch)?;
			put_head(&mut sink, MAJOR_TAG, TAG_JSON_STRING)?;
			put_string(&mut sink, MAJOR_TEXT, &scratch[..len])?;
		}
	}
	sink.put_byte(BREAK)?;
	Ok(sink.position())
}

/// Convert a JSON pointer to a CBOR pointer in a freshly allocated buffer.
pub fn from_json_pointer_to_vec(path: &str) -> Result<Vec<u8>, PointerError> {
	fill_vec(path.len() + 2, |out| from_json_pointer(path, out))
}

/// Convert a CBOR pointer back to a JSON pointer, returning the number of bytes written to `out`.
pub fn to_json_pointer(pointer: &[u8], out: &mut [u8]) -> Result<usize, PointerError> {
	let mut sink = Sink::new(out);
	for segment in segments(pointer)? {
		sink.put_byte(b'/')?;
		for &b in segment? {
			match b {
				b'~' => sink.put(b"~0")?,
				b'/' => sink.put(b"~1")?,
				b => sink.put_byte(b)?,
			}
		}
	}
	Ok(sink.position())
}

fn unescape(token: &[u8], scratch: &mut [u8]) -> Result<usize, PointerError> {
	let mut len = 0;
	let mut bytes = token.iter();
	while let Some(&b) = bytes.next() {
		let b = match b {
			b'~' => match bytes.next() {
				Some(b'0') => b'~',
				Some(b'1') => b'/',
				_ => return Err(PointerError::ExpectedJsonPointer),
			},
			b => b,
		};
		*scratch
			.get_mut(len)
			.ok_or(PointerError::SegmentTooLong(MAX_SEGMENT_LEN))? = b;
		len += 1;
	}
	Ok(len)
}

/// Iterate over the reference tokens of a CBOR pointer.
pub(crate) fn segments(pointer: &[u8]) -> Result<Segments<'_>, PointerError> {
	match pointer.first() {
		Some(&INDEFINITE_TEXT) => Ok(Segments {
			pointer,
			pos: 1,
			done: false,
		}),
		_ => Err(PointerError::ExpectedCborPointer),
	}
}

pub(crate) struct Segments<'p> {
	pointer: &'p [u8],
	pos: usize,
	done: bool,
}

impl<'p> Segments<'p> {
	fn segment(&mut self) -> Result<Option<&'p [u8]>, PointerError> {
		let rest = &self.pointer[self.pos..];
		match rest.first() {
			Some(&BREAK) => return Ok(None),
			Some(&b) if major(b) == MAJOR_TAG => (),
			_ => return Err(PointerError::ExpectedCborPointer),
		}
		let (tag, head) = read_definite(rest).map_err(|_| PointerError::ExpectedCborPointer)?;
		let chunk = &rest[head..];
		if tag != TAG_JSON_STRING || chunk.first().map(|&b| major(b)) != Some(MAJOR_TEXT) {
			return Err(PointerError::ExpectedCborPointer);
		}
		let (token, size) = read_string(chunk).map_err(|_| PointerError::ExpectedCborPointer)?;
		self.pos += head + size;
		Ok(Some(token))
	}
}

impl<'p> Iterator for Segments<'p> {
	type Item = Result<&'p [u8], PointerError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		let segment = self.segment();
		if !matches!(segment, Ok(Some(_))) {
			self.done = true;
		}
		segment.transpose()
	}
}
