//! Pointer operations on encoded documents.
//!
//! The engine walks the encoded bytes directly instead of decoding into a [`Value`](crate::Value).
//! Arrays and maps along the path must use the stream form, which is what the JSON scanner writes.
//! None of the operations modify the input document; each writes a new one to a caller-supplied buffer.

use crate::{
	errors::PointerError,
	pointer::transcode::segments,
	sink::Sink,
	tags::TAG_JSON_STRING,
	text::bytes_as_str,
	wire::{
		header, info, major, read_argument, read_string, BREAK, FLOAT32, FLOAT64, INDEFINITE_ARRAY,
		INDEFINITE_BYTES, INDEFINITE_MAP, INDEFINITE_TEXT, INFO_U16, MAJOR_ARRAY, MAJOR_BYTES,
		MAJOR_MAP, MAJOR_NEGATIVE, MAJOR_SIMPLE, MAJOR_TAG, MAJOR_TEXT, MAJOR_UNSIGNED, SIMPLE_U8,
	},
};

/// Encoded prefix of a [`TAG_JSON_STRING`] tag.
const JSON_STRING_PREFIX: [u8; 3] = [
	header(MAJOR_TAG, INFO_U16),
	(TAG_JSON_STRING >> 8) as u8,
	TAG_JSON_STRING as u8,
];

/// Byte length of the item starting at `doc[offset]`.
///
/// Tags are skipped over along with their content.
/// Arrays and maps of definite length fail with [`PointerError::MalformedDocument`].
/// Truncated items, half-width floats, reserved header bytes and misplaced breaks fail with
/// [`PointerError::InvalidDocument`], as do chunks of an indefinite string that are not definite
/// strings of its major type.
pub fn items_end(doc: &[u8], offset: usize) -> Result<usize, PointerError> {
	// Open stream items, each with the number of items read inside it so far.
	let mut open: Vec<(u8, usize)> = Vec::new();
	let mut pos = offset;
	loop {
		let initial = *doc.get(pos).ok_or(PointerError::InvalidDocument(pos))?;
		if let Some(&(opener, count)) = open.last() {
			let chunked = opener == INDEFINITE_BYTES || opener == INDEFINITE_TEXT;
			match initial {
				// A map cannot close between a key and its value.
				BREAK if opener == INDEFINITE_MAP && count % 2 == 1 => {
					return Err(PointerError::InvalidDocument(pos))
				}
				BREAK => {
					open.pop();
					pos += 1;
					match open.last_mut() {
						Some(parent) => parent.1 += 1,
						None => return Ok(pos - offset),
					}
					continue;
				}
				b if chunked && (major(b) != major(opener) || b == opener) => {
					return Err(PointerError::InvalidDocument(pos))
				}
				_ => (),
			}
		}
		match initial {
			INDEFINITE_ARRAY | INDEFINITE_MAP | INDEFINITE_BYTES | INDEFINITE_TEXT => {
				open.push((initial, 0));
				pos += 1;
				continue;
			}
			_ => match major(initial) {
				MAJOR_ARRAY | MAJOR_MAP => return Err(PointerError::MalformedDocument(pos)),
				MAJOR_TAG => {
					let (_, head) = read_argument(&doc[pos..])
						.map_err(|_| PointerError::InvalidDocument(pos))?;
					pos += head;
					// The content completes the item.
					if doc.get(pos) == Some(&BREAK) {
						return Err(PointerError::InvalidDocument(pos));
					}
					continue;
				}
				MAJOR_UNSIGNED | MAJOR_NEGATIVE => {
					pos += match read_argument(&doc[pos..]) {
						Ok((Some(_), head)) => head,
						_ => return Err(PointerError::InvalidDocument(pos)),
					};
				}
				MAJOR_BYTES | MAJOR_TEXT => {
					let (_, size) =
						read_string(&doc[pos..]).map_err(|_| PointerError::InvalidDocument(pos))?;
					pos += size;
				}
				_ => {
					let size = match initial {
						FLOAT32 => 5,
						FLOAT64 => 9,
						SIMPLE_U8 => 2,
						b if major(b) == MAJOR_SIMPLE && info(b) < 24 => 1,
						_ => return Err(PointerError::InvalidDocument(pos)),
					};
					if pos + size > doc.len() {
						return Err(PointerError::InvalidDocument(pos));
					}
					pos += size;
				}
			},
		}
		match open.last_mut() {
			Some(frame) => frame.1 += 1,
			None => return Ok(pos - offset),
		}
	}
}

/// Where a pointer lands in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Target {
	/// Start of the map entry's key, or of the item itself when it is not a map value.
	start: usize,
	value: usize,
	end: usize,
}

fn walk(doc: &[u8], pointer: &[u8]) -> Result<Target, PointerError> {
	let mut target = Target {
		start: 0,
		value: 0,
		end: items_end(doc, 0)?,
	};
	for segment in segments(pointer)? {
		let segment = segment?;
		target = match doc.get(target.value) {
			Some(&INDEFINITE_ARRAY) => array_step(doc, target.value, segment)?,
			Some(&INDEFINITE_MAP) => map_step(doc, target.value, segment)?,
			Some(&b) if matches!(major(b), MAJOR_ARRAY | MAJOR_MAP) => {
				return Err(PointerError::MalformedDocument(target.value))
			}
			_ => return Err(PointerError::InvalidPointer),
		};
	}
	Ok(target)
}

/// Parse an array reference token; `-` and `-1` select the last element.
fn array_index(segment: &[u8]) -> Result<Option<usize>, PointerError> {
	let invalid = || PointerError::InvalidArrayOffset(String::from_utf8_lossy(segment).into_owned());
	match segment {
		b"-" | b"-1" => Ok(None),
		_ if segment.is_empty() || !segment.iter().all(u8::is_ascii_digit) => Err(invalid()),
		_ => bytes_as_str(segment)
			.ok()
			.and_then(|s| s.parse().ok())
			.map(Some)
			.ok_or_else(invalid),
	}
}

fn array_step(doc: &[u8], array: usize, segment: &[u8]) -> Result<Target, PointerError> {
	let index = array_index(segment)?;
	let mut pos = array + 1;
	let mut last = None;
	let mut i = 0;
	loop {
		match doc.get(pos) {
			Some(&BREAK) => break,
			Some(_) => (),
			None => return Err(PointerError::InvalidDocument(pos)),
		}
		let end = pos + items_end(doc, pos)?;
		let item = Target {
			start: pos,
			value: pos,
			end,
		};
		if index == Some(i) {
			return Ok(item);
		}
		last = Some(item);
		pos = end;
		i += 1;
	}
	match (index, last) {
		(None, Some(item)) => Ok(item),
		_ => Err(PointerError::InvalidArrayOffset(
			String::from_utf8_lossy(segment).into_owned(),
		)),
	}
}

fn map_step(doc: &[u8], map: usize, segment: &[u8]) -> Result<Target, PointerError> {
	let mut pos = map + 1;
	loop {
		match doc.get(pos) {
			Some(&BREAK) => {
				return Err(PointerError::NoKey(
					String::from_utf8_lossy(segment).into_owned(),
				))
			}
			Some(_) => (),
			None => return Err(PointerError::InvalidDocument(pos)),
		}
		let value = pos + items_end(doc, pos)?;
		if doc.get(value) == Some(&BREAK) {
			return Err(PointerError::InvalidDocument(value));
		}
		let end = value + items_end(doc, value)?;
		if key_text(&doc[pos..value]) == Some(segment) {
			return Ok(Target {
				start: pos,
				value,
				end,
			});
		}
		pos = end;
	}
}

/// The payload of a definite text key, looking through a [`TAG_JSON_STRING`] tag.
fn key_text(key: &[u8]) -> Option<&[u8]> {
	let key = key.strip_prefix(&JSON_STRING_PREFIX[..]).unwrap_or(key);
	match key.first() {
		Some(&b) if major(b) == MAJOR_TEXT => read_string(key).ok().map(|(text, _)| text),
		_ => None,
	}
}

/// Write `parts` one after another to `out`, returning the total length.
fn concat(out: &mut [u8], parts: &[&[u8]]) -> Result<usize, PointerError> {
	let mut sink = Sink::new(out);
	for part in parts {
		sink.put(part)?;
	}
	Ok(sink.position())
}

/// Copy the item `pointer` refers to into `out`, returning its length.
///
/// For a map entry only the value is copied.
pub fn get(doc: &[u8], pointer: &[u8], out: &mut [u8]) -> Result<usize, PointerError> {
	let target = walk(doc, pointer)?;
	concat(out, &[&doc[target.value..target.end]])
}

/// Replace the item `pointer` refers to with `item`.
///
/// The new document goes to `new_doc` and the replaced item to `old`.
/// Returns the lengths of both.
pub fn set(
	doc: &[u8],
	pointer: &[u8],
	item: &[u8],
	new_doc: &mut [u8],
	old: &mut [u8],
) -> Result<(usize, usize), PointerError> {
	let target = walk(doc, pointer)?;
	let new_len = concat(new_doc, &[&doc[..target.value], item, &doc[target.end..]])?;
	let old_len = concat(old, &[&doc[target.value..target.end]])?;
	Ok((new_len, old_len))
}

/// Remove the item `pointer` refers to, along with its key if it is a map value.
///
/// The new document goes to `new_doc` and the removed value to `deleted`.
/// Returns the lengths of both.
pub fn del(
	doc: &[u8],
	pointer: &[u8],
	new_doc: &mut [u8],
	deleted: &mut [u8],
) -> Result<(usize, usize), PointerError> {
	let target = walk(doc, pointer)?;
	let new_len = concat(new_doc, &[&doc[..target.start], &doc[target.end..]])?;
	let deleted_len = concat(deleted, &[&doc[target.value..target.end]])?;
	Ok((new_len, deleted_len))
}

/// Insert `item` at the front of the array or map `pointer` refers to, writing the new document to `new_doc`.
///
/// For a map, `item` is an encoded key followed by an encoded value.
pub fn prepend(
	doc: &[u8],
	pointer: &[u8],
	item: &[u8],
	new_doc: &mut [u8],
) -> Result<usize, PointerError> {
	let target = walk(doc, pointer)?;
	match doc[target.value] {
		INDEFINITE_ARRAY | INDEFINITE_MAP => {
			let body = target.value + 1;
			concat(new_doc, &[&doc[..body], item, &doc[body..]])
		}
		b if matches!(major(b), MAJOR_ARRAY | MAJOR_MAP) => {
			Err(PointerError::MalformedDocument(target.value))
		}
		_ => Err(PointerError::InvalidPointer),
	}
}
