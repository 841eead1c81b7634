//! JSON text to CBOR.

use bstr::decode_utf8;

use crate::{
	config::{Config, NumberKind},
	decode::nested,
	encode::{put_f64, put_int, put_string},
	errors::JsonError,
	sink::{fill_vec, Sink},
	text::{bytes_as_str, space_len, DIGIT, FRACTION, NUMBER, NUMBER_CLASS},
	wire::{
		put_head, BREAK, INDEFINITE_ARRAY, INDEFINITE_MAP, MAJOR_TEXT, MAJOR_UNSIGNED, SIMPLE_FALSE,
		SIMPLE_NULL, SIMPLE_TRUE,
	},
};

impl Config {
	/// Translate the JSON value at the start of `text` into CBOR, writing it to `out`.
	///
	/// Arrays and objects always come out in the stream form.
	/// Numbers follow [`Config::number_kind`] and white space follows [`Config::space_kind`].
	///
	/// Returns the text after the value and any white space following it,
	/// along with the number of bytes written.
	pub fn parse_json<'t, T: AsRef<[u8]> + ?Sized>(
		&self,
		text: &'t T,
		out: &mut [u8],
	) -> Result<(&'t [u8], usize), JsonError> {
		let text = text.as_ref();
		let mut scanner = Scanner {
			config: self,
			text,
			pos: 0,
			sink: Sink::new(out),
		};
		scanner.skip_space();
		if scanner.pos == text.len() {
			return Err(JsonError::EmptyText);
		}
		scanner.run()?;
		scanner.skip_space();
		Ok((&text[scanner.pos..], scanner.sink.position()))
	}

	/// Like [`Config::parse_json`], but into a freshly allocated buffer.
	pub fn parse_json_to_vec<'t, T: AsRef<[u8]> + ?Sized>(
		&self,
		text: &'t T,
	) -> Result<(&'t [u8], Vec<u8>), JsonError> {
		let mut rest: &'t [u8] = &[];
		let cbor = fill_vec(text.as_ref().len() + 16, |out| {
			let (remaining, n) = self.parse_json(text, out)?;
			rest = remaining;
			Ok::<_, JsonError>(n)
		})?;
		Ok((rest, cbor))
	}
}

/// Translate JSON text to CBOR with the default configuration.
pub fn parse_json<'t, T: AsRef<[u8]> + ?Sized>(
	text: &'t T,
	out: &mut [u8],
) -> Result<(&'t [u8], usize), JsonError> {
	Config::default().parse_json(text, out)
}

/// Translate JSON text to CBOR with the default configuration, into a freshly allocated buffer.
pub fn parse_json_to_vec<T: AsRef<[u8]> + ?Sized>(text: &T) -> Result<(&[u8], Vec<u8>), JsonError> {
	Config::default().parse_json_to_vec(text)
}

#[derive(Debug, Clone, Copy)]
enum Frame {
	Array,
	Object,
}

struct Scanner<'c, 't, 'o> {
	config: &'c Config,
	text: &'t [u8],
	pos: usize,
	sink: Sink<'o>,
}

impl<'c, 't, 'o> Scanner<'c, 't, 'o> {
	fn peek(&self) -> Option<u8> {
		self.text.get(self.pos).copied()
	}

	fn skip_space(&mut self) {
		self.pos += space_len(&self.text[self.pos..], self.config.space_kind());
	}

	/// Scan one complete value, keeping open containers on an explicit stack.
	///
	/// The stack is held to the depth [`decode`](crate::decode) accepts.
	fn run(&mut self) -> Result<(), JsonError> {
		let mut stack = Vec::new();
		loop {
			self.skip_space();
			match self.peek() {
				Some(b'[') => {
					nested(stack.len())?;
					self.pos += 1;
					self.sink.put_byte(INDEFINITE_ARRAY)?;
					self.skip_space();
					if self.peek() == Some(b']') {
						self.pos += 1;
						self.sink.put_byte(BREAK)?;
					} else {
						stack.push(Frame::Array);
						continue;
					}
				}
				Some(b'{') => {
					nested(stack.len())?;
					self.pos += 1;
					self.sink.put_byte(INDEFINITE_MAP)?;
					self.skip_space();
					if self.peek() == Some(b'}') {
						self.pos += 1;
						self.sink.put_byte(BREAK)?;
					} else {
						stack.push(Frame::Object);
						self.key()?;
						continue;
					}
				}
				_ => self.scalar()?,
			}

			// A value is complete; close whatever containers end here.
			loop {
				let frame = match stack.last() {
					Some(&frame) => frame,
					None => return Ok(()),
				};
				self.skip_space();
				match (frame, self.peek()) {
					(_, Some(b',')) => {
						self.pos += 1;
						if let Frame::Object = frame {
							self.key()?;
						}
						break;
					}
					(Frame::Array, Some(b']')) | (Frame::Object, Some(b'}')) => {
						self.pos += 1;
						self.sink.put_byte(BREAK)?;
						stack.pop();
					}
					(Frame::Array, _) => return Err(JsonError::ExpectedCloseArray(self.pos)),
					(Frame::Object, _) => return Err(JsonError::ExpectedCloseObject(self.pos)),
				}
			}
		}
	}

	/// Scan an object key and the colon after it.
	fn key(&mut self) -> Result<(), JsonError> {
		self.skip_space();
		if self.peek() != Some(b'"') {
			return Err(JsonError::ExpectedKey(self.pos));
		}
		self.string()?;
		self.skip_space();
		if self.peek() != Some(b':') {
			return Err(JsonError::ExpectedColon(self.pos));
		}
		self.pos += 1;
		Ok(())
	}

	fn scalar(&mut self) -> Result<(), JsonError> {
		match self.peek() {
			Some(b'n') => self.literal(b"null", SIMPLE_NULL, JsonError::ExpectedNil),
			Some(b't') => self.literal(b"true", SIMPLE_TRUE, JsonError::ExpectedTrue),
			Some(b'f') => self.literal(b"false", SIMPLE_FALSE, JsonError::ExpectedFalse),
			Some(b'"') => self.string(),
			Some(b) if b == b'-' || NUMBER_CLASS[b as usize] & DIGIT != 0 => self.number(),
			_ => Err(JsonError::ExpectedToken(self.pos)),
		}
	}

	fn literal(&mut self, word: &[u8], byte: u8, err: JsonError) -> Result<(), JsonError> {
		if !self.text[self.pos..].starts_with(word) {
			return Err(err);
		}
		self.pos += word.len();
		self.sink.put_byte(byte)?;
		Ok(())
	}

	fn number(&mut self) -> Result<(), JsonError> {
		let start = self.pos;
		let mut fractional = false;
		while let Some(b) = self.peek() {
			let class = NUMBER_CLASS[b as usize];
			if class & NUMBER == 0 {
				break;
			}
			fractional |= class & FRACTION != 0;
			self.pos += 1;
		}
		let token = &self.text[start..self.pos];
		if !is_json_number(token) {
			return Err(JsonError::ExpectedToken(start));
		}
		// The grammar check leaves only ASCII.
		let token = bytes_as_str(token).map_err(|_| JsonError::ExpectedToken(start))?;

		match self.config.number_kind() {
			NumberKind::FloatNumber => self.float(token, start),
			NumberKind::IntNumber if fractional => Err(JsonError::ExpectedInteger(start)),
			NumberKind::SmartNumber if fractional => self.float(token, start),
			kind => {
				if let Ok(n) = token.parse::<i64>() {
					put_int(&mut self.sink, n)?;
				} else if let Ok(n) = token.parse::<u64>() {
					put_head(&mut self.sink, MAJOR_UNSIGNED, n)?;
				} else if kind == NumberKind::SmartNumber {
					return self.float(token, start);
				} else {
					return Err(JsonError::ExpectedInteger(start));
				}
				Ok(())
			}
		}
	}

	fn float(&mut self, token: &str, start: usize) -> Result<(), JsonError> {
		let f = token.parse::<f64>().map_err(|_| JsonError::ExpectedToken(start))?;
		put_f64(&mut self.sink, f)?;
		Ok(())
	}

	fn string(&mut self) -> Result<(), JsonError> {
		let start = self.pos + 1;
		let plain = self.text[start..]
			.iter()
			.take_while(|&&b| b != b'"' && b != b'\\' && (0x20..0x80).contains(&b))
			.count();
		let end = start + plain;
		if self.text.get(end) == Some(&b'"') {
			put_string(&mut self.sink, MAJOR_TEXT, &self.text[start..end])?;
			self.pos = end + 1;
			return Ok(());
		}

		let mut unquoted: String = self.text[start..end].iter().map(|&b| b as char).collect();
		self.pos = end;
		loop {
			match self.peek() {
				None => return Err(JsonError::ExpectedString(self.pos)),
				Some(b'"') => {
					self.pos += 1;
					break;
				}
				Some(b'\\') => {
					self.pos += 1;
					let c = self.escape()?;
					unquoted.push(c);
				}
				Some(b) if b < 0x20 => return Err(JsonError::ExpectedString(self.pos)),
				Some(b) if b < 0x80 => {
					unquoted.push(b as char);
					self.pos += 1;
				}
				Some(_) => {
					let (c, size) = decode_utf8(&self.text[self.pos..]);
					unquoted.push(c.unwrap_or(char::REPLACEMENT_CHARACTER));
					self.pos += size;
				}
			}
		}
		put_string(&mut self.sink, MAJOR_TEXT, unquoted.as_bytes())?;
		Ok(())
	}

	/// Decode the escape sequence after a backslash.
	fn escape(&mut self) -> Result<char, JsonError> {
		let c = match self.peek() {
			Some(b'"') => '"',
			Some(b'\\') => '\\',
			Some(b'/') => '/',
			Some(b'b') => '\u{8}',
			Some(b'f') => '\u{c}',
			Some(b'n') => '\n',
			Some(b'r') => '\r',
			Some(b't') => '\t',
			Some(b'u') => {
				self.pos += 1;
				return self.unicode_escape();
			}
			_ => return Err(JsonError::ExpectedString(self.pos)),
		};
		self.pos += 1;
		Ok(c)
	}

	/// Decode the hex digits of a `\u` escape, pairing surrogates.
	fn unicode_escape(&mut self) -> Result<char, JsonError> {
		let unit = self.hex4()?;
		let c = match unit {
			0xD800..=0xDBFF => {
				let rest = &self.text[self.pos..];
				match rest.get(2..6).and_then(parse_hex4) {
					Some(low @ 0xDC00..=0xDFFF) if rest.starts_with(b"\\u") => {
						self.pos += 6;
						let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
						char::from_u32(code)
					}
					_ => None,
				}
			}
			unit => char::from_u32(unit),
		};
		Ok(c.unwrap_or(char::REPLACEMENT_CHARACTER))
	}

	fn hex4(&mut self) -> Result<u32, JsonError> {
		let unit = self
			.text
			.get(self.pos..self.pos + 4)
			.and_then(parse_hex4)
			.ok_or(JsonError::ExpectedString(self.pos))?;
		self.pos += 4;
		Ok(unit)
	}
}

fn parse_hex4(digits: &[u8]) -> Option<u32> {
	digits.iter().try_fold(0, |acc, &b| {
		let digit = (b as char).to_digit(16)?;
		Some(acc << 4 | digit)
	})
}

fn skip_digits(token: &[u8], mut i: usize) -> usize {
	while token.get(i).map_or(false, u8::is_ascii_digit) {
		i += 1;
	}
	i
}

/// Whether `token` is exactly one number in JSON's grammar.
fn is_json_number(token: &[u8]) -> bool {
	let mut i = 0;
	if token.first() == Some(&b'-') {
		i += 1;
	}
	match token.get(i) {
		Some(b'0') => i += 1,
		Some(b'1'..=b'9') => i = skip_digits(token, i + 1),
		_ => return false,
	}
	if token.get(i) == Some(&b'.') {
		let digits = i + 1;
		i = skip_digits(token, digits);
		if i == digits {
			return false;
		}
	}
	if let Some(b'e' | b'E') = token.get(i) {
		i += 1;
		if let Some(b'+' | b'-') = token.get(i) {
			i += 1;
		}
		let digits = i;
		i = skip_digits(token, digits);
		if i == digits {
			return false;
		}
	}
	i == token.len()
}
