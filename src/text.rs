//! Character classes for the JSON scanner, and borrowing conversions between bytes and text.

use std::str::Utf8Error;

use bstr::decode_utf8;

use crate::config::SpaceKind;

/// Byte is an ASCII digit.
pub(crate) const DIGIT: u8 = 1;
/// Byte can appear in a JSON number.
pub(crate) const NUMBER: u8 = 2;
/// Byte marks a number as fractional or exponential.
pub(crate) const FRACTION: u8 = 4;

pub(crate) static NUMBER_CLASS: [u8; 256] = number_class_table();

const fn number_class_table() -> [u8; 256] {
	let mut table = [0u8; 256];
	let mut b = b'0';
	while b <= b'9' {
		table[b as usize] = DIGIT | NUMBER;
		b += 1;
	}
	table[b'+' as usize] = NUMBER;
	table[b'-' as usize] = NUMBER;
	table[b'.' as usize] = NUMBER | FRACTION;
	table[b'e' as usize] = NUMBER | FRACTION;
	table[b'E' as usize] = NUMBER | FRACTION;
	table
}

/// HT, LF, VT, FF, CR and SP.
pub(crate) fn is_ansi_space(b: u8) -> bool {
	matches!(b, b'\t' | b'\n' | 0x0B | 0x0C | b'\r' | b' ')
}

/// Number of white-space bytes at the start of `input`.
pub(crate) fn space_len(input: &[u8], kind: SpaceKind) -> usize {
	match kind {
		SpaceKind::AnsiSpace => input.iter().take_while(|&&b| is_ansi_space(b)).count(),
		SpaceKind::UnicodeSpace => {
			let mut pos = 0;
			while pos < input.len() {
				if input[pos] < 0x80 {
					if !is_ansi_space(input[pos]) {
						break;
					}
					pos += 1;
				} else {
					match decode_utf8(&input[pos..]) {
						(Some(c), size) if c.is_whitespace() => pos += size,
						_ => break,
					}
				}
			}
			pos
		}
	}
}

/// View a byte slice as text without copying.
pub fn bytes_as_str(bytes: &[u8]) -> Result<&str, Utf8Error> {
	std::str::from_utf8(bytes)
}

/// View text as a byte slice without copying.
pub fn str_as_bytes(text: &str) -> &[u8] {
	text.as_bytes()
}
