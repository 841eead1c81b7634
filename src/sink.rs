use crate::errors::{EncodeError, JsonError, PointerError};

/// A cursor over a caller-supplied output buffer.
///
/// Writes past the end of the buffer fail with [`EncodeError::BufferTooSmall`] instead of panicking.
#[derive(Debug)]
pub(crate) struct Sink<'a> {
	buf: &'a mut [u8],
	pos: usize,
}

impl<'a> Sink<'a> {
	pub fn new(buf: &'a mut [u8]) -> Self {
		Sink { buf, pos: 0 }
	}

	/// Number of bytes written so far.
	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn put(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
		let end = self.pos + bytes.len();
		if end > self.buf.len() {
			return Err(EncodeError::BufferTooSmall {
				needed: end,
				available: self.buf.len(),
			});
		}
		self.buf[self.pos..end].copy_from_slice(bytes);
		self.pos = end;
		Ok(())
	}

	pub fn put_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
		self.put(&[byte])
	}
}

/// Errors that may report an output buffer overrun.
pub(crate) trait Overrun {
	/// The buffer size the failed write needed, if that is why it failed.
	fn needed(&self) -> Option<usize>;
}

impl Overrun for EncodeError {
	fn needed(&self) -> Option<usize> {
		match self {
			EncodeError::BufferTooSmall { needed, .. } => Some(*needed),
			_ => None,
		}
	}
}

impl Overrun for JsonError {
	fn needed(&self) -> Option<usize> {
		match self {
			JsonError::Encode(e) => e.needed(),
			_ => None,
		}
	}
}

impl Overrun for PointerError {
	fn needed(&self) -> Option<usize> {
		match self {
			PointerError::Encode(e) => e.needed(),
			_ => None,
		}
	}
}

/// Run `fill` against a growing buffer until its output fits, then return the output.
pub(crate) fn fill_vec<E: Overrun>(
	initial: usize,
	mut fill: impl FnMut(&mut [u8]) -> Result<usize, E>,
) -> Result<Vec<u8>, E> {
	let mut buf = vec![0u8; initial.max(1)];
	loop {
		match fill(&mut buf) {
			Ok(n) => {
				buf.truncate(n);
				return Ok(buf);
			}
			Err(e) => match e.needed() {
				Some(needed) => {
					let len = needed.max(buf.len() * 2);
					buf.resize(len, 0);
				}
				None => return Err(e),
			},
		}
	}
}
