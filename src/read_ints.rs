//! Checked big-endian reads.
//!
//! Each reader takes the bytes following a header byte and returns [`None`] when there are too few of them.

pub(crate) fn read_be_u16(input: &[u8]) -> Option<u16> {
	let bytes = input.get(..2)?;
	Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_be_u32(input: &[u8]) -> Option<u32> {
	let mut bytes = [0u8; 4];
	bytes.copy_from_slice(input.get(..4)?);
	Some(u32::from_be_bytes(bytes))
}

pub(crate) fn read_be_u64(input: &[u8]) -> Option<u64> {
	let mut bytes = [0u8; 8];
	bytes.copy_from_slice(input.get(..8)?);
	Some(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn reads_big_endian() {
		assert_eq!(read_be_u16(&[0x01, 0x02, 0xFF]), Some(0x0102));
		assert_eq!(read_be_u32(&[0x01, 0x02, 0x03, 0x04]), Some(0x01020304));
		assert_eq!(
			read_be_u64(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]),
			Some(0x0102030405060708)
		);
	}

	#[test]
	fn short_input() {
		assert_eq!(read_be_u16(&[0x01]), None);
		assert_eq!(read_be_u32(&[0x01, 0x02, 0x03]), None);
		assert_eq!(read_be_u64(&[0; 7]), None);
	}
}
