// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Unsigned LEB128 varints.
//!
//! Seven value bits per byte, least significant group first, high bit set
//! on every byte except the last. A `u64` occupies at most ten bytes.

use std::io::Read;

use basalt_type::{Error, Result};

/// Maximum encoded length of a `u64`.
pub const MAX_UVARINT_LEN: usize = 10;

/// Number of bytes `value` occupies once encoded.
pub fn uvarint_len(value: u64) -> usize {
	let mut value = value;
	let mut len = 1;
	while value >= 0x80 {
		value >>= 7;
		len += 1;
	}
	len
}

/// Append the LEB128 encoding of `value` to `buf`.
pub fn write_uvarint(buf: &mut Vec<u8>, value: u64) {
	let mut value = value;
	while value >= 0x80 {
		buf.push((value as u8 & 0x7f) | 0x80);
		value >>= 7;
	}
	buf.push(value as u8);
}

/// Decode a varint from the front of `data`, returning the value and the
/// number of bytes consumed.
pub fn read_uvarint(data: &[u8]) -> Result<(u64, usize)> {
	let mut value = 0u64;
	let mut shift = 0u32;

	for (i, &byte) in data.iter().enumerate() {
		if shift >= 64 {
			return Err(Error::Format {
				message: "varint exceeds 64 bits".to_string(),
			});
		}
		let bits = (byte & 0x7f) as u64;
		if shift == 63 && bits > 1 {
			return Err(Error::Format {
				message: "varint exceeds 64 bits".to_string(),
			});
		}
		value |= bits << shift;

		if byte & 0x80 == 0 {
			return Ok((value, i + 1));
		}
		shift += 7;
	}

	Err(Error::Format {
		message: "truncated varint".to_string(),
	})
}

/// Decode a varint read byte-wise from a stream.
///
/// I/O failures map to `Transport`; malformed encodings to `Format`.
pub fn read_uvarint_from(r: &mut impl Read) -> Result<u64> {
	let mut value = 0u64;
	let mut shift = 0u32;

	loop {
		let mut byte = [0u8; 1];
		r.read_exact(&mut byte)?;
		let byte = byte[0];

		if shift >= 64 {
			return Err(Error::Format {
				message: "varint exceeds 64 bits".to_string(),
			});
		}
		let bits = (byte & 0x7f) as u64;
		if shift == 63 && bits > 1 {
			return Err(Error::Format {
				message: "varint exceeds 64 bits".to_string(),
			});
		}
		value |= bits << shift;

		if byte & 0x80 == 0 {
			return Ok(value);
		}
		shift += 7;
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	fn round_trip(value: u64) -> Vec<u8> {
		let mut buf = Vec::new();
		write_uvarint(&mut buf, value);
		assert_eq!(buf.len(), uvarint_len(value));

		let (decoded, read) = read_uvarint(&buf).unwrap();
		assert_eq!(decoded, value);
		assert_eq!(read, buf.len());
		buf
	}

	#[test]
	fn test_single_byte_values() {
		assert_eq!(round_trip(0), vec![0x00]);
		assert_eq!(round_trip(1), vec![0x01]);
		assert_eq!(round_trip(127), vec![0x7f]);
	}

	#[test]
	fn test_boundary_values() {
		assert_eq!(round_trip(128), vec![0x80, 0x01]);
		assert_eq!(round_trip(300), vec![0xac, 0x02]);
		round_trip(16383);
		round_trip(16384);
		round_trip(u32::MAX as u64);
		round_trip(u64::MAX);
	}

	#[test]
	fn test_max_length() {
		let mut buf = Vec::new();
		write_uvarint(&mut buf, u64::MAX);
		assert_eq!(buf.len(), MAX_UVARINT_LEN);
	}

	#[test]
	fn test_truncated() {
		let err = read_uvarint(&[0x80]).unwrap_err();
		assert!(matches!(err, Error::Format { .. }));

		let err = read_uvarint(&[]).unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
	}

	#[test]
	fn test_overlong_rejected() {
		// Eleven continuation bytes can never be a valid u64
		let overlong = [0xff; 11];
		let err = read_uvarint(&overlong).unwrap_err();
		assert!(matches!(err, Error::Format { .. }));

		// Ten bytes whose top group overflows bit 63
		let overflow = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
		let err = read_uvarint(&overflow).unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
	}

	#[test]
	fn test_read_from_stream() {
		let mut buf = Vec::new();
		write_uvarint(&mut buf, 987654321);
		write_uvarint(&mut buf, 7);

		let mut cursor = Cursor::new(buf);
		assert_eq!(read_uvarint_from(&mut cursor).unwrap(), 987654321);
		assert_eq!(read_uvarint_from(&mut cursor).unwrap(), 7);

		let err = read_uvarint_from(&mut cursor).unwrap_err();
		assert!(matches!(err, Error::Transport { .. }));
	}

	#[test]
	fn test_trailing_bytes_not_consumed() {
		let mut buf = Vec::new();
		write_uvarint(&mut buf, 5);
		buf.push(0xaa);

		let (value, read) = read_uvarint(&buf).unwrap();
		assert_eq!(value, 5);
		assert_eq!(read, 1);
	}
}
