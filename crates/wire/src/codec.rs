// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Byte-level encoding primitives.
//!
//! Fixed-width integers are little-endian. Strings are a varint byte length
//! followed by UTF-8. Identifiers travel as their `u128` value in
//! little-endian order, the server's native layout.
//!
//! `Encoder`/`Decoder` work over in-memory buffers; the `*_from` functions
//! read the same primitives directly off a stream for self-delimiting
//! protocol messages.

use std::io::Read;

use basalt_type::{Error, Result, Uuid};

use crate::varint;

/// Wire width of one identifier value.
pub const UUID_WIRE_SIZE: usize = 16;

/// Upper bound on a single length-prefixed string.
const MAX_STRING_LEN: usize = 16 << 20;

pub struct Encoder {
	buf: Vec<u8>,
}

impl Encoder {
	pub fn new() -> Self {
		Self {
			buf: Vec::new(),
		}
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			buf: Vec::with_capacity(capacity),
		}
	}

	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	pub fn write_u8(&mut self, value: u8) {
		self.buf.push(value);
	}

	pub fn write_u32(&mut self, value: u32) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	pub fn write_u64(&mut self, value: u64) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	pub fn write_u128(&mut self, value: u128) {
		self.buf.extend_from_slice(&value.to_le_bytes());
	}

	pub fn write_uvarint(&mut self, value: u64) {
		varint::write_uvarint(&mut self.buf, value);
	}

	pub fn write_str(&mut self, value: &str) {
		self.write_uvarint(value.len() as u64);
		self.buf.extend_from_slice(value.as_bytes());
	}

	/// Append raw bytes without a length prefix.
	pub fn write_bytes(&mut self, value: &[u8]) {
		self.buf.extend_from_slice(value);
	}

	pub fn write_uuid(&mut self, value: &Uuid) {
		self.write_u128(value.as_u128());
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}
}

impl Default for Encoder {
	fn default() -> Self {
		Self::new()
	}
}

pub struct Decoder<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> Decoder<'a> {
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			pos: 0,
		}
	}

	pub fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	pub fn is_exhausted(&self) -> bool {
		self.pos == self.data.len()
	}

	fn take(&mut self, len: usize) -> Result<&'a [u8]> {
		if len > self.remaining() {
			return Err(Error::Format {
				message: format!("truncated input: need {len} bytes, have {}", self.remaining()),
			});
		}
		let slice = &self.data[self.pos..self.pos + len];
		self.pos += len;
		Ok(slice)
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.take(1)?[0])
	}

	pub fn read_u32(&mut self) -> Result<u32> {
		let bytes = self.take(4)?;
		Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}

	pub fn read_u64(&mut self) -> Result<u64> {
		let mut bytes = [0u8; 8];
		bytes.copy_from_slice(self.take(8)?);
		Ok(u64::from_le_bytes(bytes))
	}

	pub fn read_u128(&mut self) -> Result<u128> {
		let mut bytes = [0u8; 16];
		bytes.copy_from_slice(self.take(16)?);
		Ok(u128::from_le_bytes(bytes))
	}

	pub fn read_uvarint(&mut self) -> Result<u64> {
		let (value, read) = varint::read_uvarint(&self.data[self.pos..])?;
		self.pos += read;
		Ok(value)
	}

	pub fn read_str(&mut self) -> Result<String> {
		let len = checked_len(self.read_uvarint()?, MAX_STRING_LEN)?;
		let bytes = self.take(len)?;
		String::from_utf8(bytes.to_vec()).map_err(|err| Error::Format {
			message: format!("string is not valid utf-8: {err}"),
		})
	}

	pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
		self.take(len)
	}

	pub fn read_uuid(&mut self) -> Result<Uuid> {
		Ok(Uuid::from_u128(self.read_u128()?))
	}

	/// Trailing bytes after a complete decode are malformed input.
	pub fn expect_exhausted(&self) -> Result<()> {
		if self.is_exhausted() {
			Ok(())
		} else {
			Err(Error::Format {
				message: format!("{} trailing bytes after payload", self.remaining()),
			})
		}
	}
}

/// Read a length-prefixed string directly off a stream.
pub fn read_string_from(r: &mut impl Read) -> Result<String> {
	let len = checked_len(varint::read_uvarint_from(r)?, MAX_STRING_LEN)?;
	let bytes = read_exact_from(r, len)?;
	String::from_utf8(bytes).map_err(|err| Error::Format {
		message: format!("string is not valid utf-8: {err}"),
	})
}

/// Read exactly `len` bytes off a stream.
pub fn read_exact_from(r: &mut impl Read, len: usize) -> Result<Vec<u8>> {
	let mut buf = vec![0u8; len];
	r.read_exact(&mut buf)?;
	Ok(buf)
}

fn checked_len(len: u64, max: usize) -> Result<usize> {
	let len = usize::try_from(len).map_err(|_| Error::Format {
		message: format!("length {len} does not fit this platform"),
	})?;
	if len > max {
		return Err(Error::Format {
			message: format!("length {len} exceeds maximum {max}"),
		});
	}
	Ok(len)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	#[test]
	fn test_fixed_width_round_trip() {
		let mut enc = Encoder::new();
		enc.write_u8(0xab);
		enc.write_u32(0xdead_beef);
		enc.write_u64(0x0123_4567_89ab_cdef);
		enc.write_u128(u128::MAX - 7);

		let bytes = enc.into_bytes();
		let mut dec = Decoder::new(&bytes);
		assert_eq!(dec.read_u8().unwrap(), 0xab);
		assert_eq!(dec.read_u32().unwrap(), 0xdead_beef);
		assert_eq!(dec.read_u64().unwrap(), 0x0123_4567_89ab_cdef);
		assert_eq!(dec.read_u128().unwrap(), u128::MAX - 7);
		assert!(dec.is_exhausted());
		dec.expect_exhausted().unwrap();
	}

	#[test]
	fn test_string_round_trip() {
		let mut enc = Encoder::new();
		enc.write_str("test_uuid");
		enc.write_str("");
		enc.write_str("zß水🍷");

		let bytes = enc.into_bytes();
		let mut dec = Decoder::new(&bytes);
		assert_eq!(dec.read_str().unwrap(), "test_uuid");
		assert_eq!(dec.read_str().unwrap(), "");
		assert_eq!(dec.read_str().unwrap(), "zß水🍷");
	}

	#[test]
	fn test_uuid_round_trip() {
		let id = Uuid::generate();

		let mut enc = Encoder::new();
		enc.write_uuid(&id);

		let bytes = enc.into_bytes();
		assert_eq!(bytes.len(), UUID_WIRE_SIZE);

		let mut dec = Decoder::new(&bytes);
		assert_eq!(dec.read_uuid().unwrap(), id);
	}

	#[test]
	fn test_uuid_wire_order() {
		// The wire carries the u128 little-endian, so the byte at
		// offset zero is the least significant one.
		let id = Uuid::from_u128(0x01);

		let mut enc = Encoder::new();
		enc.write_uuid(&id);

		let bytes = enc.into_bytes();
		assert_eq!(bytes[0], 0x01);
		assert!(bytes[1..].iter().all(|&b| b == 0));
	}

	#[test]
	fn test_truncated_input() {
		let mut dec = Decoder::new(&[0x01, 0x02]);
		let err = dec.read_u32().unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
	}

	#[test]
	fn test_invalid_utf8() {
		// Length 2, then invalid continuation bytes
		let mut dec = Decoder::new(&[0x02, 0xff, 0xfe]);
		let err = dec.read_str().unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
	}

	#[test]
	fn test_string_length_lies() {
		// Claims 100 bytes but carries 3
		let mut enc = Encoder::new();
		enc.write_uvarint(100);
		enc.write_bytes(b"abc");

		let bytes = enc.into_bytes();
		let mut dec = Decoder::new(&bytes);
		assert!(matches!(dec.read_str().unwrap_err(), Error::Format { .. }));
	}

	#[test]
	fn test_trailing_bytes_detected() {
		let mut dec = Decoder::new(&[0x01, 0x02]);
		dec.read_u8().unwrap();
		assert!(matches!(dec.expect_exhausted().unwrap_err(), Error::Format { .. }));
	}

	#[test]
	fn test_stream_string() {
		let mut enc = Encoder::new();
		enc.write_str("hello");

		let mut cursor = Cursor::new(enc.into_bytes());
		assert_eq!(read_string_from(&mut cursor).unwrap(), "hello");

		let err = read_string_from(&mut cursor).unwrap_err();
		assert!(matches!(err, Error::Transport { .. }));
	}

	#[test]
	fn test_oversized_string_rejected() {
		let mut enc = Encoder::new();
		enc.write_uvarint((MAX_STRING_LEN + 1) as u64);

		let bytes = enc.into_bytes();
		let mut dec = Decoder::new(&bytes);
		assert!(matches!(dec.read_str().unwrap_err(), Error::Format { .. }));
	}
}
