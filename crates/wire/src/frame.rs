// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Checksummed block framing.
//!
//! Every block crosses the wire inside one frame:
//!
//! ```text
//! codec id (u8) | xxh3-64 of payload (u64 le) | raw len (u32 le) |
//! payload len (u32 le) | payload
//! ```
//!
//! The payload is the block bytes, compressed per the codec id. The frame
//! is self-describing: readers dispatch on the embedded codec id, the
//! negotiated codec only selects what a peer writes.

use std::{borrow::Cow, io::Read};

use basalt_type::{Error, Result};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use tracing::warn;
use xxhash_rust::xxh3::xxh3_64;

use crate::codec::read_exact_from;

/// Fixed frame header width: codec + checksum + raw len + payload len.
pub const FRAME_HEADER_SIZE: usize = 17;

/// Upper bound on one frame payload, compressed or raw.
const MAX_FRAME_PAYLOAD: usize = 256 << 20;

const ZSTD_LEVEL: i32 = 3;

/// Block compression codec, negotiated at connection setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
	#[default]
	None,
	Lz4,
	Zstd,
}

impl Compression {
	pub fn id(&self) -> u8 {
		match self {
			Compression::None => 0,
			Compression::Lz4 => 1,
			Compression::Zstd => 2,
		}
	}

	pub fn from_id(id: u8) -> Result<Self> {
		match id {
			0 => Ok(Compression::None),
			1 => Ok(Compression::Lz4),
			2 => Ok(Compression::Zstd),
			_ => Err(Error::Format {
				message: format!("unknown compression codec id {id}"),
			}),
		}
	}
}

/// Frame `raw` and append the result to `out`.
pub fn write_frame(out: &mut Vec<u8>, raw: &[u8], codec: Compression) -> Result<()> {
	if raw.len() > MAX_FRAME_PAYLOAD {
		return Err(Error::Validation {
			message: format!("block of {} bytes exceeds the maximum frame size", raw.len()),
		});
	}

	let payload: Cow<[u8]> = match codec {
		Compression::None => Cow::Borrowed(raw),
		Compression::Lz4 => Cow::Owned(compress_prepend_size(raw)),
		Compression::Zstd => {
			Cow::Owned(zstd::bulk::compress(raw, ZSTD_LEVEL).map_err(|err| Error::Format {
				message: format!("zstd compression failed: {err}"),
			})?)
		}
	};

	out.push(codec.id());
	out.extend_from_slice(&xxh3_64(&payload).to_le_bytes());
	out.extend_from_slice(&(raw.len() as u32).to_le_bytes());
	out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
	out.extend_from_slice(&payload);
	Ok(())
}

/// Read one frame off a stream and return the raw block bytes.
///
/// Never panics on truncated or corrupt input: stream exhaustion maps to
/// `Transport`, everything else to `Format`.
pub fn read_frame(r: &mut impl Read) -> Result<Vec<u8>> {
	let mut header = [0u8; FRAME_HEADER_SIZE];
	r.read_exact(&mut header)?;

	let codec = Compression::from_id(header[0])?;

	let mut checksum = [0u8; 8];
	checksum.copy_from_slice(&header[1..9]);
	let checksum = u64::from_le_bytes(checksum);

	let raw_len = u32::from_le_bytes([header[9], header[10], header[11], header[12]]) as usize;
	let payload_len = u32::from_le_bytes([header[13], header[14], header[15], header[16]]) as usize;

	if raw_len > MAX_FRAME_PAYLOAD || payload_len > MAX_FRAME_PAYLOAD {
		return Err(Error::Format {
			message: format!("frame lengths out of range: raw {raw_len}, payload {payload_len}"),
		});
	}

	let payload = read_exact_from(r, payload_len)?;

	let actual = xxh3_64(&payload);
	if actual != checksum {
		warn!(expected = checksum, actual, "frame checksum mismatch");
		return Err(Error::Format {
			message: format!("frame checksum mismatch: expected {checksum:016x}, got {actual:016x}"),
		});
	}

	let raw = match codec {
		Compression::None => payload,
		Compression::Lz4 => decompress_size_prepended(&payload).map_err(|err| Error::Format {
			message: format!("lz4 decompression failed: {err}"),
		})?,
		Compression::Zstd => zstd::bulk::decompress(&payload, raw_len).map_err(|err| Error::Format {
			message: format!("zstd decompression failed: {err}"),
		})?,
	};

	if raw.len() != raw_len {
		return Err(Error::Format {
			message: format!("frame declared {raw_len} raw bytes but decoded {}", raw.len()),
		});
	}

	Ok(raw)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	fn round_trip(codec: Compression, raw: &[u8]) {
		let mut framed = Vec::new();
		write_frame(&mut framed, raw, codec).unwrap();
		assert_eq!(framed[0], codec.id());

		let mut cursor = Cursor::new(framed);
		assert_eq!(read_frame(&mut cursor).unwrap(), raw);
	}

	#[test]
	fn test_round_trip_uncompressed() {
		round_trip(Compression::None, b"columnar block bytes");
		round_trip(Compression::None, &[]);
	}

	#[test]
	fn test_round_trip_lz4() {
		let raw: Vec<u8> = (0..4096u32).flat_map(|i| (i % 7).to_le_bytes()).collect();
		round_trip(Compression::Lz4, &raw);
	}

	#[test]
	fn test_round_trip_zstd() {
		let raw: Vec<u8> = (0..4096u32).flat_map(|i| (i % 7).to_le_bytes()).collect();
		round_trip(Compression::Zstd, &raw);
	}

	#[test]
	fn test_checksum_corruption() {
		let mut framed = Vec::new();
		write_frame(&mut framed, b"payload under test", Compression::None).unwrap();

		// Flip one payload bit
		let last = framed.len() - 1;
		framed[last] ^= 0x01;

		let mut cursor = Cursor::new(framed);
		let err = read_frame(&mut cursor).unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
		assert!(err.to_string().contains("checksum"));
	}

	#[test]
	fn test_truncated_header() {
		let mut cursor = Cursor::new(vec![0u8; FRAME_HEADER_SIZE - 5]);
		let err = read_frame(&mut cursor).unwrap_err();
		assert!(matches!(err, Error::Transport { .. }));
	}

	#[test]
	fn test_truncated_payload() {
		let mut framed = Vec::new();
		write_frame(&mut framed, b"0123456789", Compression::None).unwrap();
		framed.truncate(framed.len() - 3);

		let mut cursor = Cursor::new(framed);
		let err = read_frame(&mut cursor).unwrap_err();
		assert!(matches!(err, Error::Transport { .. }));
	}

	#[test]
	fn test_unknown_codec_id() {
		let mut framed = Vec::new();
		write_frame(&mut framed, b"x", Compression::None).unwrap();
		framed[0] = 9;

		let mut cursor = Cursor::new(framed);
		assert!(matches!(read_frame(&mut cursor).unwrap_err(), Error::Format { .. }));
	}

	#[test]
	fn test_raw_length_mismatch() {
		let mut framed = Vec::new();
		write_frame(&mut framed, b"abcdef", Compression::None).unwrap();

		// Lie about the raw length; the checksum only covers the payload
		framed[9..13].copy_from_slice(&3u32.to_le_bytes());

		let mut cursor = Cursor::new(framed);
		assert!(matches!(read_frame(&mut cursor).unwrap_err(), Error::Format { .. }));
	}

	#[test]
	fn test_declared_length_out_of_range() {
		let mut framed = Vec::new();
		write_frame(&mut framed, b"x", Compression::None).unwrap();
		framed[13..17].copy_from_slice(&u32::MAX.to_le_bytes());

		let mut cursor = Cursor::new(framed);
		assert!(matches!(read_frame(&mut cursor).unwrap_err(), Error::Format { .. }));
	}
}
