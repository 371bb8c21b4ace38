// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Binary wire protocol primitives: varints, byte codecs, message
//! envelopes and checksummed block framing.

pub mod codec;
pub mod frame;
pub mod message;
pub mod varint;

pub use codec::{Decoder, Encoder, UUID_WIRE_SIZE};
pub use frame::{Compression, FRAME_HEADER_SIZE, read_frame, write_frame};
pub use message::{ClientCode, ClientHello, Exception, PROTOCOL_VERSION, ServerCode, ServerHello};
