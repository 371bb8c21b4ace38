// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Protocol messages.
//!
//! Every message starts with a varint message code and is self-delimiting.
//! Builders here emit the code plus the payload; `decode` functions start
//! after the code, which the receiving dispatcher has already consumed.

use std::io::Read;

use basalt_type::{ColumnDef, Error, Result, TableSchema, Type};

use crate::{
	codec::{Encoder, read_string_from},
	frame::Compression,
	varint::read_uvarint_from,
};

/// Protocol revision this driver speaks.
pub const PROTOCOL_VERSION: u64 = 1;

/// Client → server message codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
	Hello,
	Statement,
	PrepareBatch,
	InsertBlock,
	Ping,
}

impl ClientCode {
	pub fn code(&self) -> u64 {
		match self {
			ClientCode::Hello => 0,
			ClientCode::Statement => 1,
			ClientCode::PrepareBatch => 2,
			ClientCode::InsertBlock => 3,
			ClientCode::Ping => 4,
		}
	}

	pub fn from_code(code: u64) -> Result<Self> {
		match code {
			0 => Ok(ClientCode::Hello),
			1 => Ok(ClientCode::Statement),
			2 => Ok(ClientCode::PrepareBatch),
			3 => Ok(ClientCode::InsertBlock),
			4 => Ok(ClientCode::Ping),
			_ => Err(Error::Format {
				message: format!("unknown client message code {code}"),
			}),
		}
	}
}

/// Server → client message codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerCode {
	Hello,
	TableSchema,
	DataBlock,
	EndOfStream,
	Exception,
	Pong,
}

impl ServerCode {
	pub fn code(&self) -> u64 {
		match self {
			ServerCode::Hello => 0,
			ServerCode::TableSchema => 1,
			ServerCode::DataBlock => 2,
			ServerCode::EndOfStream => 3,
			ServerCode::Exception => 4,
			ServerCode::Pong => 5,
		}
	}

	pub fn from_code(code: u64) -> Result<Self> {
		match code {
			0 => Ok(ServerCode::Hello),
			1 => Ok(ServerCode::TableSchema),
			2 => Ok(ServerCode::DataBlock),
			3 => Ok(ServerCode::EndOfStream),
			4 => Ok(ServerCode::Exception),
			5 => Ok(ServerCode::Pong),
			_ => Err(Error::Format {
				message: format!("unknown server message code {code}"),
			}),
		}
	}
}

/// Read the next message code off a stream.
pub fn read_code(r: &mut impl Read) -> Result<u64> {
	read_uvarint_from(r)
}

/// Opening message of every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
	pub client: String,
	pub protocol: u64,
	pub database: String,
	pub username: String,
	pub password: String,
	pub compression: Compression,
}

impl ClientHello {
	pub fn encode(&self) -> Vec<u8> {
		let mut enc = Encoder::new();
		enc.write_uvarint(ClientCode::Hello.code());
		enc.write_str(&self.client);
		enc.write_uvarint(self.protocol);
		enc.write_str(&self.database);
		enc.write_str(&self.username);
		enc.write_str(&self.password);
		enc.write_u8(self.compression.id());
		enc.into_bytes()
	}

	pub fn decode(r: &mut impl Read) -> Result<Self> {
		let client = read_string_from(r)?;
		let protocol = read_uvarint_from(r)?;
		let database = read_string_from(r)?;
		let username = read_string_from(r)?;
		let password = read_string_from(r)?;

		let mut id = [0u8; 1];
		r.read_exact(&mut id)?;
		let compression = Compression::from_id(id[0])?;

		Ok(Self {
			client,
			protocol,
			database,
			username,
			password,
			compression,
		})
	}
}

/// Server greeting after a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
	pub server: String,
	pub protocol: u64,
}

impl ServerHello {
	pub fn encode(&self) -> Vec<u8> {
		let mut enc = Encoder::new();
		enc.write_uvarint(ServerCode::Hello.code());
		enc.write_str(&self.server);
		enc.write_uvarint(self.protocol);
		enc.into_bytes()
	}

	pub fn decode(r: &mut impl Read) -> Result<Self> {
		Ok(Self {
			server: read_string_from(r)?,
			protocol: read_uvarint_from(r)?,
		})
	}
}

/// A server-reported failure, terminating the current exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
	pub code: u64,
	pub message: String,
}

impl Exception {
	pub fn new(code: u64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut enc = Encoder::new();
		enc.write_uvarint(ServerCode::Exception.code());
		enc.write_uvarint(self.code);
		enc.write_str(&self.message);
		enc.into_bytes()
	}

	pub fn decode(r: &mut impl Read) -> Result<Self> {
		Ok(Self {
			code: read_uvarint_from(r)?,
			message: read_string_from(r)?,
		})
	}
}

impl From<Exception> for Error {
	fn from(exception: Exception) -> Self {
		Error::Server {
			code: exception.code,
			message: exception.message,
		}
	}
}

pub fn statement(text: &str) -> Vec<u8> {
	let mut enc = Encoder::new();
	enc.write_uvarint(ClientCode::Statement.code());
	enc.write_str(text);
	enc.into_bytes()
}

pub fn prepare_batch(table: &str) -> Vec<u8> {
	let mut enc = Encoder::new();
	enc.write_uvarint(ClientCode::PrepareBatch.code());
	enc.write_str(table);
	enc.into_bytes()
}

/// An insert message: table name plus one already-framed block.
pub fn insert_block(table: &str, frame: &[u8]) -> Vec<u8> {
	let mut enc = Encoder::with_capacity(frame.len() + table.len() + 8);
	enc.write_uvarint(ClientCode::InsertBlock.code());
	enc.write_str(table);
	enc.write_bytes(frame);
	enc.into_bytes()
}

pub fn ping() -> Vec<u8> {
	let mut enc = Encoder::new();
	enc.write_uvarint(ClientCode::Ping.code());
	enc.into_bytes()
}

pub fn table_schema(schema: &TableSchema) -> Vec<u8> {
	let mut enc = Encoder::new();
	enc.write_uvarint(ServerCode::TableSchema.code());
	enc.write_uvarint(schema.arity() as u64);
	for column in &schema.columns {
		enc.write_str(&column.name);
		enc.write_str(&column.r#type.to_string());
	}
	enc.into_bytes()
}

pub fn read_table_schema(r: &mut impl Read) -> Result<TableSchema> {
	let count = read_uvarint_from(r)?;
	let mut columns = Vec::with_capacity(count.min(1024) as usize);
	for _ in 0..count {
		let name = read_string_from(r)?;
		let spec = read_string_from(r)?;
		columns.push(ColumnDef::new(name, Type::parse(&spec)?));
	}
	Ok(TableSchema::new(columns))
}

/// A result message: one already-framed block of rows.
pub fn data_block(frame: &[u8]) -> Vec<u8> {
	let mut enc = Encoder::with_capacity(frame.len() + 1);
	enc.write_uvarint(ServerCode::DataBlock.code());
	enc.write_bytes(frame);
	enc.into_bytes()
}

pub fn end_of_stream() -> Vec<u8> {
	let mut enc = Encoder::new();
	enc.write_uvarint(ServerCode::EndOfStream.code());
	enc.into_bytes()
}

pub fn pong() -> Vec<u8> {
	let mut enc = Encoder::new();
	enc.write_uvarint(ServerCode::Pong.code());
	enc.into_bytes()
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	#[test]
	fn test_codes_round_trip() {
		for code in [
			ClientCode::Hello,
			ClientCode::Statement,
			ClientCode::PrepareBatch,
			ClientCode::InsertBlock,
			ClientCode::Ping,
		] {
			assert_eq!(ClientCode::from_code(code.code()).unwrap(), code);
		}
		for code in [
			ServerCode::Hello,
			ServerCode::TableSchema,
			ServerCode::DataBlock,
			ServerCode::EndOfStream,
			ServerCode::Exception,
			ServerCode::Pong,
		] {
			assert_eq!(ServerCode::from_code(code.code()).unwrap(), code);
		}

		assert!(ClientCode::from_code(99).is_err());
		assert!(ServerCode::from_code(99).is_err());
	}

	#[test]
	fn test_client_hello_round_trip() {
		let hello = ClientHello {
			client: "basalt-rust".to_string(),
			protocol: PROTOCOL_VERSION,
			database: "default".to_string(),
			username: "default".to_string(),
			password: "secret".to_string(),
			compression: Compression::Lz4,
		};

		let bytes = hello.encode();
		let mut cursor = Cursor::new(bytes);
		assert_eq!(read_code(&mut cursor).unwrap(), ClientCode::Hello.code());
		assert_eq!(ClientHello::decode(&mut cursor).unwrap(), hello);
	}

	#[test]
	fn test_server_hello_round_trip() {
		let hello = ServerHello {
			server: "basalt".to_string(),
			protocol: PROTOCOL_VERSION,
		};

		let mut cursor = Cursor::new(hello.encode());
		assert_eq!(read_code(&mut cursor).unwrap(), ServerCode::Hello.code());
		assert_eq!(ServerHello::decode(&mut cursor).unwrap(), hello);
	}

	#[test]
	fn test_exception_maps_to_server_error() {
		let exception = Exception::new(60, "unknown table test_uuid");

		let mut cursor = Cursor::new(exception.encode());
		assert_eq!(read_code(&mut cursor).unwrap(), ServerCode::Exception.code());
		let decoded = Exception::decode(&mut cursor).unwrap();
		assert_eq!(decoded, exception);

		let err: Error = decoded.into();
		assert!(matches!(
			err,
			Error::Server {
				code: 60,
				..
			}
		));
	}

	#[test]
	fn test_statement_message() {
		let bytes = statement("SELECT * FROM test_uuid");
		let mut cursor = Cursor::new(bytes);
		assert_eq!(read_code(&mut cursor).unwrap(), ClientCode::Statement.code());
		assert_eq!(read_string_from(&mut cursor).unwrap(), "SELECT * FROM test_uuid");
	}

	#[test]
	fn test_table_schema_round_trip() {
		let schema = TableSchema::new(vec![
			ColumnDef::new("col1", Type::Uuid),
			ColumnDef::new("col2", Type::Uuid.nullable()),
		]);

		let mut cursor = Cursor::new(table_schema(&schema));
		assert_eq!(read_code(&mut cursor).unwrap(), ServerCode::TableSchema.code());
		assert_eq!(read_table_schema(&mut cursor).unwrap(), schema);
	}

	#[test]
	fn test_code_only_messages() {
		for (bytes, expected) in [
			(ping(), ClientCode::Ping.code()),
			(end_of_stream(), ServerCode::EndOfStream.code()),
			(pong(), ServerCode::Pong.code()),
		] {
			let mut cursor = Cursor::new(bytes);
			assert_eq!(read_code(&mut cursor).unwrap(), expected);
			assert_eq!(cursor.position() as usize, cursor.get_ref().len());
		}
	}
}
