// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::{
	io::{self, Write},
	net::{TcpStream, ToSocketAddrs},
	time::Instant,
};

use basalt_column::Block;
use basalt_type::{Error, Result, TableSchema};
use basalt_wire::{
	Compression, frame,
	message::{self, ClientHello, Exception, PROTOCOL_VERSION, ServerCode, ServerHello},
};
use tracing::{debug, instrument, warn};

use crate::{
	batch::Batch,
	config::Options,
	rows::{Row, Rows},
};

const CLIENT_NAME: &str = "basalt-rust";

/// A blocking connection to a Basalt server.
///
/// One connection carries one exchange at a time. [`Batch`] and [`Rows`]
/// borrow the connection mutably, so overlapping use is rejected at
/// compile time rather than on the wire.
#[derive(Debug)]
pub struct Connection {
	stream: TcpStream,
	compression: Compression,
	server: String,
	protocol: u64,
	deadline: Option<Instant>,
	poisoned: bool,
}

impl Connection {
	/// Connect to a server and perform the hello exchange.
	#[instrument(name = "connection::connect", level = "trace", skip(options))]
	pub fn connect(options: &Options) -> Result<Self> {
		let address = options.address.to_socket_addrs()?.next().ok_or_else(|| {
			Error::Transport {
				source: io::Error::new(
					io::ErrorKind::AddrNotAvailable,
					format!("address {} did not resolve", options.address),
				),
			}
		})?;

		let stream = TcpStream::connect_timeout(&address, options.connect_timeout)?;
		stream.set_nodelay(true)?;

		let mut conn = Self {
			stream,
			compression: options.compression,
			server: String::new(),
			protocol: 0,
			deadline: None,
			poisoned: false,
		};

		let hello = ClientHello {
			client: CLIENT_NAME.to_string(),
			protocol: PROTOCOL_VERSION,
			database: options.database.clone(),
			username: options.username.clone(),
			password: options.password.clone(),
			compression: options.compression,
		};
		conn.write_message(&hello.encode())?;

		match conn.read_code()? {
			ServerCode::Hello => {
				let hello = ServerHello::decode(&mut conn.stream)?;
				debug!(server = %hello.server, protocol = hello.protocol, "connected");
				conn.server = hello.server;
				conn.protocol = hello.protocol;
				Ok(conn)
			}
			ServerCode::Exception => Err(Exception::decode(&mut conn.stream)?.into()),
			other => Err(unexpected(other, "handshake")),
		}
	}

	/// Name the server announced in its hello.
	pub fn server(&self) -> &str {
		&self.server
	}

	/// Protocol revision the server announced in its hello.
	pub fn protocol(&self) -> u64 {
		self.protocol
	}

	/// Absolute deadline applied to every following operation, or `None`
	/// to block indefinitely.
	///
	/// An operation still running when the deadline passes fails with
	/// [`Error::Transport`].
	pub fn set_deadline(&mut self, deadline: Option<Instant>) {
		self.deadline = deadline;
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Whether a transport failure mid-exchange has desynchronized the
	/// stream. A poisoned connection rejects every operation with
	/// [`Error::State`]; reconnect to recover.
	pub fn is_poisoned(&self) -> bool {
		self.poisoned
	}

	/// Execute a statement and discard any result rows.
	#[instrument(name = "connection::exec", level = "trace", skip(self))]
	pub fn exec(&mut self, statement: &str) -> Result<()> {
		self.guard()?;
		self.arm_deadline()?;
		let result = self.exec_inner(statement);
		self.poison_on_failure(result)
	}

	fn exec_inner(&mut self, statement: &str) -> Result<()> {
		self.write_message(&message::statement(statement))?;
		loop {
			match self.read_code()? {
				ServerCode::DataBlock => {
					let _ = frame::read_frame(&mut self.stream)?;
				}
				ServerCode::EndOfStream => return Ok(()),
				ServerCode::Exception => {
					return Err(Exception::decode(&mut self.stream)?.into());
				}
				other => return Err(unexpected(other, "statement")),
			}
		}
	}

	/// Execute a statement and stream back its result rows.
	#[instrument(name = "connection::query", level = "trace", skip(self))]
	pub fn query(&mut self, statement: &str) -> Result<Rows<'_>> {
		self.guard()?;
		self.arm_deadline()?;
		let result = self.write_message(&message::statement(statement));
		self.poison_on_failure(result)?;
		Ok(Rows::new(self))
	}

	/// Execute a statement and return only its first row, draining the
	/// rest. Fails with [`Error::EndOfResults`] on an empty result.
	pub fn query_row(&mut self, statement: &str) -> Result<Row> {
		self.query(statement)?.into_first_row()
	}

	/// Open a batch bound to the schema of `table`.
	#[instrument(name = "connection::prepare_batch", level = "trace", skip(self))]
	pub fn prepare_batch(&mut self, table: &str) -> Result<Batch<'_>> {
		self.guard()?;
		self.arm_deadline()?;
		let result = self.prepare_inner(table);
		let schema = self.poison_on_failure(result)?;
		debug!(table, columns = schema.arity(), "batch prepared");
		Batch::new(self, table.to_string(), &schema)
	}

	fn prepare_inner(&mut self, table: &str) -> Result<TableSchema> {
		self.write_message(&message::prepare_batch(table))?;
		match self.read_code()? {
			ServerCode::TableSchema => message::read_table_schema(&mut self.stream),
			ServerCode::Exception => Err(Exception::decode(&mut self.stream)?.into()),
			other => Err(unexpected(other, "prepare")),
		}
	}

	/// Check that the server is alive and the stream is at a message
	/// boundary.
	#[instrument(name = "connection::ping", level = "trace", skip(self))]
	pub fn ping(&mut self) -> Result<()> {
		self.guard()?;
		self.arm_deadline()?;
		let result = self.ping_inner();
		self.poison_on_failure(result)
	}

	fn ping_inner(&mut self) -> Result<()> {
		self.write_message(&message::ping())?;
		match self.read_code()? {
			ServerCode::Pong => Ok(()),
			ServerCode::Exception => Err(Exception::decode(&mut self.stream)?.into()),
			other => Err(unexpected(other, "ping")),
		}
	}

	/// Transmit one block and wait for the server to acknowledge it.
	pub(crate) fn send_insert_block(&mut self, table: &str, block: &Block) -> Result<()> {
		self.guard()?;
		self.arm_deadline()?;
		let result = self.insert_inner(table, block);
		self.poison_on_failure(result)
	}

	fn insert_inner(&mut self, table: &str, block: &Block) -> Result<()> {
		let raw = block.encode()?;
		let mut framed = Vec::with_capacity(raw.len() + frame::FRAME_HEADER_SIZE);
		frame::write_frame(&mut framed, &raw, self.compression)?;
		self.write_message(&message::insert_block(table, &framed))?;
		debug!(table, rows = block.row_count(), columns = block.arity(), "insert block sent");

		match self.read_code()? {
			ServerCode::EndOfStream => Ok(()),
			ServerCode::Exception => Err(Exception::decode(&mut self.stream)?.into()),
			other => Err(unexpected(other, "insert")),
		}
	}

	/// Pull the next result event: a decoded block, or `None` at end of
	/// stream.
	pub(crate) fn read_result_event(&mut self) -> Result<Option<Block>> {
		self.guard()?;
		self.arm_deadline()?;
		let result = self.result_event_inner();
		self.poison_on_failure(result)
	}

	fn result_event_inner(&mut self) -> Result<Option<Block>> {
		match self.read_code()? {
			ServerCode::DataBlock => {
				let raw = frame::read_frame(&mut self.stream)?;
				let block = Block::decode(&raw)?;
				debug!(rows = block.row_count(), columns = block.arity(), "data block received");
				Ok(Some(block))
			}
			ServerCode::EndOfStream => Ok(None),
			ServerCode::Exception => Err(Exception::decode(&mut self.stream)?.into()),
			other => Err(unexpected(other, "query")),
		}
	}

	fn guard(&self) -> Result<()> {
		if self.poisoned {
			return Err(Error::State {
				message: "connection is poisoned after a transport failure; reconnect"
					.to_string(),
			});
		}
		Ok(())
	}

	/// Translate the absolute deadline into socket timeouts for the next
	/// exchange.
	fn arm_deadline(&mut self) -> Result<()> {
		let timeout = match self.deadline {
			None => None,
			Some(deadline) => {
				let remaining = deadline
					.checked_duration_since(Instant::now())
					.filter(|remaining| !remaining.is_zero())
					.ok_or_else(|| Error::Transport {
						source: io::Error::new(
							io::ErrorKind::TimedOut,
							"deadline elapsed before the operation started",
						),
					})?;
				Some(remaining)
			}
		};
		self.stream.set_read_timeout(timeout)?;
		self.stream.set_write_timeout(timeout)?;
		Ok(())
	}

	/// A transport or framing failure mid-exchange leaves the stream at an
	/// unknown position; mark the connection unusable.
	fn poison_on_failure<T>(&mut self, result: Result<T>) -> Result<T> {
		if let Err(err) = &result {
			if matches!(err, Error::Transport { .. } | Error::Format { .. }) && !self.poisoned {
				self.poisoned = true;
				warn!(error = %err, "connection poisoned");
			}
		}
		result
	}

	fn write_message(&mut self, bytes: &[u8]) -> Result<()> {
		self.stream.write_all(bytes)?;
		self.stream.flush()?;
		Ok(())
	}

	fn read_code(&mut self) -> Result<ServerCode> {
		ServerCode::from_code(message::read_code(&mut self.stream)?)
	}
}

fn unexpected(code: ServerCode, during: &str) -> Error {
	Error::Format {
		message: format!("unexpected {code:?} message during {during}"),
	}
}
