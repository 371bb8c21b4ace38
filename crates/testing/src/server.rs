// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::{
	io::{self, Write},
	net::{TcpListener, TcpStream},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::Duration,
};

use basalt_column::Block;
use basalt_type::{Error, Result};
use basalt_wire::{
	Compression, FRAME_HEADER_SIZE,
	codec::read_string_from,
	frame,
	message::{self, ClientCode, ClientHello, Exception, PROTOCOL_VERSION, ServerHello},
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
	CODE_AUTH_FAILED,
	logging::init_tracing,
	statement::{self, Statement},
	store::{Table, TableStore},
};

const SERVER_NAME: &str = "basalt-test";
const ACCEPT_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
struct Credentials {
	database: String,
	username: String,
	password: String,
}

/// An in-process Basalt server speaking the native protocol over a real
/// TCP socket, enough of it to exercise the full driver surface.
///
/// The accept thread polls a nonblocking listener and hands each
/// connection to its own thread; connection threads end when their
/// client hangs up. Dropping the server stops the accept loop.
pub struct TestServer {
	accept: Option<JoinHandle<()>>,
	shutdown: Arc<AtomicBool>,
	bound_port: u16,
	store: Arc<Mutex<TableStore>>,
}

impl TestServer {
	/// Spawn a server accepting the default credentials
	/// (`default`/`default`, empty password).
	pub fn spawn() -> Self {
		Self::spawn_with_auth("default", "default", "")
	}

	pub fn spawn_with_auth(database: &str, username: &str, password: &str) -> Self {
		init_tracing();

		let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind test server");
		listener.set_nonblocking(true).expect("failed to set nonblocking");
		let bound_port = listener.local_addr().expect("failed to get local addr").port();

		let shutdown = Arc::new(AtomicBool::new(false));
		let store = Arc::new(Mutex::new(TableStore::new()));
		let credentials = Credentials {
			database: database.to_string(),
			username: username.to_string(),
			password: password.to_string(),
		};

		let shutdown_clone = Arc::clone(&shutdown);
		let store_clone = Arc::clone(&store);
		let accept = thread::Builder::new()
			.name("basalt-test-accept".to_string())
			.spawn(move || {
				accept_loop(listener, credentials, store_clone, shutdown_clone);
			})
			.expect("failed to spawn accept thread");

		debug!(port = bound_port, "test server listening");

		Self {
			accept: Some(accept),
			shutdown,
			bound_port,
			store,
		}
	}

	/// The actual bound port of the server.
	pub fn port(&self) -> u16 {
		self.bound_port
	}

	pub fn address(&self) -> String {
		format!("127.0.0.1:{}", self.bound_port)
	}

	/// Server-side view of a table, for asserting on what arrived.
	pub fn table(&self, name: &str) -> Option<Table> {
		self.store.lock().get(name).cloned()
	}

	pub fn stop(self) {
		drop(self);
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.shutdown.store(true, Ordering::Relaxed);

		if let Some(handle) = self.accept.take() {
			let _ = handle.join();
		}
	}
}

fn accept_loop(
	listener: TcpListener,
	credentials: Credentials,
	store: Arc<Mutex<TableStore>>,
	shutdown: Arc<AtomicBool>,
) {
	while !shutdown.load(Ordering::Relaxed) {
		match listener.accept() {
			Ok((stream, peer)) => {
				let credentials = credentials.clone();
				let store = Arc::clone(&store);
				// Connection threads end when the client hangs up,
				// so they are not joined on shutdown
				let spawned = thread::Builder::new()
					.name(format!("basalt-test-conn-{peer}"))
					.spawn(move || {
						if let Err(err) = serve_connection(stream, &credentials, &store) {
							debug!(error = %err, %peer, "connection ended");
						}
					});
				if let Err(err) = spawned {
					warn!(error = %err, "failed to spawn connection thread");
				}
			}
			Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
				thread::sleep(ACCEPT_POLL);
			}
			Err(err) => {
				warn!(error = %err, "accept failed");
				break;
			}
		}
	}
}

fn serve_connection(
	mut stream: TcpStream,
	credentials: &Credentials,
	store: &Mutex<TableStore>,
) -> Result<()> {
	stream.set_nodelay(true)?;

	let code = message::read_code(&mut stream)?;
	if ClientCode::from_code(code)? != ClientCode::Hello {
		return Err(Error::Format {
			message: "expected a hello message first".to_string(),
		});
	}
	let hello = ClientHello::decode(&mut stream)?;

	if hello.database != credentials.database
		|| hello.username != credentials.username
		|| hello.password != credentials.password
	{
		let exception = Exception::new(
			CODE_AUTH_FAILED,
			format!("authentication failed for user {}", hello.username),
		);
		stream.write_all(&exception.encode())?;
		return Ok(());
	}

	// Result blocks travel with the codec the client asked for
	let compression = hello.compression;
	debug!(client = %hello.client, compression = ?compression, "client connected");

	let server_hello = ServerHello {
		server: SERVER_NAME.to_string(),
		protocol: PROTOCOL_VERSION,
	};
	stream.write_all(&server_hello.encode())?;

	loop {
		let code = match message::read_code(&mut stream) {
			Ok(code) => code,
			Err(Error::Transport {
				source,
			}) if is_disconnect(&source) => return Ok(()),
			Err(err) => return Err(err),
		};

		match ClientCode::from_code(code)? {
			ClientCode::Hello => {
				return Err(Error::Format {
					message: "unexpected second hello".to_string(),
				});
			}
			ClientCode::Ping => {
				stream.write_all(&message::pong())?;
			}
			ClientCode::Statement => {
				let text = read_string_from(&mut stream)?;
				handle_statement(&mut stream, &text, store, compression)?;
			}
			ClientCode::PrepareBatch => {
				let table = read_string_from(&mut stream)?;
				let response = match store.lock().schema_of(&table) {
					Some(schema) => message::table_schema(&schema),
					None => Exception::new(
						crate::CODE_UNKNOWN_TABLE,
						format!("unknown table {table}"),
					)
					.encode(),
				};
				stream.write_all(&response)?;
			}
			ClientCode::InsertBlock => {
				let table = read_string_from(&mut stream)?;
				let raw = frame::read_frame(&mut stream)?;
				let block = Block::decode(&raw)?;
				let response = match store.lock().insert(&table, block) {
					Ok(()) => message::end_of_stream(),
					Err(exception) => exception.encode(),
				};
				stream.write_all(&response)?;
			}
		}
	}
}

fn handle_statement(
	stream: &mut TcpStream,
	text: &str,
	store: &Mutex<TableStore>,
	compression: Compression,
) -> Result<()> {
	let statement = match statement::parse(text) {
		Ok(statement) => statement,
		Err(exception) => {
			stream.write_all(&exception.encode())?;
			return Ok(());
		}
	};

	let outcome = match statement {
		Statement::Create {
			table,
			schema,
		} => store.lock().create(&table, schema),
		Statement::Drop {
			table,
			if_exists,
		} => store.lock().drop_table(&table, if_exists),
		Statement::Truncate {
			table,
		} => store.lock().truncate(&table),
		Statement::Select {
			table,
		} => {
			let blocks = match store.lock().select(&table) {
				Ok(blocks) => blocks,
				Err(exception) => {
					stream.write_all(&exception.encode())?;
					return Ok(());
				}
			};
			for block in &blocks {
				let raw = block.encode()?;
				let mut framed = Vec::with_capacity(raw.len() + FRAME_HEADER_SIZE);
				frame::write_frame(&mut framed, &raw, compression)?;
				stream.write_all(&message::data_block(&framed))?;
			}
			stream.write_all(&message::end_of_stream())?;
			return Ok(());
		}
	};

	let response = match outcome {
		Ok(()) => message::end_of_stream(),
		Err(exception) => exception.encode(),
	};
	stream.write_all(&response)?;
	Ok(())
}

fn is_disconnect(err: &io::Error) -> bool {
	matches!(
		err.kind(),
		io::ErrorKind::UnexpectedEof
			| io::ErrorKind::ConnectionReset
			| io::ErrorKind::ConnectionAborted
			| io::ErrorKind::BrokenPipe
	)
}
