// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::time::Duration;

use basalt_wire::Compression;

const DEFAULT_DATABASE: &str = "default";
const DEFAULT_USERNAME: &str = "default";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection options for [`Connection::connect`](crate::Connection::connect).
///
/// ```
/// use basalt_client::{Compression, Options};
///
/// let options = Options::new("127.0.0.1:5433")
/// 	.database("analytics")
/// 	.username("ingest")
/// 	.password("secret")
/// 	.compression(Compression::Lz4);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
	pub address: String,
	pub database: String,
	pub username: String,
	pub password: String,
	pub compression: Compression,
	pub connect_timeout: Duration,
}

impl Options {
	pub fn new(address: impl Into<String>) -> Self {
		Self {
			address: address.into(),
			database: DEFAULT_DATABASE.to_string(),
			username: DEFAULT_USERNAME.to_string(),
			password: String::new(),
			compression: Compression::None,
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
		}
	}

	pub fn database(mut self, database: impl Into<String>) -> Self {
		self.database = database.into();
		self
	}

	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.username = username.into();
		self
	}

	pub fn password(mut self, password: impl Into<String>) -> Self {
		self.password = password.into();
		self
	}

	pub fn compression(mut self, compression: Compression) -> Self {
		self.compression = compression;
		self
	}

	pub fn connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let options = Options::new("localhost:5433");

		assert_eq!(options.address, "localhost:5433");
		assert_eq!(options.database, "default");
		assert_eq!(options.username, "default");
		assert_eq!(options.password, "");
		assert_eq!(options.compression, Compression::None);
		assert_eq!(options.connect_timeout, Duration::from_secs(5));
	}

	#[test]
	fn test_builder() {
		let options = Options::new("localhost:5433")
			.database("analytics")
			.username("ingest")
			.password("secret")
			.compression(Compression::Zstd)
			.connect_timeout(Duration::from_millis(250));

		assert_eq!(options.database, "analytics");
		assert_eq!(options.username, "ingest");
		assert_eq!(options.password, "secret");
		assert_eq!(options.compression, Compression::Zstd);
		assert_eq!(options.connect_timeout, Duration::from_millis(250));
	}
}
