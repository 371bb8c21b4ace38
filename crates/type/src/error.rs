// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::io;

/// Result type used across the driver crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy of the Basalt driver.
///
/// `Format`, `Schema` and `Validation` indicate bugs in the caller or the
/// peer and are never retried by the driver. `EndOfResults` is expected
/// scanner exhaustion, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("malformed wire data: {message}")]
	Format {
		message: String,
	},

	#[error("schema mismatch: {message}")]
	Schema {
		message: String,
	},

	#[error("invalid batch: {message}")]
	Validation {
		message: String,
	},

	#[error("invalid state: {message}")]
	State {
		message: String,
	},

	#[error("no more rows")]
	EndOfResults,

	#[error("transport failure: {source}")]
	Transport {
		#[from]
		source: io::Error,
	},

	#[error("server exception (code {code}): {message}")]
	Server {
		code: u64,
		message: String,
	},
}

impl Error {
	/// Expected exhaustion of a result stream rather than a failure.
	pub fn is_end_of_results(&self) -> bool {
		matches!(self, Error::EndOfResults)
	}
}
