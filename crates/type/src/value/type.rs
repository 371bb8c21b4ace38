// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column data type descriptor as reported by the server.
///
/// The textual form is the wire representation used in table schemas and
/// block headers: `Uuid`, `Nullable(Uuid)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
	/// A 128-bit identifier
	Uuid,
	/// A nullable decoration of a base type
	Nullable(Box<Type>),
}

impl Type {
	/// Parse a type spec string such as `Uuid` or `Nullable(Uuid)`.
	///
	/// Nullable never nests; `Nullable(Nullable(..))` is malformed.
	pub fn parse(spec: &str) -> Result<Self> {
		if let Some(inner) = spec.strip_prefix("Nullable(").and_then(|rest| rest.strip_suffix(')')) {
			let base = Type::parse(inner)?;
			if base.is_nullable() {
				return Err(Error::Format {
					message: format!("nested nullable in type spec {spec:?}"),
				});
			}
			return Ok(Type::Nullable(Box::new(base)));
		}

		match spec {
			"Uuid" => Ok(Type::Uuid),
			_ => Err(Error::Format {
				message: format!("unknown type spec {spec:?}"),
			}),
		}
	}

	pub fn is_nullable(&self) -> bool {
		matches!(self, Type::Nullable(_))
	}

	/// The base type with any nullable decoration stripped.
	pub fn base(&self) -> &Type {
		match self {
			Type::Nullable(inner) => inner,
			other => other,
		}
	}

	/// Wrap in a nullable decoration. Idempotent.
	pub fn nullable(self) -> Type {
		if self.is_nullable() {
			self
		} else {
			Type::Nullable(Box::new(self))
		}
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Type::Uuid => f.write_str("Uuid"),
			Type::Nullable(inner) => write!(f, "Nullable({inner})"),
		}
	}
}

impl FromStr for Type {
	type Err = Error;

	fn from_str(spec: &str) -> Result<Self> {
		Self::parse(spec)
	}
}
