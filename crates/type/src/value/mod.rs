// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

mod into;
mod r#type;
mod uuid;

pub use into::IntoValue;
pub use r#type::Type;
pub use uuid::Uuid;

/// A Basalt value, represented as a native Rust type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
	/// Value is not defined (think null in common programming languages)
	Undefined,
	/// A 128-bit identifier
	Uuid(Uuid),
}

impl Value {
	pub fn undefined() -> Self {
		Value::Undefined
	}

	pub fn uuid(v: impl Into<Uuid>) -> Self {
		Value::Uuid(v.into())
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	/// The type this value inhabits, `None` for `Undefined`.
	pub fn get_type(&self) -> Option<Type> {
		match self {
			Value::Undefined => None,
			Value::Uuid(_) => Some(Type::Uuid),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Undefined => f.write_str("undefined"),
			Value::Uuid(v) => Display::fmt(v, f),
		}
	}
}

impl From<Uuid> for Value {
	fn from(value: Uuid) -> Self {
		Value::Uuid(value)
	}
}

impl From<Option<Uuid>> for Value {
	fn from(value: Option<Uuid>) -> Self {
		match value {
			Some(v) => Value::Uuid(v),
			None => Value::Undefined,
		}
	}
}
