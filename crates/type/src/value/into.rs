// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use crate::value::{Uuid, Value};

/// Conversion into a dynamic [`Value`], used by positional row binding.
pub trait IntoValue {
	fn into_value(self) -> Value;
}

impl IntoValue for Value {
	fn into_value(self) -> Value {
		self
	}
}

impl IntoValue for Uuid {
	fn into_value(self) -> Value {
		Value::Uuid(self)
	}
}

impl IntoValue for &Uuid {
	fn into_value(self) -> Value {
		Value::Uuid(*self)
	}
}

impl IntoValue for Option<Uuid> {
	fn into_value(self) -> Value {
		Value::from(self)
	}
}

impl IntoValue for Option<&Uuid> {
	fn into_value(self) -> Value {
		Value::from(self.copied())
	}
}
