// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_type::{Result, Value};
use basalt_wire::{Decoder, Encoder};

mod nullable;
mod uuid;

pub use nullable::NullableContainer;
pub use uuid::UuidContainer;

/// Append-only storage for one column of values.
///
/// Wire bodies are fixed layout per type; `read_body` consumes exactly the
/// bytes `write_body` produced for the same row count.
pub trait Container {
	type Value;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn push(&mut self, value: Self::Value);

	/// Append the type's placeholder value, used for absent slots.
	fn push_default(&mut self);

	/// The value at `index`, `Value::Undefined` when out of bounds.
	fn get_value(&self, index: usize) -> Value;

	fn write_body(&self, enc: &mut Encoder);

	fn read_body(dec: &mut Decoder<'_>, rows: usize) -> Result<Self>
	where
		Self: Sized;
}
