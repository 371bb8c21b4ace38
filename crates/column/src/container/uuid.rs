// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_type::{Result, Uuid, Value};
use basalt_wire::{Decoder, Encoder};

use crate::container::Container;

/// Append-only container of identifier values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UuidContainer {
	data: Vec<Uuid>,
}

impl UuidContainer {
	pub fn new() -> Self {
		Self {
			data: Vec::new(),
		}
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			data: Vec::with_capacity(capacity),
		}
	}

	pub fn from_vec(data: Vec<Uuid>) -> Self {
		Self {
			data,
		}
	}

	pub fn get(&self, index: usize) -> Option<&Uuid> {
		self.data.get(index)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Uuid> + '_ {
		self.data.iter()
	}

	pub fn as_slice(&self) -> &[Uuid] {
		&self.data
	}
}

impl Container for UuidContainer {
	type Value = Uuid;

	fn len(&self) -> usize {
		self.data.len()
	}

	fn push(&mut self, value: Uuid) {
		self.data.push(value);
	}

	fn push_default(&mut self) {
		self.data.push(Uuid::nil());
	}

	fn get_value(&self, index: usize) -> Value {
		match self.data.get(index) {
			Some(value) => Value::Uuid(*value),
			None => Value::Undefined,
		}
	}

	fn write_body(&self, enc: &mut Encoder) {
		for value in &self.data {
			enc.write_uuid(value);
		}
	}

	fn read_body(dec: &mut Decoder<'_>, rows: usize) -> Result<Self> {
		let mut data = Vec::with_capacity(rows);
		for _ in 0..rows {
			data.push(dec.read_uuid()?);
		}
		Ok(Self {
			data,
		})
	}
}

#[cfg(test)]
pub mod tests {
	use basalt_type::Error;
	use basalt_wire::UUID_WIRE_SIZE;

	use super::*;

	#[test]
	fn test_new() {
		let container = UuidContainer::new();
		assert_eq!(container.len(), 0);
		assert!(container.is_empty());
	}

	#[test]
	fn test_from_vec() {
		let values = vec![Uuid::generate(), Uuid::generate(), Uuid::generate()];
		let container = UuidContainer::from_vec(values.clone());

		assert_eq!(container.len(), 3);
		for (i, value) in values.iter().enumerate() {
			assert_eq!(container.get(i), Some(value));
		}
	}

	#[test]
	fn test_push() {
		let mut container = UuidContainer::with_capacity(2);
		let id = Uuid::generate();

		container.push(id);
		container.push_default();

		assert_eq!(container.len(), 2);
		assert_eq!(container.get(0), Some(&id));
		assert_eq!(container.get(1), Some(&Uuid::nil()));
		assert!(container.get(2).is_none());
	}

	#[test]
	fn test_get_value() {
		let id = Uuid::generate();
		let container = UuidContainer::from_vec(vec![id]);

		assert_eq!(container.get_value(0), Value::Uuid(id));
		assert_eq!(container.get_value(1), Value::Undefined);
	}

	#[test]
	fn test_iter() {
		let values = vec![Uuid::generate(), Uuid::generate()];
		let container = UuidContainer::from_vec(values.clone());

		let collected: Vec<Uuid> = container.iter().copied().collect();
		assert_eq!(collected, values);
	}

	#[test]
	fn test_body_round_trip() {
		let values = vec![Uuid::generate(), Uuid::generate(), Uuid::generate()];
		let container = UuidContainer::from_vec(values);

		let mut enc = Encoder::new();
		container.write_body(&mut enc);
		let bytes = enc.into_bytes();
		assert_eq!(bytes.len(), container.len() * UUID_WIRE_SIZE);

		let mut dec = Decoder::new(&bytes);
		let decoded = UuidContainer::read_body(&mut dec, 3).unwrap();
		assert_eq!(decoded, container);
		assert!(dec.is_exhausted());
	}

	#[test]
	fn test_body_truncated() {
		let container = UuidContainer::from_vec(vec![Uuid::generate()]);

		let mut enc = Encoder::new();
		container.write_body(&mut enc);
		let bytes = enc.into_bytes();

		let mut dec = Decoder::new(&bytes[..10]);
		let err = UuidContainer::read_body(&mut dec, 1).unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
	}
}
