// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_type::{Error, Result, Value};
use basalt_wire::{Decoder, Encoder};

use crate::{bitvec::BitVec, container::Container};

/// Nullable decoration over any base container.
///
/// Presence lives in a packed bitmap beside the data; absent slots hold the
/// base type's placeholder so every row keeps its fixed width. The bitmap
/// and the inner container grow in lockstep, one entry per row.
///
/// Wire body: one mask byte per row first (`1` = absent), then the inner
/// body with placeholders in absent slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NullableContainer<C> {
	inner: C,
	bitvec: BitVec,
}

impl<C: Container> NullableContainer<C> {
	/// Wrap an empty base container.
	pub fn new(inner: C) -> Self {
		debug_assert!(inner.is_empty());
		Self {
			inner,
			bitvec: BitVec::new(),
		}
	}

	pub fn is_defined(&self, index: usize) -> bool {
		self.bitvec.get(index)
	}

	pub fn defined_count(&self) -> usize {
		self.bitvec.count_ones()
	}

	pub fn inner(&self) -> &C {
		&self.inner
	}

	pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
		(0..self.len()).map(|i| self.get_value(i))
	}
}

impl<C: Container> Container for NullableContainer<C> {
	type Value = Option<C::Value>;

	fn len(&self) -> usize {
		self.bitvec.len()
	}

	fn push(&mut self, value: Option<C::Value>) {
		match value {
			Some(value) => {
				self.bitvec.push(true);
				self.inner.push(value);
			}
			None => {
				self.bitvec.push(false);
				self.inner.push_default();
			}
		}
	}

	fn push_default(&mut self) {
		self.push(None);
	}

	fn get_value(&self, index: usize) -> Value {
		if index >= self.len() || !self.bitvec.get(index) {
			return Value::Undefined;
		}
		self.inner.get_value(index)
	}

	fn write_body(&self, enc: &mut Encoder) {
		for present in self.bitvec.iter() {
			enc.write_u8(if present {
				0
			} else {
				1
			});
		}
		self.inner.write_body(enc);
	}

	fn read_body(dec: &mut Decoder<'_>, rows: usize) -> Result<Self> {
		let mut bitvec = BitVec::with_capacity(rows);
		for _ in 0..rows {
			match dec.read_u8()? {
				0 => bitvec.push(true),
				1 => bitvec.push(false),
				other => {
					return Err(Error::Format {
						message: format!("invalid null mask byte {other}"),
					});
				}
			}
		}
		let inner = C::read_body(dec, rows)?;
		Ok(Self {
			inner,
			bitvec,
		})
	}
}
