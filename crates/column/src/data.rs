// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_type::{Error, Result, Type, Uuid, Value};
use basalt_wire::{Decoder, Encoder};

use crate::container::{Container, NullableContainer, UuidContainer};

/// Column storage dispatched on the declared column type.
///
/// The schema decides the variant once, at bind time; every append is
/// checked against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnData {
	Uuid(UuidContainer),
	Nullable(NullableContainer<UuidContainer>),
}

impl ColumnData {
	/// Empty storage for a declared column type.
	pub fn with_type(r#type: &Type) -> Result<Self> {
		match r#type {
			Type::Uuid => Ok(ColumnData::Uuid(UuidContainer::new())),
			Type::Nullable(inner) => match inner.as_ref() {
				Type::Uuid => Ok(ColumnData::Nullable(NullableContainer::new(UuidContainer::new()))),
				Type::Nullable(_) => Err(Error::Format {
					message: "nested nullable column type".to_string(),
				}),
			},
		}
	}

	pub fn column_type(&self) -> Type {
		match self {
			ColumnData::Uuid(_) => Type::Uuid,
			ColumnData::Nullable(_) => Type::Uuid.nullable(),
		}
	}

	pub fn is_nullable(&self) -> bool {
		matches!(self, ColumnData::Nullable(_))
	}

	pub fn len(&self) -> usize {
		match self {
			ColumnData::Uuid(container) => container.len(),
			ColumnData::Nullable(container) => container.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Check `value` against this column without appending.
	pub fn check_value(&self, value: &Value) -> Result<()> {
		match (self, value) {
			(ColumnData::Uuid(_), Value::Undefined) => Err(Error::Schema {
				message: "undefined value for non-nullable Uuid column".to_string(),
			}),
			(ColumnData::Uuid(_), Value::Uuid(_)) => Ok(()),
			(ColumnData::Nullable(_), _) => Ok(()),
		}
	}

	/// Append one row.
	pub fn push_value(&mut self, value: Value) -> Result<()> {
		match self {
			ColumnData::Uuid(container) => match value {
				Value::Uuid(v) => {
					container.push(v);
					Ok(())
				}
				Value::Undefined => Err(Error::Schema {
					message: "undefined value for non-nullable Uuid column".to_string(),
				}),
			},
			ColumnData::Nullable(container) => match value {
				Value::Uuid(v) => {
					container.push(Some(v));
					Ok(())
				}
				Value::Undefined => {
					container.push(None);
					Ok(())
				}
			},
		}
	}

	/// Append many rows at once, equivalent to repeated `push_value`.
	///
	/// An absence destined for a non-nullable column fails the whole call
	/// before anything is appended.
	pub fn append_bulk<I>(&mut self, values: I) -> Result<usize>
	where
		I: IntoIterator<Item = Option<Uuid>>,
	{
		let values: Vec<Option<Uuid>> = values.into_iter().collect();

		if !self.is_nullable() && values.iter().any(|v| v.is_none()) {
			return Err(Error::Schema {
				message: "absent value in bulk append to non-nullable Uuid column".to_string(),
			});
		}

		let count = values.len();
		match self {
			ColumnData::Uuid(container) => {
				for value in values.into_iter().flatten() {
					container.push(value);
				}
			}
			ColumnData::Nullable(container) => {
				for value in values {
					container.push(value);
				}
			}
		}
		Ok(count)
	}

	/// Bulk append of present values only.
	pub fn append_bulk_values<I>(&mut self, values: I) -> Result<usize>
	where
		I: IntoIterator<Item = Uuid>,
	{
		self.append_bulk(values.into_iter().map(Some))
	}

	/// The value at `index`, `Value::Undefined` when absent or out of
	/// bounds.
	pub fn get_value(&self, index: usize) -> Value {
		match self {
			ColumnData::Uuid(container) => container.get_value(index),
			ColumnData::Nullable(container) => container.get_value(index),
		}
	}

	pub fn write_body(&self, enc: &mut Encoder) {
		match self {
			ColumnData::Uuid(container) => container.write_body(enc),
			ColumnData::Nullable(container) => container.write_body(enc),
		}
	}

	pub fn read_body(dec: &mut Decoder<'_>, r#type: &Type, rows: usize) -> Result<Self> {
		match r#type {
			Type::Uuid => Ok(ColumnData::Uuid(UuidContainer::read_body(dec, rows)?)),
			Type::Nullable(inner) => match inner.as_ref() {
				Type::Uuid => Ok(ColumnData::Nullable(NullableContainer::read_body(dec, rows)?)),
				Type::Nullable(_) => Err(Error::Format {
					message: "nested nullable column type".to_string(),
				}),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_type() {
		let plain = ColumnData::with_type(&Type::Uuid).unwrap();
		assert_eq!(plain.column_type(), Type::Uuid);
		assert!(!plain.is_nullable());

		let nullable = ColumnData::with_type(&Type::Uuid.nullable()).unwrap();
		assert_eq!(nullable.column_type(), Type::Uuid.nullable());
		assert!(nullable.is_nullable());
	}

	#[test]
	fn test_push_value() {
		let id = Uuid::generate();

		let mut plain = ColumnData::with_type(&Type::Uuid).unwrap();
		plain.push_value(Value::Uuid(id)).unwrap();
		assert_eq!(plain.len(), 1);
		assert_eq!(plain.get_value(0), Value::Uuid(id));
	}

	#[test]
	fn test_push_undefined_into_plain_column() {
		let mut plain = ColumnData::with_type(&Type::Uuid).unwrap();

		let err = plain.push_value(Value::Undefined).unwrap_err();
		assert!(matches!(err, Error::Schema { .. }));
		assert!(plain.is_empty());
	}

	#[test]
	fn test_push_undefined_into_nullable_column() {
		let mut nullable = ColumnData::with_type(&Type::Uuid.nullable()).unwrap();

		nullable.push_value(Value::Undefined).unwrap();
		nullable.push_value(Value::Uuid(Uuid::generate())).unwrap();

		assert_eq!(nullable.len(), 2);
		assert_eq!(nullable.get_value(0), Value::Undefined);
	}

	#[test]
	fn test_append_bulk() {
		let values: Vec<Option<Uuid>> = vec![Some(Uuid::generate()), None, Some(Uuid::generate())];

		let mut nullable = ColumnData::with_type(&Type::Uuid.nullable()).unwrap();
		assert_eq!(nullable.append_bulk(values.clone()).unwrap(), 3);
		assert_eq!(nullable.len(), 3);
		assert_eq!(nullable.get_value(1), Value::Undefined);
		assert_eq!(nullable.get_value(2), Value::from(values[2]));
	}

	#[test]
	fn test_append_bulk_absence_rejected_atomically() {
		let mut plain = ColumnData::with_type(&Type::Uuid).unwrap();
		plain.push_value(Value::Uuid(Uuid::generate())).unwrap();

		let err = plain.append_bulk(vec![Some(Uuid::generate()), None]).unwrap_err();
		assert!(matches!(err, Error::Schema { .. }));

		// Nothing from the failed call was appended
		assert_eq!(plain.len(), 1);
	}

	#[test]
	fn test_append_bulk_values() {
		let values = vec![Uuid::generate(), Uuid::generate()];

		let mut plain = ColumnData::with_type(&Type::Uuid).unwrap();
		assert_eq!(plain.append_bulk_values(values.iter().copied()).unwrap(), 2);
		assert_eq!(plain.get_value(0), Value::Uuid(values[0]));
		assert_eq!(plain.get_value(1), Value::Uuid(values[1]));
	}

	#[test]
	fn test_check_value() {
		let plain = ColumnData::with_type(&Type::Uuid).unwrap();
		let nullable = ColumnData::with_type(&Type::Uuid.nullable()).unwrap();
		let id = Value::Uuid(Uuid::generate());

		plain.check_value(&id).unwrap();
		assert!(plain.check_value(&Value::Undefined).is_err());
		nullable.check_value(&id).unwrap();
		nullable.check_value(&Value::Undefined).unwrap();
	}

	#[test]
	fn test_body_round_trip_both_variants() {
		let id = Uuid::generate();

		let mut plain = ColumnData::with_type(&Type::Uuid).unwrap();
		plain.push_value(Value::Uuid(id)).unwrap();

		let mut nullable = ColumnData::with_type(&Type::Uuid.nullable()).unwrap();
		nullable.push_value(Value::Undefined).unwrap();
		nullable.push_value(Value::Uuid(id)).unwrap();

		for column in [plain, nullable] {
			let mut enc = Encoder::new();
			column.write_body(&mut enc);
			let bytes = enc.into_bytes();

			let mut dec = Decoder::new(&bytes);
			let decoded = ColumnData::read_body(&mut dec, &column.column_type(), column.len()).unwrap();
			assert_eq!(decoded, column);
		}
	}
}
