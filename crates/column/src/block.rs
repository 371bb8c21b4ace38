// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_type::{ColumnDef, Error, Result, TableSchema, Type, Value};
use basalt_wire::{Decoder, Encoder};

use crate::data::ColumnData;

/// One named column inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockColumn {
	pub name: String,
	pub data: ColumnData,
}

/// The unit of batch transfer: ordered named columns of equal length.
///
/// Wire layout: varint column count, varint row count, then per column its
/// name, its type spec string and the column body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
	columns: Vec<BlockColumn>,
}

impl Block {
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty storage matching a table schema, column for column.
	pub fn from_schema(schema: &TableSchema) -> Result<Self> {
		let mut columns = Vec::with_capacity(schema.arity());
		for def in &schema.columns {
			columns.push(BlockColumn {
				name: def.name.clone(),
				data: ColumnData::with_type(&def.r#type)?,
			});
		}
		Ok(Self {
			columns,
		})
	}

	pub fn arity(&self) -> usize {
		self.columns.len()
	}

	pub fn columns(&self) -> &[BlockColumn] {
		&self.columns
	}

	pub fn column(&self, index: usize) -> Option<&BlockColumn> {
		self.columns.get(index)
	}

	pub fn column_mut(&mut self, index: usize) -> Option<&mut BlockColumn> {
		self.columns.get_mut(index)
	}

	/// The schema this block carries in its column headers.
	pub fn schema(&self) -> TableSchema {
		TableSchema::new(
			self.columns
				.iter()
				.map(|c| ColumnDef::new(c.name.clone(), c.data.column_type()))
				.collect(),
		)
	}

	/// Row count of the first column; meaningful once uniform.
	pub fn row_count(&self) -> usize {
		self.columns.first().map(|c| c.data.len()).unwrap_or(0)
	}

	/// Every column must hold the same number of rows before a block may
	/// travel.
	pub fn validate_uniform(&self) -> Result<usize> {
		let rows = self.row_count();
		for column in &self.columns {
			if column.data.len() != rows {
				let lengths: Vec<String> =
					self.columns.iter().map(|c| format!("{}={}", c.name, c.data.len())).collect();
				return Err(Error::Validation {
					message: format!("columns have unequal lengths: {}", lengths.join(", ")),
				});
			}
		}
		Ok(rows)
	}

	/// Append one row across all columns.
	///
	/// Validates every value first so a rejected row leaves the block
	/// untouched.
	pub fn push_row(&mut self, values: &[Value]) -> Result<()> {
		if values.len() != self.arity() {
			return Err(Error::Schema {
				message: format!("row has {} values, table has {} columns", values.len(), self.arity()),
			});
		}
		for (column, value) in self.columns.iter().zip(values) {
			column.data.check_value(value).map_err(|err| match err {
				Error::Schema {
					message,
				} => Error::Schema {
					message: format!("column {:?}: {message}", column.name),
				},
				other => other,
			})?;
		}
		for (column, value) in self.columns.iter_mut().zip(values) {
			column.data.push_value(value.clone())?;
		}
		Ok(())
	}

	/// All values of one row, `None` past the last row.
	pub fn row_values(&self, index: usize) -> Option<Vec<Value>> {
		if index >= self.row_count() {
			return None;
		}
		Some(self.columns.iter().map(|c| c.data.get_value(index)).collect())
	}

	pub fn encode(&self) -> Result<Vec<u8>> {
		let rows = self.validate_uniform()?;

		let mut enc = Encoder::with_capacity(64 + self.arity() * rows * 17);
		enc.write_uvarint(self.arity() as u64);
		enc.write_uvarint(rows as u64);
		for column in &self.columns {
			enc.write_str(&column.name);
			enc.write_str(&column.data.column_type().to_string());
			column.data.write_body(&mut enc);
		}
		Ok(enc.into_bytes())
	}

	pub fn decode(data: &[u8]) -> Result<Self> {
		let mut dec = Decoder::new(data);

		let arity = dec.read_uvarint()?;
		let rows = dec.read_uvarint()?;

		// A block can never carry more columns or rows than it has
		// bytes, so anything larger is malformed rather than merely
		// big.
		if arity as usize > data.len() {
			return Err(Error::Format {
				message: format!("block declares {arity} columns in {} bytes", data.len()),
			});
		}
		if rows > 0 && (arity == 0 || rows as usize > data.len()) {
			return Err(Error::Format {
				message: format!("block declares {rows} rows across {arity} columns in {} bytes", data.len()),
			});
		}

		let mut columns = Vec::with_capacity(arity as usize);
		for _ in 0..arity {
			let name = dec.read_str()?;
			let spec = dec.read_str()?;
			let r#type = Type::parse(&spec)?;
			let body = ColumnData::read_body(&mut dec, &r#type, rows as usize)?;
			columns.push(BlockColumn {
				name,
				data: body,
			});
		}
		dec.expect_exhausted()?;

		Ok(Self {
			columns,
		})
	}
}
