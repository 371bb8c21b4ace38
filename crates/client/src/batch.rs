// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_column::{Block, ColumnData};
use basalt_type::{Error, IntoValue, Result, TableSchema, Value};
use tracing::instrument;

use crate::connection::Connection;

/// Lifecycle of a batch. Both `Sent` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
	Open,
	Sent,
	Failed,
}

/// A schema-bound columnar insert buffer.
///
/// Rows accumulate client-side and travel as a single block when
/// [`send`](Batch::send) is called. A batch sends exactly once; after a
/// send, successful or not, every further operation fails with
/// [`Error::State`].
///
/// ```no_run
/// use basalt_client::{Connection, Options, Uuid};
///
/// # fn main() -> basalt_client::Result<()> {
/// let mut conn = Connection::connect(&Options::new("127.0.0.1:5433"))?;
///
/// let mut batch = conn.prepare_batch("events")?;
/// batch.append((Uuid::generate(), Some(Uuid::generate())))?;
/// batch.append((Uuid::generate(), None::<Uuid>))?;
/// batch.send()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Batch<'a> {
	conn: &'a mut Connection,
	table: String,
	block: Block,
	state: BatchState,
}

impl<'a> Batch<'a> {
	pub(crate) fn new(
		conn: &'a mut Connection,
		table: String,
		schema: &TableSchema,
	) -> Result<Self> {
		Ok(Self {
			conn,
			table,
			block: Block::from_schema(schema)?,
			state: BatchState::Open,
		})
	}

	pub fn table(&self) -> &str {
		&self.table
	}

	/// The schema the batch was bound to at prepare time.
	pub fn schema(&self) -> TableSchema {
		self.block.schema()
	}

	/// Rows appended so far.
	pub fn row_count(&self) -> usize {
		self.block.row_count()
	}

	pub fn is_empty(&self) -> bool {
		self.block.row_count() == 0
	}

	pub fn is_sent(&self) -> bool {
		self.state == BatchState::Sent
	}

	/// Append one row, checked against the schema before any column is
	/// touched. A rejected row leaves the batch unchanged.
	pub fn append<R: AppendRow>(&mut self, row: R) -> Result<()> {
		self.ensure_open()?;
		self.block.push_row(&row.into_values())
	}

	/// Mutable access to one column buffer for bulk appends.
	///
	/// Callers appending columns directly are responsible for leaving all
	/// columns at equal length; [`send`](Batch::send) rejects a ragged
	/// block with [`Error::Validation`].
	pub fn column(&mut self, index: usize) -> Result<&mut ColumnData> {
		self.ensure_open()?;
		let arity = self.block.arity();
		match self.block.column_mut(index) {
			Some(column) => Ok(&mut column.data),
			None => Err(Error::Schema {
				message: format!("column index {index} out of range, table has {arity} columns"),
			}),
		}
	}

	/// Validate the buffered block and transmit it.
	///
	/// Any failure, client-side validation included, moves the batch to
	/// its terminal failed state; the connection itself stays usable
	/// unless the transport broke mid-send.
	#[instrument(name = "batch::send", level = "trace", skip(self))]
	pub fn send(&mut self) -> Result<()> {
		self.ensure_open()?;

		if let Err(err) = self.block.validate_uniform() {
			self.state = BatchState::Failed;
			return Err(err);
		}

		match self.conn.send_insert_block(&self.table, &self.block) {
			Ok(()) => {
				self.state = BatchState::Sent;
				Ok(())
			}
			Err(err) => {
				self.state = BatchState::Failed;
				Err(err)
			}
		}
	}

	fn ensure_open(&self) -> Result<()> {
		match self.state {
			BatchState::Open => Ok(()),
			BatchState::Sent => Err(Error::State {
				message: "batch was already sent".to_string(),
			}),
			BatchState::Failed => Err(Error::State {
				message: "batch failed and cannot be reused".to_string(),
			}),
		}
	}
}

/// One row of values bound to columns by position.
pub trait AppendRow {
	fn into_values(self) -> Vec<Value>;
}

impl AppendRow for Vec<Value> {
	fn into_values(self) -> Vec<Value> {
		self
	}
}

macro_rules! impl_append_row {
	($($field:ident),+) => {
		impl<$($field: IntoValue),+> AppendRow for ($($field,)+) {
			fn into_values(self) -> Vec<Value> {
				#[allow(non_snake_case)]
				let ($($field,)+) = self;
				vec![$($field.into_value()),+]
			}
		}
	};
}

impl_append_row!(T1);
impl_append_row!(T1, T2);
impl_append_row!(T1, T2, T3);
impl_append_row!(T1, T2, T3, T4);
impl_append_row!(T1, T2, T3, T4, T5);
impl_append_row!(T1, T2, T3, T4, T5, T6);
impl_append_row!(T1, T2, T3, T4, T5, T6, T7);
impl_append_row!(T1, T2, T3, T4, T5, T6, T7, T8);
