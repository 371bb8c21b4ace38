// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use basalt_column::Block;
use basalt_type::{Error, Result, Uuid, Value};

use crate::connection::Connection;

/// A result stream, pulled block by block off the connection.
///
/// ```no_run
/// use basalt_client::{Connection, Options, Uuid};
///
/// # fn main() -> basalt_client::Result<()> {
/// let mut conn = Connection::connect(&Options::new("127.0.0.1:5433"))?;
///
/// let mut rows = conn.query("SELECT * FROM events")?;
/// let mut id = Uuid::nil();
/// let mut parent = None::<Uuid>;
/// loop {
/// 	match rows.scan((&mut id, &mut parent)) {
/// 		Ok(()) => println!("{id} {parent:?}"),
/// 		Err(err) if err.is_end_of_results() => break,
/// 		Err(err) => return Err(err),
/// 	}
/// }
/// # Ok(())
/// # }
/// ```
pub struct Rows<'a> {
	conn: &'a mut Connection,
	current: Option<Block>,
	cursor: usize,
	done: bool,
}

impl<'a> Rows<'a> {
	pub(crate) fn new(conn: &'a mut Connection) -> Self {
		Self {
			conn,
			current: None,
			cursor: 0,
			done: false,
		}
	}

	/// Bind the next row into `targets`, positionally.
	///
	/// Returns [`Error::EndOfResults`] once the stream is exhausted.
	pub fn scan<T: ScanRow>(&mut self, targets: T) -> Result<()> {
		let values = self.advance()?;
		targets.scan_values(&values)
	}

	/// The next row as owned dynamic values.
	pub fn next_row(&mut self) -> Result<Row> {
		Ok(Row {
			values: self.advance()?,
		})
	}

	/// The first row, with the remainder of the stream drained. Fails
	/// with [`Error::EndOfResults`] on an empty result.
	pub(crate) fn into_first_row(mut self) -> Result<Row> {
		match self.advance() {
			Ok(values) => {
				self.drain()?;
				Ok(Row { values })
			}
			// Exhausted means the exchange already finished cleanly;
			// any other failure left the connection poisoned.
			Err(err) => Err(err),
		}
	}

	fn advance(&mut self) -> Result<Vec<Value>> {
		loop {
			if let Some(block) = &self.current {
				if let Some(values) = block.row_values(self.cursor) {
					self.cursor += 1;
					return Ok(values);
				}
				self.current = None;
				self.cursor = 0;
			}

			if self.done {
				return Err(Error::EndOfResults);
			}

			// Empty blocks are legal; the loop just pulls the next one.
			// Any failure, a server exception included, terminates the
			// stream: nothing more will arrive for this exchange.
			match self.conn.read_result_event() {
				Ok(Some(block)) => self.current = Some(block),
				Ok(None) => self.done = true,
				Err(err) => {
					self.done = true;
					return Err(err);
				}
			}
		}
	}

	fn drain(&mut self) -> Result<()> {
		self.current = None;
		self.cursor = 0;
		while !self.done {
			match self.conn.read_result_event() {
				Ok(Some(_)) => {}
				Ok(None) => self.done = true,
				Err(err) => {
					self.done = true;
					return Err(err);
				}
			}
		}
		Ok(())
	}
}

/// Dropping a result stream drains it so the connection is back at a
/// message boundary for the next operation.
impl Drop for Rows<'_> {
	fn drop(&mut self) {
		while !self.done {
			match self.conn.read_result_event() {
				Ok(Some(_)) => {}
				Ok(None) => self.done = true,
				// The connection poisons itself on transport failures;
				// nothing more to salvage here.
				Err(_) => break,
			}
		}
	}
}

/// One owned result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
	values: Vec<Value>,
}

impl Row {
	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// Bind this row into `targets`, positionally.
	pub fn scan<T: ScanRow>(&self, targets: T) -> Result<()> {
		targets.scan_values(&self.values)
	}
}

impl From<Vec<Value>> for Row {
	fn from(values: Vec<Value>) -> Self {
		Self {
			values,
		}
	}
}

/// A single scan destination.
pub trait ScanTarget {
	fn assign(&mut self, value: &Value) -> Result<()>;
}

impl ScanTarget for Uuid {
	fn assign(&mut self, value: &Value) -> Result<()> {
		match value {
			Value::Uuid(v) => {
				*self = *v;
				Ok(())
			}
			Value::Undefined => Err(Error::Schema {
				message: "absent value cannot bind to a Uuid target, scan into Option<Uuid>"
					.to_string(),
			}),
		}
	}
}

impl ScanTarget for Option<Uuid> {
	fn assign(&mut self, value: &Value) -> Result<()> {
		match value {
			Value::Uuid(v) => *self = Some(*v),
			Value::Undefined => *self = None,
		}
		Ok(())
	}
}

impl ScanTarget for Value {
	fn assign(&mut self, value: &Value) -> Result<()> {
		*self = value.clone();
		Ok(())
	}
}

/// A full row of scan destinations, bound by position.
pub trait ScanRow {
	fn scan_values(self, values: &[Value]) -> Result<()>;
}

macro_rules! impl_scan_row {
	($arity:expr => $($field:ident : $index:tt),+) => {
		impl<'t, $($field: ScanTarget),+> ScanRow for ($(&'t mut $field,)+) {
			fn scan_values(self, values: &[Value]) -> Result<()> {
				if values.len() != $arity {
					return Err(Error::Schema {
						message: format!(
							"row has {} values, scan targets expect {}",
							values.len(),
							$arity
						),
					});
				}
				$(self.$index.assign(&values[$index])?;)+
				Ok(())
			}
		}
	};
}

impl_scan_row!(1 => T1:0);
impl_scan_row!(2 => T1:0, T2:1);
impl_scan_row!(3 => T1:0, T2:1, T3:2);
impl_scan_row!(4 => T1:0, T2:1, T3:2, T4:3);
impl_scan_row!(5 => T1:0, T2:1, T3:2, T4:3, T5:4);
impl_scan_row!(6 => T1:0, T2:1, T3:2, T4:3, T5:4, T6:5);
impl_scan_row!(7 => T1:0, T2:1, T3:2, T4:3, T5:4, T6:5, T7:6);
impl_scan_row!(8 => T1:0, T2:1, T3:2, T4:3, T5:4, T6:5, T7:6, T8:7);
