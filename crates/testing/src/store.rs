// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::collections::HashMap;

use basalt_column::Block;
use basalt_type::TableSchema;
use basalt_wire::Exception;

use crate::{CODE_TABLE_EXISTS, CODE_TYPE_MISMATCH, CODE_UNKNOWN_TABLE};

/// One stored table: its schema and every block inserted so far, kept
/// block per block so scans replay the exact insert granularity.
#[derive(Debug, Clone)]
pub struct Table {
	pub schema: TableSchema,
	pub blocks: Vec<Block>,
}

impl Table {
	pub fn row_count(&self) -> usize {
		self.blocks.iter().map(Block::row_count).sum()
	}
}

/// In-memory table storage behind the test server.
#[derive(Debug, Default)]
pub struct TableStore {
	tables: HashMap<String, Table>,
}

impl TableStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn create(&mut self, name: &str, schema: TableSchema) -> Result<(), Exception> {
		if self.tables.contains_key(name) {
			return Err(Exception::new(
				CODE_TABLE_EXISTS,
				format!("table {name} already exists"),
			));
		}
		self.tables.insert(
			name.to_string(),
			Table {
				schema,
				blocks: Vec::new(),
			},
		);
		Ok(())
	}

	pub fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<(), Exception> {
		match self.tables.remove(name) {
			Some(_) => Ok(()),
			None if if_exists => Ok(()),
			None => Err(unknown_table(name)),
		}
	}

	pub fn truncate(&mut self, name: &str) -> Result<(), Exception> {
		match self.tables.get_mut(name) {
			Some(table) => {
				table.blocks.clear();
				Ok(())
			}
			None => Err(unknown_table(name)),
		}
	}

	pub fn schema_of(&self, name: &str) -> Option<TableSchema> {
		self.tables.get(name).map(|table| table.schema.clone())
	}

	pub fn get(&self, name: &str) -> Option<&Table> {
		self.tables.get(name)
	}

	/// Append one block after checking it against the table schema.
	pub fn insert(&mut self, name: &str, block: Block) -> Result<(), Exception> {
		let Some(table) = self.tables.get_mut(name) else {
			return Err(unknown_table(name));
		};

		let incoming = block.schema();
		if incoming != table.schema {
			return Err(Exception::new(
				CODE_TYPE_MISMATCH,
				format!(
					"block structure [{}] does not match table structure [{}]",
					describe(&incoming),
					describe(&table.schema)
				),
			));
		}

		table.blocks.push(block);
		Ok(())
	}

	pub fn select(&self, name: &str) -> Result<Vec<Block>, Exception> {
		match self.tables.get(name) {
			Some(table) => Ok(table.blocks.clone()),
			None => Err(unknown_table(name)),
		}
	}
}

fn unknown_table(name: &str) -> Exception {
	Exception::new(CODE_UNKNOWN_TABLE, format!("unknown table {name}"))
}

fn describe(schema: &TableSchema) -> String {
	schema
		.columns
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}
