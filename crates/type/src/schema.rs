// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::value::Type;

/// A single column of a table as reported by the server at prepare time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	pub r#type: Type,
}

impl ColumnDef {
	pub fn new(name: impl Into<String>, r#type: Type) -> Self {
		Self {
			name: name.into(),
			r#type,
		}
	}
}

impl Display for ColumnDef {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.name, self.r#type)
	}
}

/// The ordered column layout of a table.
///
/// Column order is part of the contract: batches append and blocks encode
/// in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
	pub columns: Vec<ColumnDef>,
}

impl TableSchema {
	pub fn new(columns: Vec<ColumnDef>) -> Self {
		Self {
			columns,
		}
	}

	pub fn arity(&self) -> usize {
		self.columns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	pub fn column(&self, index: usize) -> Option<&ColumnDef> {
		self.columns.get(index)
	}

	pub fn column_by_name(&self, name: &str) -> Option<&ColumnDef> {
		self.columns.iter().find(|c| c.name == name)
	}
}
