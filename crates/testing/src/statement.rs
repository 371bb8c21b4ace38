// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Just enough statement parsing to drive the driver test suite. The
//! grammar covers table DDL and full-table scans, nothing more.

use basalt_type::{ColumnDef, TableSchema, Type};
use basalt_wire::Exception;

use crate::CODE_SYNTAX_ERROR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
	Create {
		table: String,
		schema: TableSchema,
	},
	Drop {
		table: String,
		if_exists: bool,
	},
	Truncate {
		table: String,
	},
	Select {
		table: String,
	},
}

pub fn parse(text: &str) -> Result<Statement, Exception> {
	let text = text.trim().trim_end_matches(';').trim();

	if let Some(rest) = strip_keyword(text, "CREATE TABLE") {
		return parse_create(rest);
	}
	if let Some(rest) = strip_keyword(text, "DROP TABLE IF EXISTS") {
		return Ok(Statement::Drop {
			table: identifier(rest)?,
			if_exists: true,
		});
	}
	if let Some(rest) = strip_keyword(text, "DROP TABLE") {
		return Ok(Statement::Drop {
			table: identifier(rest)?,
			if_exists: false,
		});
	}
	if let Some(rest) = strip_keyword(text, "TRUNCATE TABLE") {
		return Ok(Statement::Truncate {
			table: identifier(rest)?,
		});
	}
	if let Some(rest) = strip_keyword(text, "SELECT * FROM") {
		return Ok(Statement::Select {
			table: identifier(rest)?,
		});
	}

	Err(syntax(format!("unsupported statement: {text}")))
}

fn parse_create(rest: &str) -> Result<Statement, Exception> {
	let open = rest
		.find('(')
		.ok_or_else(|| syntax("expected a column list after the table name"))?;
	let close = rest
		.rfind(')')
		.ok_or_else(|| syntax("expected ) closing the column list"))?;
	if close < open {
		return Err(syntax("expected ) closing the column list"));
	}
	if !rest[close + 1..].trim().is_empty() {
		return Err(syntax(format!("unexpected input after column list: {}", &rest[close + 1..])));
	}

	let table = rest[..open].trim();
	if !is_identifier(table) {
		return Err(syntax(format!("invalid table name {table:?}")));
	}

	let mut columns = Vec::new();
	for part in rest[open + 1..close].split(',') {
		let part = part.trim();
		let Some((name, spec)) = part.split_once(char::is_whitespace) else {
			return Err(syntax(format!("expected `name Type` in column definition {part:?}")));
		};
		if !is_identifier(name) {
			return Err(syntax(format!("invalid column name {name:?}")));
		}
		let r#type = Type::parse(spec.trim()).map_err(|err| syntax(err.to_string()))?;
		columns.push(ColumnDef::new(name, r#type));
	}

	Ok(Statement::Create {
		table: table.to_string(),
		schema: TableSchema::new(columns),
	})
}

/// Strip a multi-word keyword prefix, case-insensitively, returning the
/// remainder.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
	let mut rest = text;
	for word in keyword.split_whitespace() {
		rest = rest.trim_start();
		let head = rest.get(..word.len())?;
		if !head.eq_ignore_ascii_case(word) {
			return None;
		}
		rest = &rest[word.len()..];
		if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
			return None;
		}
	}
	Some(rest.trim_start())
}

fn identifier(rest: &str) -> Result<String, Exception> {
	let mut parts = rest.split_whitespace();
	match (parts.next(), parts.next()) {
		(Some(name), None) if is_identifier(name) => Ok(name.to_string()),
		_ => Err(syntax(format!("expected a table name, found {rest:?}"))),
	}
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn syntax(message: impl Into<String>) -> Exception {
	Exception::new(CODE_SYNTAX_ERROR, message)
}
