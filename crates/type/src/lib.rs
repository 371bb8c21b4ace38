// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Value types, schema metadata and the error taxonomy shared by every
//! Basalt driver crate.

pub mod error;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use schema::{ColumnDef, TableSchema};
pub use value::{IntoValue, Type, Uuid, Value};
