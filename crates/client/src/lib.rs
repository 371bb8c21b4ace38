// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Blocking native-protocol client for Basalt.
//!
//! The driver speaks the columnar block protocol directly over TCP:
//! inserts buffer rows client-side and ship them as one block per
//! [`Batch::send`], queries stream blocks back and surface them row by
//! row through [`Rows::scan`].
//!
//! ```no_run
//! use basalt_client::{Connection, Options, Uuid};
//!
//! # fn main() -> basalt_client::Result<()> {
//! let mut conn = Connection::connect(&Options::new("127.0.0.1:5433"))?;
//! conn.exec("CREATE TABLE events (id Uuid, parent Nullable(Uuid))")?;
//!
//! let mut batch = conn.prepare_batch("events")?;
//! batch.append((Uuid::generate(), None::<Uuid>))?;
//! batch.send()?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod connection;
pub mod rows;

pub use basalt_column::{Block, BlockColumn, ColumnData};
pub use basalt_type::{ColumnDef, Error, IntoValue, Result, TableSchema, Type, Uuid, Value};
pub use basalt_wire::Compression;
pub use batch::{AppendRow, Batch};
pub use config::Options;
pub use connection::Connection;
pub use rows::{Row, Rows, ScanRow, ScanTarget};
