// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Test support for the Basalt driver: an in-process protocol server
//! backed by in-memory tables, plus tracing setup for tests.

pub mod logging;
pub mod server;
pub mod statement;
pub mod store;

pub use logging::init_tracing;
pub use server::TestServer;
pub use store::{Table, TableStore};

/// Exception codes the test server reports, matching the numbers real
/// servers use.
pub const CODE_TYPE_MISMATCH: u64 = 53;
pub const CODE_TABLE_EXISTS: u64 = 57;
pub const CODE_UNKNOWN_TABLE: u64 = 60;
pub const CODE_SYNTAX_ERROR: u64 = 62;
pub const CODE_AUTH_FAILED: u64 = 516;
